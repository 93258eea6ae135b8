#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Tessellation of 2D fill and stroke operations.
//!
//! This crate is reexported in [scenegl](https://docs.rs/scenegl/).
//!
//! ## Overview
//!
//! The most interesting types of this crate are:
//!
//! * [FillTessellator](struct.FillTessellator.html) - A sweep-line tessellator computing the
//!   interior of arbitrary sets of contours (self-intersecting, overlapping, nested) according
//!   to a [winding rule](enum.WindingRule.html). The interior is output as triangles, as convex
//!   polygons, or as the contours of its boundary.
//! * [StrokeTessellator](struct.StrokeTessellator.html) - Extrudes polylines into strips of
//!   triangles with miter or bevel joins and butt or square caps.
//!
//! ## The fill tessellation pipeline
//!
//! 1. The input contours are inserted in a half-edge mesh, each edge carrying a winding
//!    contribution of `+1` in the direction of its contour.
//! 2. The vertices are projected on the plane of the polygon (given or computed).
//! 3. A sweep line goes over the vertices in lexicographic order, splitting edges at their
//!    intersections and subdividing the plane into monotone regions, each region being
//!    marked inside or outside according to its winding number.
//! 4. The inside regions are triangulated, and optionally merged into convex polygons.
//!
//! ### Flattening and tolerance
//!
//! The tessellators in this crate operate on polylines. Paths that contain bézier curves
//! or arcs have to be flattened first, see the [scenegl_path crate](https://docs.rs/scenegl_path/).
//!

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use scenegl_path as path;

#[cfg(debug_assertions)]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => (
        if $obj.log {
            log::trace!($fmt);
        }
    );
    ($obj:ident, $fmt:expr, $($arg:tt)*) => (
        if $obj.log {
            log::trace!($fmt, $($arg)*);
        }
    );
}

#[cfg(not(debug_assertions))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

mod dict;
mod error;
mod event_queue;
mod fill;
mod math_utils;
mod mesh;
mod stroke;
mod sweep;

#[cfg(test)]
mod fill_tests;

pub use crate::path::math;

pub use crate::path::geom;

#[doc(inline)]
pub use crate::fill::*;

#[doc(inline)]
pub use crate::stroke::*;

#[doc(inline)]
pub use crate::error::*;

pub use crate::mesh::UNDEF;

pub use crate::path::{LineCap, LineJoin, WindingRule};

/// What the fill tessellator outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ElementType {
    /// Convex polygons with at most this many vertices (at least three).
    Polygons(usize),
    /// The contours separating the interior from the exterior.
    BoundaryContours,
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::Polygons(3)
    }
}

/// Parameters for the stroke tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeOptions {
    /// Line width
    ///
    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// What cap to use at both ends of open polylines.
    ///
    /// Default value: `LineCap::Butt`.
    pub line_cap: LineCap,

    /// See the SVG specification.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Maximum ratio between the length of a miter and the half line width
    /// before it is replaced with a bevel.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,
}

impl StrokeOptions {
    /// Minimum miter limit as defined by the SVG specification.
    ///
    /// See [StrokeMiterLimitProperty](https://svgwg.org/specs/strokes/#StrokeMiterlimitProperty)
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    pub const DEFAULT_MITER_LIMIT: f32 = 10.0;
    pub const DEFAULT_LINE_CAP: LineCap = LineCap::Butt;
    pub const DEFAULT_LINE_JOIN: LineJoin = LineJoin::Miter;
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

    pub const DEFAULT: Self = StrokeOptions {
        line_width: Self::DEFAULT_LINE_WIDTH,
        line_cap: Self::DEFAULT_LINE_CAP,
        line_join: Self::DEFAULT_LINE_JOIN,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
    };

    #[inline]
    pub const fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    #[inline]
    pub const fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub const fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        assert!(limit >= Self::MINIMUM_MITER_LIMIT);
        self.miter_limit = limit;
        self
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the fill tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FillOptions {
    /// Which regions are inside.
    ///
    /// Default value: `NonZero`.
    pub winding_rule: WindingRule,

    /// Triangles, convex polygons or boundary contours.
    ///
    /// Default value: `Polygons(3)`.
    pub element: ElementType,

    /// The normal of the plane the input is projected on.
    ///
    /// When `None`, a normal is computed from the input and the sweep plane is
    /// oriented so that the contours are mostly counter-clockwise. When set,
    /// contours are counter-clockwise if they turn counter-clockwise around
    /// the normal.
    ///
    /// Default value: `None`.
    pub normal: Option<[f64; 3]>,
}

impl FillOptions {
    pub const DEFAULT_WINDING_RULE: WindingRule = WindingRule::NonZero;
    pub const DEFAULT_ELEMENT: ElementType = ElementType::Polygons(3);

    pub const DEFAULT: Self = FillOptions {
        winding_rule: Self::DEFAULT_WINDING_RULE,
        element: Self::DEFAULT_ELEMENT,
        normal: None,
    };

    #[inline]
    pub fn odd() -> Self {
        Self::DEFAULT.with_winding_rule(WindingRule::Odd)
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub const fn with_winding_rule(mut self, rule: WindingRule) -> Self {
        self.winding_rule = rule;
        self
    }

    #[inline]
    pub const fn with_element(mut self, element: ElementType) -> Self {
        self.element = element;
        self
    }

    #[inline]
    pub const fn with_normal(mut self, normal: [f64; 3]) -> Self {
        self.normal = Some(normal);
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn test_without_miter_limit() {
    let expected_limit = 10.0;
    let stroke_options = StrokeOptions::default();

    assert_eq!(expected_limit, stroke_options.miter_limit);
}

#[test]
fn test_with_miter_limit() {
    let expected_limit = 3.0;
    let stroke_options = StrokeOptions::default().with_miter_limit(expected_limit);

    assert_eq!(expected_limit, stroke_options.miter_limit);
}

#[test]
#[should_panic]
fn test_with_invalid_miter_limit() {
    let _ = StrokeOptions::default().with_miter_limit(0.0);
}
