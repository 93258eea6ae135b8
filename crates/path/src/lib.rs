#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Path data parsing and the steps that turn a path outline into polylines.
//!
//! The pipeline is:
//!
//! 1. [`parse`](parser/fn.parse.html) an SVG path data string into [`PathCommand`]s,
//! 2. [`normalize`](normalize/fn.normalize.html) them into absolute move and cubic
//!    bézier commands,
//! 3. flatten the cubics and group the points into [`Contour`]s
//!    ([`build_contours`](contour/fn.build_contours.html)),
//! 4. [`simplify`](simplify/fn.simplify.html) each contour.
//!
//! This crate is reexported in [scenegl](https://docs.rs/scenegl/).
//!
//! # Examples
//!
//! ```
//! # extern crate scenegl_path;
//! # fn main() {
//! use scenegl_path::{contours_for_path, FlatteningOptions};
//!
//! let contours = contours_for_path(
//!     "M0,0 L10,0 L10,10 L0,10 Z",
//!     &FlatteningOptions::tolerance(1.0),
//! ).unwrap();
//!
//! assert_eq!(contours.len(), 1);
//! assert!(contours[0].closed);
//! # }
//! ```
//!

pub use scenegl_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod commands;
pub mod contour;
pub mod normalize;
pub mod parser;
pub mod simplify;

#[doc(inline)]
pub use crate::commands::{NormalizedCommand, PathCommand, Verb};
#[doc(inline)]
pub use crate::contour::{build_contours, Contour};
pub use crate::geom::FlatteningOptions;
#[doc(inline)]
pub use crate::normalize::normalize;
#[doc(inline)]
pub use crate::parser::{parse, ParseError};
#[doc(inline)]
pub use crate::simplify::simplify;

pub mod math {
    //! f32 version of the scenegl_geom types used everywhere. Most other scenegl crates
    //! reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```
    pub type Box2D = euclid::default::Box2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }
}

/// Parses, normalizes, flattens and groups a path into contours.
///
/// Contours are not simplified.
pub fn contours_for_path(
    src: &str,
    options: &FlatteningOptions<f32>,
) -> Result<Vec<Contour>, ParseError> {
    let commands = parse(src)?;
    let closed = commands::ends_with_close(&commands);
    let normalized = normalize(&commands);

    Ok(build_contours(&normalized, closed, options))
}

/// The winding rule defines how to determine what is inside and what is outside of a
/// shape from the winding number of each of its regions.
///
/// The winding number of a region is the signed number of times the contours
/// wind around it, counting edges going in the contour's direction as `+1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum WindingRule {
    /// Inside if the winding number is odd (even-odd fill rule).
    Odd,
    /// Inside if the winding number is not zero.
    NonZero,
    Positive,
    Negative,
    /// Inside if the absolute winding number is at least two.
    ///
    /// Selects the regions covered by two or more overlapping same-wound contours.
    AbsGeqTwo,
}

impl WindingRule {
    #[inline]
    pub fn is_inside(self, winding_number: i32) -> bool {
        match self {
            WindingRule::Odd => winding_number & 1 != 0,
            WindingRule::NonZero => winding_number != 0,
            WindingRule::Positive => winding_number > 0,
            WindingRule::Negative => winding_number < 0,
            WindingRule::AbsGeqTwo => winding_number >= 2 || winding_number <= -2,
        }
    }
}

impl Default for WindingRule {
    fn default() -> Self {
        WindingRule::NonZero
    }
}

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke for each sub-path does not extend beyond its two endpoints.
    Butt,
    /// At the end of each sub-path, the shape representing the stroke will be
    /// extended by a rectangle with the same width as the stroke width and
    /// whose length is half of the stroke width.
    Square,
}

impl LineCap {
    /// Parses the `strokeCap` item property. Unknown values map to `Butt`.
    ///
    /// `round` caps are drawn as square caps.
    pub fn from_name(name: &str) -> Self {
        match name {
            "square" | "round" => LineCap::Square,
            _ => LineCap::Butt,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Square => "square",
        }
    }
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner is to be used to join path segments.
    Miter,
    /// A bevelled corner is to be used to join path segments.
    /// The bevel shape is a triangle that fills the area between the two stroked
    /// segments.
    Bevel,
}

impl LineJoin {
    /// Parses the `strokeJoin` item property. Unknown values map to `Miter`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bevel" | "round" => LineJoin::Bevel,
            _ => LineJoin::Miter,
        }
    }
}

#[test]
fn winding_rules() {
    let rules = [
        WindingRule::Odd,
        WindingRule::NonZero,
        WindingRule::Positive,
        WindingRule::Negative,
        WindingRule::AbsGeqTwo,
    ];
    let expected: [[bool; 5]; 5] = [
        // -2     -1     0      1      2
        [false, true, false, true, false],
        [true, true, false, true, true],
        [false, false, false, true, true],
        [true, true, false, false, false],
        [true, false, false, false, true],
    ];

    for (rule, row) in rules.iter().zip(expected.iter()) {
        for (winding, inside) in (-2..=2).zip(row.iter()) {
            assert_eq!(rule.is_inside(winding), *inside, "{:?} {}", rule, winding);
        }
    }
}

#[test]
fn line_style_names() {
    assert_eq!(LineCap::from_name("square"), LineCap::Square);
    assert_eq!(LineCap::from_name("butt"), LineCap::Butt);
    assert_eq!(LineCap::from_name(""), LineCap::Butt);
    assert_eq!(LineJoin::from_name("bevel"), LineJoin::Bevel);
    assert_eq!(LineJoin::from_name("miter"), LineJoin::Miter);
}
