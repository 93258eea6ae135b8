#![deny(bare_trait_objects)]

//! GPU rendering of 2D scenes using path tessellation.
//!
//! # Crates
//!
//! This meta-crate (`scenegl`) reexports the following sub-crates for convenience:
//!
//! * **scenegl_geom** - Bézier curves, arcs and their flattening.
//! * **scenegl_path** - Parsing, normalization, flattening and simplification of SVG
//!   path data.
//! * **scenegl_tessellation** - Sweep-line fill tessellation and stroke extrusion.
//! * **scenegl_renderer** - Geometry cache, mark geometry builders and the GPU draw
//!   dispatcher.
//!
//! Each `scenegl_<name>` crate is reexported as a `<name>` module in `scenegl`. For example:
//!
//! ```ignore
//! extern crate scenegl_tessellation;
//! use scenegl_tessellation::FillTessellator;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! extern crate scenegl;
//! use scenegl::tessellation::FillTessellator;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! # Examples
//!
//! ## Tessellating path data
//!
//! ```
//! use scenegl::path::{contours_for_path, FlatteningOptions};
//! use scenegl::tessellation::{FillOptions, FillTessellator};
//!
//! let contours = contours_for_path(
//!     "M0,0 L10,0 L10,10 L0,10 Z",
//!     &FlatteningOptions::tolerance(0.1),
//! ).unwrap();
//!
//! // Straight edges flatten to their endpoints.
//! assert_eq!(contours[0].points.len(), 5);
//!
//! let mut tessellator = FillTessellator::new();
//! let output = tessellator
//!     .tessellate_contours(&contours, &FillOptions::non_zero())
//!     .unwrap();
//!
//! assert_eq!(output.triangles().count(), 2);
//! ```
//!
//! ## Caching shapes
//!
//! ```
//! use scenegl::renderer::{GeometryCache, ItemStyle};
//!
//! let mut cache = GeometryCache::default();
//! let style = ItemStyle::fill([1.0, 0.0, 0.0, 1.0]).with_stroke([0.0, 0.0, 0.0, 1.0], 2.0);
//! let geometry = cache
//!     .geometry_for_item("M0,0 L10,0 L10,10 L0,10 Z", &style, 0.1)
//!     .unwrap();
//!
//! // Three vertices per triangle, each with its own color.
//! assert_eq!(geometry.vertices.len(), geometry.num_triangles * 3);
//! assert_eq!(geometry.colors.len(), geometry.vertices.len());
//! assert_eq!(cache.len(), 1);
//! ```

pub use scenegl_geom as geom;
pub use scenegl_path as path;
pub use scenegl_renderer as renderer;
pub use scenegl_tessellation as tessellation;

pub use crate::path::math;
