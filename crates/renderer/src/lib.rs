#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Rendering of scene graphs with triangles.
//!
//! This crate is reexported in [scenegl](https://docs.rs/scenegl/).
//!
//! ## Overview
//!
//! A scene is a tree of [marks](scene/struct.Mark.html), each mark holding items of a
//! single [type](scene/enum.MarkType.html). Rendering a scene goes through these steps:
//!
//! 1. Each item is converted into SVG path data in its local coordinates by the
//!    [mark builders](marks/index.html). Line and area marks produce a single path for
//!    all of their items.
//! 2. The [geometry cache](cache/struct.GeometryCache.html) parses, flattens and fills the
//!    path data. Shapes are keyed by their path data so identical shapes are tessellated
//!    once.
//! 3. The [GPU renderer](gpu/struct.GpuRenderer.html) assembles the vertex and color
//!    buffers of each item, uploads them through a [GpuContext](gpu/trait.GpuContext.html)
//!    and issues one draw call per item. Buffers are only rebuilt when the geometry or
//!    the style of an item changes.
//!
//! Text, images and gradients are not drawn with triangles. They are forwarded to a
//! [FallbackLayer](gpu/trait.FallbackLayer.html).

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use scenegl_path as path;
pub use scenegl_tessellation as tessellation;

pub use crate::path::math;

pub mod cache;
pub mod color;
mod error;
pub mod gpu;
pub mod marks;
pub mod scene;

#[cfg(test)]
mod gpu_tests;

#[doc(inline)]
pub use crate::cache::{
    GeometryCache, GeometryCacheOptions, GpuColor, GpuVertex, ItemGeometry, ItemStyle,
    ShapeGeometry,
};
#[doc(inline)]
pub use crate::color::{ColorResolver, CssColors, Rgba};
pub use crate::error::RenderError;
#[doc(inline)]
pub use crate::gpu::{
    BufferId, FallbackLayer, GpuContext, GpuRenderer, NoFallback, RenderStatus, Renderer,
    RendererOptions,
};
#[doc(inline)]
pub use crate::scene::{Item, Mark, MarkType, Orient, Paint};
