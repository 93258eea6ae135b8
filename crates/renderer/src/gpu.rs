//! Draws scenes through a GPU context.
//!
//! The [`GpuRenderer`] walks the scene, turns each item into path data, asks the
//! geometry cache for its triangles and issues one draw call per item. The GPU
//! buffers of an item are kept across frames and only replaced when the item's
//! buffer key changes. Text, images and items painted with gradients are
//! forwarded to a [`FallbackLayer`].

use crate::cache::{buffer_key, GeometryCache, GeometryCacheOptions, ItemStyle};
use crate::color::{ColorResolver, CssColors, Rgba};
use crate::marks::{item_path, mark_path, MarkPath};
use crate::math::{point, vector, Box2D, Vector};
use crate::scene::{Item, Mark, MarkType, Paint};
use crate::tessellation::StrokeOptions;
use crate::RenderError;

use std::collections::HashMap;

/// Handle to a buffer owned by a [`GpuContext`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// The GPU operations needed by the renderer.
///
/// Vertex buffers hold [`GpuVertex`](crate::GpuVertex) positions, color buffers
/// hold one [`GpuColor`](crate::GpuColor) per vertex.
pub trait GpuContext {
    /// Sets the size of the drawing surface in CSS pixels.
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32);
    /// Binds the triangle program and clears the surface.
    fn begin_frame(&mut self, depth_test: bool);
    fn end_frame(&mut self);

    fn create_buffer(&mut self) -> BufferId;
    fn buffer_data(&mut self, buffer: BufferId, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Offset applied to the vertices of the next draw calls.
    fn set_translate(&mut self, offset: Vector);
    /// Restricts the next draw calls to a rectangle, in surface coordinates.
    fn set_clip(&mut self, clip: Option<Box2D>);
    fn draw_triangles(&mut self, vertices: BufferId, colors: BufferId, vertex_count: u32);
}

/// Draws what the GPU path does not support.
pub trait FallbackLayer {
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32);
    fn clear(&mut self);
    /// Draws items of the given type, offset by `translate`.
    fn draw(&mut self, marktype: MarkType, items: &[Item], translate: Vector);
}

/// A fallback layer that ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoFallback;

impl FallbackLayer for NoFallback {
    fn resize(&mut self, _: u32, _: u32, _: f32) {}
    fn clear(&mut self) {}
    fn draw(&mut self, _: MarkType, _: &[Item], _: Vector) {}
}

/// Parameters of the renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct RendererOptions {
    /// Maximum distance between a curve and its flattened polyline.
    ///
    /// Default value: `RendererOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
    /// Default value: `false`.
    pub depth_test: bool,
    /// Ratio between surface pixels and CSS pixels.
    ///
    /// Default value: `1.0`.
    pub pixel_ratio: f32,
}

impl RendererOptions {
    pub const DEFAULT_TOLERANCE: f32 = 0.1;

    pub const DEFAULT: Self = RendererOptions {
        tolerance: Self::DEFAULT_TOLERANCE,
        depth_test: false,
        pixel_ratio: 1.0,
    };

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_depth_test(mut self, depth_test: bool) -> Self {
        self.depth_test = depth_test;
        self
    }

    #[inline]
    pub const fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What a call to [`Renderer::render`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderStatus {
    Rendered { draw_calls: usize },
    /// Images are still loading, nothing was drawn.
    Deferred,
}

/// A rendering backend.
pub trait Renderer {
    /// Sets the size of the surface and the offset of the scene's origin.
    fn initialize(&mut self, width: u32, height: u32, origin: Vector);
    fn resize(&mut self, width: u32, height: u32, origin: Vector);
    fn render(&mut self, scene: &Mark) -> Result<RenderStatus, RenderError>;
}

// Identifies an item by its position in the scene tree: pairs of mark and item
// indices from the root.
type ItemKey = Vec<u32>;

struct ItemBuffers {
    key: String,
    vertices: BufferId,
    colors: BufferId,
    vertex_count: u32,
    frame: u64,
}

struct Frame {
    translate: Vector,
    clip: Option<Box2D>,
    draw_calls: usize,
}

pub struct GpuRenderer<C, F> {
    context: C,
    fallback: F,
    colors: Box<dyn ColorResolver>,
    cache: GeometryCache,
    options: RendererOptions,
    size: Option<(u32, u32)>,
    origin: Vector,
    buffers: HashMap<ItemKey, ItemBuffers>,
    pending_images: usize,
    frame: u64,
}

impl<C: GpuContext, F: FallbackLayer> GpuRenderer<C, F> {
    pub fn new(context: C, fallback: F) -> Self {
        Self::with_options(context, fallback, RendererOptions::DEFAULT)
    }

    pub fn with_options(context: C, fallback: F, options: RendererOptions) -> Self {
        GpuRenderer {
            context,
            fallback,
            colors: Box::new(CssColors),
            cache: GeometryCache::new(GeometryCacheOptions::DEFAULT),
            options,
            size: None,
            origin: vector(0.0, 0.0),
            buffers: HashMap::new(),
            pending_images: 0,
            frame: 0,
        }
    }

    pub fn with_cache_options(mut self, options: GeometryCacheOptions) -> Self {
        self.cache = GeometryCache::new(options);
        self
    }

    pub fn with_color_resolver(mut self, colors: Box<dyn ColorResolver>) -> Self {
        self.colors = colors;
        self
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Signals that an image started loading. Rendering is deferred until all
    /// images are loaded.
    pub fn image_loading(&mut self) {
        self.pending_images += 1;
    }

    pub fn image_loaded(&mut self) {
        self.pending_images = self.pending_images.saturating_sub(1);
    }

    pub fn pending_images(&self) -> usize {
        self.pending_images
    }

    /// The number of items that currently own GPU buffers.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Deletes all GPU buffers.
    pub fn release_buffers(&mut self) {
        for (_, buffers) in self.buffers.drain() {
            self.context.delete_buffer(buffers.vertices);
            self.context.delete_buffer(buffers.colors);
        }
    }

    fn draw_mark(&mut self, mark: &Mark, key: &mut ItemKey, frame: &mut Frame) -> Result<(), RenderError> {
        if mark.items.is_empty() {
            return Ok(());
        }

        match mark.marktype {
            MarkType::Group => {
                for (i, item) in mark.items.iter().enumerate() {
                    key.push(i as u32);
                    let result = self.draw_group(item, key, frame);
                    key.pop();
                    result?;
                }
            }
            MarkType::Text | MarkType::Image => {
                self.fallback.draw(mark.marktype, &mark.items, frame.translate);
            }
            MarkType::Line | MarkType::Area => {
                let first = &mark.items[0];
                if first.has_gradient() {
                    self.fallback.draw(mark.marktype, &mark.items, frame.translate);
                } else if let Some(path) = mark_path(mark.marktype, &mark.items) {
                    key.push(0);
                    let result = self.draw_path(mark.marktype, first, &path, key, frame);
                    key.pop();
                    result?;
                }
            }
            _ => {
                for (i, item) in mark.items.iter().enumerate() {
                    if item.has_gradient() {
                        self.fallback
                            .draw(mark.marktype, std::slice::from_ref(item), frame.translate);
                        continue;
                    }
                    if let Some(path) = item_path(mark.marktype, item)? {
                        key.push(i as u32);
                        let result = self.draw_path(mark.marktype, item, &path, key, frame);
                        key.pop();
                        result?;
                    }
                }
            }
        }

        Ok(())
    }

    fn draw_group(&mut self, group: &Item, key: &mut ItemKey, frame: &mut Frame) -> Result<(), RenderError> {
        // The group's background.
        if group.has_gradient() {
            self.fallback
                .draw(MarkType::Group, std::slice::from_ref(group), frame.translate);
        } else if let Some(path) = item_path(MarkType::Group, group)? {
            key.push(u32::MAX);
            let result = self.draw_path(MarkType::Group, group, &path, key, frame);
            key.pop();
            result?;
        }

        let saved_translate = frame.translate;
        let saved_clip = frame.clip;

        frame.translate = saved_translate + vector(group.x, group.y);
        if group.clip {
            let origin = point(frame.translate.x, frame.translate.y);
            let bounds = Box2D::new(origin, origin + vector(group.width, group.height));
            let clip = match saved_clip {
                Some(outer) => outer.intersection(&bounds).unwrap_or_else(|| Box2D::new(origin, origin)),
                None => bounds,
            };
            frame.clip = Some(clip);
            self.context.set_clip(frame.clip);
        }

        let mut result = Ok(());
        for (j, child) in group.items.iter().enumerate() {
            key.push(j as u32);
            result = self.draw_mark(child, key, frame);
            key.pop();
            if result.is_err() {
                break;
            }
        }

        if group.clip {
            self.context.set_clip(saved_clip);
        }
        frame.translate = saved_translate;
        frame.clip = saved_clip;

        result
    }

    fn resolve(&self, paint: &Option<Paint>, opacity: f32) -> Option<Rgba> {
        let color = match paint {
            Some(Paint::Color(color)) => color,
            _ => {
                return None;
            }
        };

        let mut rgba = match self.colors.resolve(color) {
            Some(rgba) => rgba,
            None => {
                log::debug!("Ignoring unknown color {:?}.", color);
                return None;
            }
        };
        rgba[3] *= opacity;
        if rgba[3] <= 0.0 {
            return None;
        }

        Some(rgba)
    }

    fn item_style(&self, item: &Item) -> Option<ItemStyle> {
        let fill = self.resolve(&item.fill, item.fill_opacity());
        let stroke_width = item.stroke_width();
        let stroke = if stroke_width > 0.0 {
            self.resolve(&item.stroke, item.stroke_opacity())
        } else {
            None
        };

        if fill.is_none() && stroke.is_none() {
            return None;
        }

        Some(ItemStyle {
            fill,
            stroke,
            stroke_width,
            line_cap: item.stroke_cap,
            line_join: item.stroke_join,
            miter_limit: item
                .stroke_miter_limit
                .unwrap_or(StrokeOptions::DEFAULT_MITER_LIMIT)
                .max(StrokeOptions::MINIMUM_MITER_LIMIT),
        })
    }

    fn draw_path(
        &mut self,
        marktype: MarkType,
        item: &Item,
        path: &MarkPath,
        key: &ItemKey,
        frame: &mut Frame,
    ) -> Result<(), RenderError> {
        let style = match self.item_style(item) {
            Some(style) => style,
            None => {
                return Ok(());
            }
        };

        let buffer_key = buffer_key(&path.path, &style);
        let up_to_date = self
            .buffers
            .get(key)
            .map_or(false, |buffers| buffers.key == buffer_key);

        if !up_to_date {
            log::trace!("Retessellating {:?} item {:?}.", marktype, key);

            let geometry = self
                .cache
                .geometry_for_item(&path.path, &style, self.options.tolerance)
                .map_err(|e| RenderError::from(e).in_mark(marktype))?;

            if let Some(old) = self.buffers.remove(key) {
                self.context.delete_buffer(old.vertices);
                self.context.delete_buffer(old.colors);
            }

            let vertices = self.context.create_buffer();
            self.context
                .buffer_data(vertices, bytemuck::cast_slice(&geometry.vertices));
            let colors = self.context.create_buffer();
            self.context
                .buffer_data(colors, bytemuck::cast_slice(&geometry.colors));

            self.buffers.insert(
                key.clone(),
                ItemBuffers {
                    key: geometry.key,
                    vertices,
                    colors,
                    vertex_count: geometry.vertices.len() as u32,
                    frame: self.frame,
                },
            );
        }

        let buffers = match self.buffers.get_mut(key) {
            Some(buffers) => buffers,
            None => {
                return Ok(());
            }
        };
        buffers.frame = self.frame;

        if buffers.vertex_count > 0 {
            self.context.set_translate(frame.translate + path.translate);
            self.context
                .draw_triangles(buffers.vertices, buffers.colors, buffers.vertex_count);
            frame.draw_calls += 1;
        }

        Ok(())
    }

    // Deletes the buffers of the items that were not drawn this frame.
    fn release_stale_buffers(&mut self) {
        let frame = self.frame;
        let context = &mut self.context;
        self.buffers.retain(|_, buffers| {
            if buffers.frame == frame {
                return true;
            }
            context.delete_buffer(buffers.vertices);
            context.delete_buffer(buffers.colors);
            false
        });
    }
}

impl<C: GpuContext, F: FallbackLayer> Renderer for GpuRenderer<C, F> {
    fn initialize(&mut self, width: u32, height: u32, origin: Vector) {
        self.release_buffers();
        self.resize(width, height, origin);
    }

    fn resize(&mut self, width: u32, height: u32, origin: Vector) {
        self.size = Some((width, height));
        self.origin = origin;
        self.context.resize(width, height, self.options.pixel_ratio);
        self.fallback.resize(width, height, self.options.pixel_ratio);
    }

    fn render(&mut self, scene: &Mark) -> Result<RenderStatus, RenderError> {
        if self.size.is_none() {
            return Err(RenderError::NotInitialized);
        }

        if self.pending_images > 0 {
            log::debug!(
                "Deferring rendering until {} image(s) are loaded.",
                self.pending_images
            );
            return Ok(RenderStatus::Deferred);
        }

        self.frame += 1;
        self.context.begin_frame(self.options.depth_test);
        self.context.set_clip(None);
        self.fallback.clear();

        let mut frame = Frame {
            translate: self.origin,
            clip: None,
            draw_calls: 0,
        };
        let mut key = Vec::new();
        let result = self.draw_mark(scene, &mut key, &mut frame);

        self.release_stale_buffers();
        self.context.end_frame();

        result.map(|()| RenderStatus::Rendered {
            draw_calls: frame.draw_calls,
        })
    }
}
