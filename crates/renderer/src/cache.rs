//! Memoized tessellation of path data.
//!
//! The cache has two layers:
//!
//! - [`GeometryCache::geometry_for_path`] flattens and fills a path. The result
//!   is shared (`Rc`) and only recomputed after the cache is flushed.
//! - [`GeometryCache::geometry_for_item`] assembles the vertex and color
//!   buffers of an item from the cached shape. Stroke triangles depend on the
//!   item's stroke parameters and are recomputed on every call.

use crate::color::Rgba;
use crate::math::Point;
use crate::path::{
    build_contours, commands::ends_with_close, normalize, parse, Contour, FlatteningOptions,
    LineCap, LineJoin, ParseError, WindingRule,
};
use crate::tessellation::{
    FillOptions, FillTessellator, StrokeMesh, StrokeOptions, StrokeTessellator,
};

use bytemuck::{Pod, Zeroable};

use std::collections::HashMap;
use std::rc::Rc;

/// Parameters of the geometry cache.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct GeometryCacheOptions {
    /// The cache is flushed when inserting more than this many paths.
    ///
    /// Default value: `GeometryCacheOptions::DEFAULT_MAX_ENTRIES`.
    pub max_entries: usize,

    /// Default value: `WindingRule::NonZero`.
    pub winding_rule: WindingRule,

    /// Give each new shape a distinct depth in `[0, 1)` instead of zero, so that
    /// overlapping shapes can be ordered with a depth test.
    ///
    /// Default value: `false`.
    pub z_jitter: bool,
}

impl GeometryCacheOptions {
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    pub const DEFAULT: Self = GeometryCacheOptions {
        max_entries: Self::DEFAULT_MAX_ENTRIES,
        winding_rule: WindingRule::NonZero,
        z_jitter: false,
    };

    #[inline]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[inline]
    pub const fn with_winding_rule(mut self, winding_rule: WindingRule) -> Self {
        self.winding_rule = winding_rule;
        self
    }

    #[inline]
    pub const fn with_z_jitter(mut self, z_jitter: bool) -> Self {
        self.z_jitter = z_jitter;
        self
    }
}

impl Default for GeometryCacheOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The flattened outline of a path and its fill triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeGeometry {
    /// The path data this geometry was computed from.
    pub key: String,
    pub tolerance: f32,
    /// The simplified contours, used for stroking.
    pub contours: Vec<Contour>,
    /// Fill triangles, three vertices each.
    pub triangles: Vec<Point>,
    /// Whether the path ends with a close command.
    pub closed: bool,
    pub z: f32,
}

impl ShapeGeometry {
    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuColor {
    pub color: [f32; 4],
}

/// How an item paints its shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ItemStyle {
    /// Fill color, with the item's opacity applied.
    pub fill: Option<Rgba>,
    /// Stroke color, with the item's opacity applied.
    pub stroke: Option<Rgba>,
    pub stroke_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f32,
}

impl ItemStyle {
    pub fn fill(color: Rgba) -> Self {
        ItemStyle {
            fill: Some(color),
            stroke: None,
            stroke_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: StrokeOptions::DEFAULT_MITER_LIMIT,
        }
    }

    pub fn with_stroke(mut self, color: Rgba, width: f32) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }

    fn stroke_options(&self) -> StrokeOptions {
        StrokeOptions::DEFAULT
            .with_line_width(self.stroke_width)
            .with_line_cap(self.line_cap)
            .with_line_join(self.line_join)
            .with_miter_limit(self.miter_limit.max(StrokeOptions::MINIMUM_MITER_LIMIT))
    }
}

/// Identifies the buffers of an item: two items with the same key have the same
/// vertices and colors.
pub fn buffer_key(path: &str, style: &ItemStyle) -> String {
    format!(
        "{};{};{};{:?};{};{:?};{:?}",
        path,
        style.stroke_width,
        style.line_cap.name(),
        style.line_join,
        style.miter_limit,
        style.fill,
        style.stroke,
    )
}

/// The vertices and colors of an item, ready to be uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemGeometry {
    pub key: String,
    pub vertices: Vec<GpuVertex>,
    pub colors: Vec<GpuColor>,
    pub num_triangles: usize,
}

impl ItemGeometry {
    pub fn is_empty(&self) -> bool {
        self.num_triangles == 0
    }

    fn push_triangle_vertex(&mut self, p: Point, z: f32, color: Rgba) {
        self.vertices.push(GpuVertex {
            position: [p.x, p.y, z],
        });
        self.colors.push(GpuColor { color });
    }
}

pub struct GeometryCache {
    options: GeometryCacheOptions,
    shapes: HashMap<String, Rc<ShapeGeometry>>,
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    stroke_mesh: StrokeMesh,
    next_z: usize,
    flush_count: usize,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(GeometryCacheOptions::DEFAULT)
    }
}

impl GeometryCache {
    pub fn new(options: GeometryCacheOptions) -> Self {
        GeometryCache {
            options,
            shapes: HashMap::new(),
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            stroke_mesh: StrokeMesh::new(),
            next_z: 0,
            flush_count: 0,
        }
    }

    pub fn options(&self) -> &GeometryCacheOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// How many times the cache was flushed for exceeding its capacity.
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.next_z = 0;
    }

    /// The flattened contours and fill triangles of a path.
    ///
    /// Returns the cached geometry when the path was already tessellated with the
    /// same tolerance. Malformed path data is an error. Tessellation failures are
    /// logged and produce a geometry without fill triangles.
    pub fn geometry_for_path(
        &mut self,
        path: &str,
        tolerance: f32,
    ) -> Result<Rc<ShapeGeometry>, ParseError> {
        if let Some(shape) = self.shapes.get(path) {
            if shape.tolerance == tolerance {
                return Ok(Rc::clone(shape));
            }
        }

        let commands = parse(path)?;
        let closed = ends_with_close(&commands);
        let normalized = normalize(&commands);
        let flattening = FlatteningOptions::tolerance(tolerance);
        let contours: Vec<Contour> = build_contours(&normalized, closed, &flattening)
            .iter()
            .map(|contour| contour.simplified(tolerance))
            .filter(|contour| !contour.is_empty())
            .collect();

        let fill_options = FillOptions::DEFAULT
            .with_winding_rule(self.options.winding_rule)
            .with_normal([0.0, 0.0, 1.0]);

        let triangles = match self.fill_tess.tessellate_contours(&contours, &fill_options) {
            Ok(output) => output
                .triangles()
                .flat_map(|tri| tri.to_vec())
                .map(|idx| {
                    let v = output.vertices[idx as usize];
                    Point::new(v[0], v[1])
                })
                .collect(),
            Err(e) => {
                log::warn!("Failed to tessellate path {:?}: {}", path, e);
                Vec::new()
            }
        };

        if !self.shapes.contains_key(path) && self.shapes.len() >= self.options.max_entries {
            log::debug!(
                "Geometry cache exceeded {} entries, flushing.",
                self.options.max_entries
            );
            self.clear();
            self.flush_count += 1;
        }

        let z = if self.options.z_jitter {
            let z = self.next_z as f32 / self.options.max_entries.max(1) as f32;
            self.next_z += 1;
            z
        } else {
            0.0
        };

        let shape = Rc::new(ShapeGeometry {
            key: path.to_string(),
            tolerance,
            contours,
            triangles,
            closed,
            z,
        });
        self.shapes.insert(path.to_string(), Rc::clone(&shape));

        Ok(shape)
    }

    /// Assembles the triangles and per-vertex colors of an item.
    ///
    /// Fill triangles come from the cached shape. Stroke triangles are computed
    /// from the cached contours.
    pub fn geometry_for_item(
        &mut self,
        path: &str,
        style: &ItemStyle,
        tolerance: f32,
    ) -> Result<ItemGeometry, ParseError> {
        let shape = self.geometry_for_path(path, tolerance)?;

        let mut geometry = ItemGeometry {
            key: buffer_key(path, style),
            vertices: Vec::new(),
            colors: Vec::new(),
            num_triangles: 0,
        };

        if let Some(fill) = style.fill {
            for &p in &shape.triangles {
                geometry.push_triangle_vertex(p, shape.z, fill);
            }
        }

        if let Some(stroke) = style.stroke {
            self.stroke_mesh.clear();
            let result = self.stroke_tess.tessellate_contours(
                &shape.contours,
                &style.stroke_options(),
                &mut self.stroke_mesh,
            );
            match result {
                Ok(()) => {
                    for cell in &self.stroke_mesh.cells {
                        for &idx in cell {
                            let p = self.stroke_mesh.positions[idx as usize];
                            geometry.push_triangle_vertex(p, shape.z, stroke);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Failed to stroke path {:?}: {}", path, e);
                }
            }
        }

        geometry.num_triangles = geometry.vertices.len() / 3;

        Ok(geometry)
    }
}

#[cfg(test)]
fn triangle_area(triangles: &[Point]) -> f32 {
    triangles
        .chunks(3)
        .map(|t| ((t[1] - t[0]).cross(t[2] - t[0]) * 0.5).abs())
        .sum()
}

#[test]
fn rectangle() {
    let mut cache = GeometryCache::default();
    let shape = cache
        .geometry_for_path("M0,0 L10,0 L10,10 L0,10 Z", 1.0)
        .unwrap();

    assert_eq!(shape.num_triangles(), 2);
    assert!((triangle_area(&shape.triangles) - 100.0).abs() < 1e-3);
    assert!(shape.closed);
    assert_eq!(shape.contours.len(), 1);

    let geometry = cache
        .geometry_for_item("M0,0 L10,0 L10,10 L0,10 Z", &ItemStyle::fill([1.0, 0.0, 0.0, 1.0]), 1.0)
        .unwrap();
    assert_eq!(geometry.num_triangles, 2);
    assert_eq!(geometry.vertices.len(), 6);
    assert!(geometry.colors.iter().all(|c| c.color == [1.0, 0.0, 0.0, 1.0]));
}

#[cfg(test)]
fn shape_area(path: &str, winding_rule: WindingRule) -> f32 {
    let options = GeometryCacheOptions::DEFAULT.with_winding_rule(winding_rule);
    let mut cache = GeometryCache::new(options);
    let shape = cache.geometry_for_path(path, 0.1).unwrap();
    triangle_area(&shape.triangles)
}

#[test]
fn square_with_a_hole() {
    let path = "M0,0 L30,0 L30,30 L0,30 Z M10,10 L10,20 L20,20 L20,10 Z";
    for &rule in &[WindingRule::NonZero, WindingRule::Odd] {
        assert!((shape_area(path, rule) - 800.0).abs() < 1e-2);
    }

    // Every triangle vertex is one of the corners of the path.
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(30.0, 0.0),
        Point::new(30.0, 30.0),
        Point::new(0.0, 30.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 20.0),
        Point::new(20.0, 20.0),
        Point::new(20.0, 10.0),
    ];
    let mut cache = GeometryCache::default();
    let shape = cache.geometry_for_path(path, 0.1).unwrap();
    assert_eq!(shape.num_triangles(), 8);
    for p in &shape.triangles {
        assert!(corners.contains(p), "{:?} is not a corner", p);
    }
    assert_eq!(shape.contours[0].points[..4], corners[..4]);
    assert_eq!(shape.contours[1].points[..4], corners[4..]);
}

#[test]
fn annulus() {
    // Two circles of opposite orientations.
    let path = "M10,0 A10,10 0 1,1 -10,0 A10,10 0 1,1 10,0 Z \
                M5,0 A5,5 0 1,0 -5,0 A5,5 0 1,0 5,0 Z";
    let expected = core::f32::consts::PI * 75.0;
    for &rule in &[WindingRule::NonZero, WindingRule::Odd] {
        let area = shape_area(path, rule);
        assert!((area - expected).abs() < expected * 0.02, "{:?}: {}", rule, area);
    }
}

#[test]
fn bowtie_winding_rules() {
    let path = "M0,0 L10,10 L10,0 L0,10 Z";
    assert!((shape_area(path, WindingRule::NonZero) - 50.0).abs() < 1e-2);
    assert!((shape_area(path, WindingRule::Odd) - 50.0).abs() < 1e-2);
    // One lobe winds each way.
    assert!((shape_area(path, WindingRule::Positive) - 25.0).abs() < 1e-2);
    assert!((shape_area(path, WindingRule::Negative) - 25.0).abs() < 1e-2);
    assert_eq!(shape_area(path, WindingRule::AbsGeqTwo), 0.0);
}

#[test]
fn overlapping_squares_winding_rules() {
    let path = "M0,0 L20,0 L20,20 L0,20 Z M10,10 L30,10 L30,30 L10,30 Z";
    assert!((shape_area(path, WindingRule::AbsGeqTwo) - 100.0).abs() < 1e-2);
    assert!((shape_area(path, WindingRule::NonZero) - 700.0).abs() < 1e-2);
    assert!((shape_area(path, WindingRule::Odd) - 600.0).abs() < 1e-2);
}

#[test]
fn circle() {
    let mut cache = GeometryCache::default();
    let shape = cache
        .geometry_for_path("M10,0 A10,10 0 1,1 -10,0 A10,10 0 1,1 10,0 Z", 0.1)
        .unwrap();

    let expected = core::f32::consts::PI * 100.0;
    assert!((triangle_area(&shape.triangles) - expected).abs() < expected * 0.01);
}

#[test]
fn cache_hits_share_the_geometry() {
    let mut cache = GeometryCache::default();
    let a = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 0.5).unwrap();
    let b = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 0.5).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);

    // A different tolerance recomputes the shape.
    let c = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 0.1).unwrap();
    assert!(!Rc::ptr_eq(&a, &c));
    assert_eq!(cache.len(), 1);
}

#[test]
fn flush_when_full() {
    let mut cache = GeometryCache::new(GeometryCacheOptions::DEFAULT.with_max_entries(3));
    let first = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 1.0).unwrap();
    for i in 1..3 {
        cache
            .geometry_for_path(&format!("M0,0 L{},0 L1,1 Z", i + 1), 1.0)
            .unwrap();
    }
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.flush_count(), 0);

    // Hits never flush.
    let again = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 1.0).unwrap();
    assert!(Rc::ptr_eq(&first, &again));

    cache.geometry_for_path("M0,0 L9,0 L1,1 Z", 1.0).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.flush_count(), 1);

    let after = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 1.0).unwrap();
    assert!(!Rc::ptr_eq(&first, &after));
    assert_eq!(*first, *after);
}

#[test]
fn parse_errors_are_reported() {
    let mut cache = GeometryCache::default();
    assert!(cache.geometry_for_path("M0,0 L1", 1.0).is_err());
    assert!(cache.is_empty());
}

#[test]
fn stroke_only() {
    let mut cache = GeometryCache::default();
    let style = ItemStyle {
        fill: None,
        ..ItemStyle::fill([0.0; 4])
    }
    .with_stroke([0.0, 0.0, 1.0, 1.0], 2.0);

    let geometry = cache.geometry_for_item("M0,0 L10,0", &style, 1.0).unwrap();
    // One segment, two triangles covering 10 x 2.
    assert_eq!(geometry.num_triangles, 2);
    let positions: Vec<Point> = geometry
        .vertices
        .iter()
        .map(|v| Point::new(v.position[0], v.position[1]))
        .collect();
    assert!((triangle_area(&positions) - 20.0).abs() < 1e-3);

    // The open line has no fill.
    let shape = cache.geometry_for_path("M0,0 L10,0", 1.0).unwrap();
    assert_eq!(shape.num_triangles(), 0);
    assert!(!shape.closed);
}

#[test]
fn fill_and_stroke() {
    let mut cache = GeometryCache::default();
    let style = ItemStyle::fill([1.0; 4]).with_stroke([0.0, 0.0, 0.0, 1.0], 1.0);
    let geometry = cache
        .geometry_for_item("M0,0 L10,0 L10,10 L0,10 Z", &style, 1.0)
        .unwrap();

    // Two fill triangles, then a closed stroke of four segments.
    assert_eq!(geometry.num_triangles, 2 + 8);
    assert!(geometry.colors[..6].iter().all(|c| c.color == [1.0; 4]));
    assert!(geometry.colors[6..].iter().all(|c| c.color == [0.0, 0.0, 0.0, 1.0]));

    let other = style.with_stroke([0.0, 0.0, 0.0, 1.0], 3.0);
    assert_ne!(geometry.key, buffer_key("M0,0 L10,0 L10,10 L0,10 Z", &other));
}

#[test]
fn z_jitter() {
    let mut cache = GeometryCache::new(
        GeometryCacheOptions::DEFAULT
            .with_max_entries(4)
            .with_z_jitter(true),
    );
    let a = cache.geometry_for_path("M0,0 L1,0 L1,1 Z", 1.0).unwrap();
    let b = cache.geometry_for_path("M0,0 L2,0 L1,1 Z", 1.0).unwrap();
    assert_eq!(a.z, 0.0);
    assert_eq!(b.z, 0.25);
}

#[test]
fn tessellation_failures_are_not_errors() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cache = GeometryCache::default();
    // Degenerate but valid path data.
    let shape = cache.geometry_for_path("M0,0 L0,0 Z", 1.0).unwrap();
    assert_eq!(shape.num_triangles(), 0);
}
