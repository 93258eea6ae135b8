use crate::math::*;
use crate::path::Contour;
use crate::{
    LineCap, LineJoin, StrokeOptions, TessellationResult, UnsupportedParameter,
};

/// The triangles produced by the stroke tessellator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeMesh {
    pub positions: Vec<Point>,
    pub cells: Vec<[u32; 3]>,
}

impl StrokeMesh {
    pub fn new() -> Self {
        StrokeMesh::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.cells.clear();
    }

    fn push(&mut self, p: Point) -> u32 {
        self.positions.push(p);
        self.positions.len() as u32 - 1
    }
}

/// Extrudes a polyline into a strip of triangles.
///
/// ## Overview
///
/// Each segment of the polyline is extruded into a quad of width `line_width`,
/// centered on the segment. At each interior vertex the quads of the incoming
/// and outgoing segments are connected by a join:
///
/// - a miter join moves the two sides of the strip to the intersection of the
///   offset segments, so the quads share their end points.
/// - a bevel join keeps the outer corners of both quads and fills the wedge
///   between them with a triangle. The inner side is shared.
///
/// Miter joins whose length exceed `miter_limit` times the half line width
/// fall back to bevel joins.
///
/// Caps are applied at both ends of open polylines. Closed polylines get a join
/// at their first vertex instead.
///
/// Overlapping parts of the strip (for example at self-intersections) produce
/// overlapping triangles.
///
/// # Examples
///
/// ```
/// # extern crate scenegl_tessellation as tess;
/// # use tess::{StrokeTessellator, StrokeOptions, StrokeMesh};
/// # use tess::math::point;
/// # fn main() {
/// let mut tessellator = StrokeTessellator::new();
/// let mut mesh = StrokeMesh::new();
/// tessellator.tessellate_polyline(
///     &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)],
///     false,
///     &StrokeOptions::DEFAULT.with_line_width(2.0),
///     &mut mesh,
/// ).unwrap();
///
/// // Two quads.
/// assert_eq!(mesh.cells.len(), 4);
/// # }
/// ```
#[derive(Default)]
pub struct StrokeTessellator {
    points: Vec<Point>,
}

// The two sides of the strip at a vertex. Bevel joins have distinct points for
// the incoming and outgoing segments on their outer side.
#[derive(Copy, Clone, Debug)]
struct Extrusion {
    in_left: u32,
    in_right: u32,
    out_left: u32,
    out_right: u32,
}

impl StrokeTessellator {
    pub fn new() -> Self {
        StrokeTessellator { points: Vec::new() }
    }

    /// Strokes every contour, appending the triangles to `output`.
    pub fn tessellate_contours(
        &mut self,
        contours: &[Contour],
        options: &StrokeOptions,
        output: &mut StrokeMesh,
    ) -> TessellationResult<()> {
        for contour in contours {
            self.tessellate_polyline(&contour.points, contour.closed, options, output)?;
        }

        Ok(())
    }

    /// Strokes a polyline, appending the triangles to `output`.
    ///
    /// Consecutive duplicate points are ignored. Polylines with less than two
    /// distinct points produce no geometry.
    pub fn tessellate_polyline(
        &mut self,
        points: &[Point],
        closed: bool,
        options: &StrokeOptions,
        output: &mut StrokeMesh,
    ) -> TessellationResult<()> {
        if options.line_width.is_nan() {
            return Err(UnsupportedParameter::LineWidthIsNaN.into());
        }
        if points.iter().any(|p| p.x.is_nan() || p.y.is_nan()) {
            return Err(UnsupportedParameter::PositionIsNaN.into());
        }

        self.points.clear();
        for &p in points {
            if self.points.last() != Some(&p) {
                self.points.push(p);
            }
        }
        let mut closed = closed;
        if self.points.len() > 2 && self.points.first() == self.points.last() {
            self.points.pop();
            closed = true;
        }

        let n = self.points.len();
        if n < 2 || options.line_width <= 0.0 {
            return Ok(());
        }
        // A closed polyline needs at least a triangle to have a meaningful seam.
        let closed = closed && n > 2;

        let builder = StrokeBuilder {
            half_width: options.line_width * 0.5,
            options,
            points: &self.points,
            closed,
        };

        builder.build(output);

        Ok(())
    }
}

/// Convenience function to stroke a single polyline.
pub fn stroke_polyline(
    points: &[Point],
    closed: bool,
    options: &StrokeOptions,
) -> TessellationResult<StrokeMesh> {
    let mut output = StrokeMesh::new();
    StrokeTessellator::new().tessellate_polyline(points, closed, options, &mut output)?;

    Ok(output)
}

struct StrokeBuilder<'l> {
    half_width: f32,
    options: &'l StrokeOptions,
    points: &'l [Point],
    closed: bool,
}

impl<'l> StrokeBuilder<'l> {
    fn build(&self, output: &mut StrokeMesh) {
        let n = self.points.len();
        let segment_count = if self.closed { n } else { n - 1 };

        let mut extrusions = Vec::with_capacity(n);
        for i in 0..n {
            let extrusion = if !self.closed && i == 0 {
                self.cap(output, self.points[0], self.direction(0), -1.0)
            } else if !self.closed && i == n - 1 {
                self.cap(output, self.points[n - 1], self.direction(n - 2), 1.0)
            } else {
                let prev = (i + n - 1) % n;
                self.join(output, self.points[i], self.direction(prev), self.direction(i))
            };
            extrusions.push(extrusion);
        }

        for i in 0..segment_count {
            let from = &extrusions[i];
            let to = &extrusions[(i + 1) % n];
            output
                .cells
                .push([from.out_left, from.out_right, to.in_left]);
            output
                .cells
                .push([to.in_left, from.out_right, to.in_right]);
        }
    }

    // Unit direction of the segment starting at point i.
    fn direction(&self, i: usize) -> Vector {
        let from = self.points[i];
        let to = self.points[(i + 1) % self.points.len()];
        (to - from).normalize()
    }

    // `sign` is -1 at the start of the polyline and 1 at the end.
    fn cap(&self, output: &mut StrokeMesh, p: Point, direction: Vector, sign: f32) -> Extrusion {
        let h = self.half_width;
        let p = match self.options.line_cap {
            LineCap::Butt => p,
            LineCap::Square => p + direction * (h * sign),
        };
        let normal = vector(-direction.y, direction.x);

        let left = output.push(p + normal * h);
        let right = output.push(p - normal * h);

        Extrusion {
            in_left: left,
            in_right: right,
            out_left: left,
            out_right: right,
        }
    }

    fn join(&self, output: &mut StrokeMesh, p: Point, d_in: Vector, d_out: Vector) -> Extrusion {
        let h = self.half_width;
        let n_in = vector(-d_in.y, d_in.x);
        let n_out = vector(-d_out.y, d_out.x);

        let tangent = d_in + d_out;
        let (miter, miter_length) = if tangent.square_length() < 1e-12 {
            // The polyline turns back on itself.
            (n_in, f32::INFINITY)
        } else {
            let tangent = tangent.normalize();
            let miter = vector(-tangent.y, tangent.x);
            (miter, h / miter.dot(n_in))
        };

        let bevel = self.options.line_join == LineJoin::Bevel
            || miter_length / h > self.options.miter_limit;

        if !bevel {
            let left = output.push(p + miter * miter_length);
            let right = output.push(p - miter * miter_length);
            return Extrusion {
                in_left: left,
                in_right: right,
                out_left: left,
                out_right: right,
            };
        }

        // The outer side of the turn is on the right for left turns.
        let inner_length = miter_length.min(h * self.options.miter_limit);
        if d_in.cross(d_out) > 0.0 {
            let inner = output.push(p + miter * inner_length);
            let outer_in = output.push(p - n_in * h);
            let outer_out = output.push(p - n_out * h);
            output.cells.push([inner, outer_in, outer_out]);
            Extrusion {
                in_left: inner,
                in_right: outer_in,
                out_left: inner,
                out_right: outer_out,
            }
        } else {
            let inner = output.push(p - miter * inner_length);
            let outer_in = output.push(p + n_in * h);
            let outer_out = output.push(p + n_out * h);
            output.cells.push([inner, outer_in, outer_out]);
            Extrusion {
                in_left: outer_in,
                in_right: inner,
                out_left: outer_out,
                out_right: inner,
            }
        }
    }
}

#[cfg(test)]
fn triangle_area(mesh: &StrokeMesh) -> f32 {
    mesh.cells
        .iter()
        .map(|cell| {
            let a = mesh.positions[cell[0] as usize];
            let b = mesh.positions[cell[1] as usize];
            let c = mesh.positions[cell[2] as usize];
            ((b - a).cross(c - a) * 0.5).abs()
        })
        .sum()
}

#[test]
fn test_single_segment() {
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(10.0, 0.0)],
        false,
        &StrokeOptions::DEFAULT.with_line_width(2.0),
    )
    .unwrap();

    assert_eq!(mesh.positions.len(), 4);
    assert_eq!(mesh.cells.len(), 2);
    assert!((triangle_area(&mesh) - 20.0).abs() < 1e-4);
    for p in &mesh.positions {
        assert!(p.y.abs() == 1.0);
        assert!(p.x == 0.0 || p.x == 10.0);
    }
}

#[test]
fn test_square_cap() {
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(10.0, 0.0)],
        false,
        &StrokeOptions::DEFAULT
            .with_line_width(2.0)
            .with_line_cap(LineCap::Square),
    )
    .unwrap();

    assert!((triangle_area(&mesh) - 24.0).abs() < 1e-4);
    let min_x = mesh.positions.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let max_x = mesh.positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    assert_eq!(min_x, -1.0);
    assert_eq!(max_x, 11.0);
}

#[test]
fn test_miter_join() {
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)],
        false,
        &StrokeOptions::DEFAULT.with_line_width(2.0),
    )
    .unwrap();

    // Four points for the caps, two for the join.
    assert_eq!(mesh.positions.len(), 6);
    assert_eq!(mesh.cells.len(), 4);
    // The outer corner of the miter.
    assert!(mesh
        .positions
        .iter()
        .any(|p| (p.x - 11.0).abs() < 1e-4 && (p.y + 1.0).abs() < 1e-4));
    // 11x1 + 1x11 minus nothing overlapping: two L-shaped quads.
    assert!((triangle_area(&mesh) - 40.0).abs() < 1e-3);
}

#[test]
fn test_bevel_join() {
    let options = StrokeOptions::DEFAULT
        .with_line_width(2.0)
        .with_line_join(LineJoin::Bevel);
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)],
        false,
        &options,
    )
    .unwrap();

    // One extra triangle for the wedge.
    assert_eq!(mesh.cells.len(), 5);
    assert_eq!(mesh.positions.len(), 7);
    assert!(!mesh
        .positions
        .iter()
        .any(|p| (p.x - 11.0).abs() < 1e-4 && (p.y + 1.0).abs() < 1e-4));
    // The miter corner is cut by a triangle of area 0.5.
    assert!((triangle_area(&mesh) - 39.5).abs() < 1e-3);
}

#[test]
fn test_miter_limit() {
    // A very sharp turn exceeds the default miter limit and gets beveled.
    let points = [point(0.0, 0.0), point(10.0, 0.0), point(0.0, 0.5)];
    let mesh = stroke_polyline(&points, false, &StrokeOptions::DEFAULT).unwrap();
    assert_eq!(mesh.cells.len(), 5);

    let limit = StrokeOptions::DEFAULT.miter_limit * 0.5;
    for p in &mesh.positions {
        let closest = points
            .iter()
            .map(|c| (*p - *c).length())
            .fold(f32::MAX, f32::min);
        assert!(closest <= 0.5 + limit + 1e-3);
    }
}

#[test]
fn test_reversal() {
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(10.0, 0.0), point(5.0, 0.0)],
        false,
        &StrokeOptions::DEFAULT,
    )
    .unwrap();

    assert!(!mesh.is_empty());
    for p in &mesh.positions {
        assert!(p.x.is_finite() && p.y.is_finite());
    }
}

#[test]
fn test_closed_square() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let mesh = stroke_polyline(&square, true, &StrokeOptions::DEFAULT.with_line_width(2.0))
        .unwrap();

    // A join at every corner, no caps.
    assert_eq!(mesh.positions.len(), 8);
    assert_eq!(mesh.cells.len(), 8);
    // 12x12 minus 8x8.
    assert!((triangle_area(&mesh) - 80.0).abs() < 1e-3);

    // Repeating the first point closes the polyline as well.
    let mut repeated = square.to_vec();
    repeated.push(square[0]);
    let same = stroke_polyline(&repeated, false, &StrokeOptions::DEFAULT.with_line_width(2.0))
        .unwrap();
    assert_eq!(same, mesh);
}

#[test]
fn test_degenerate_input() {
    let options = StrokeOptions::DEFAULT;
    assert!(stroke_polyline(&[], false, &options).unwrap().is_empty());
    assert!(stroke_polyline(&[point(1.0, 1.0)], false, &options)
        .unwrap()
        .is_empty());
    assert!(stroke_polyline(&[point(1.0, 1.0), point(1.0, 1.0)], true, &options)
        .unwrap()
        .is_empty());

    // Duplicates are dropped.
    let mesh = stroke_polyline(
        &[point(0.0, 0.0), point(0.0, 0.0), point(5.0, 0.0), point(5.0, 0.0)],
        false,
        &options,
    )
    .unwrap();
    assert_eq!(mesh.cells.len(), 2);
}

#[test]
fn test_nan() {
    let options = StrokeOptions::DEFAULT;
    assert!(stroke_polyline(&[point(0.0, 0.0), point(f32::NAN, 1.0)], false, &options).is_err());
    assert!(stroke_polyline(
        &[point(0.0, 0.0), point(1.0, 1.0)],
        false,
        &options.with_line_width(f32::NAN)
    )
    .is_err());
}
