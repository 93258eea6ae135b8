use crate::error::*;
use crate::math::Point;
use crate::math_utils::{dot, long_axis, short_axis};
use crate::mesh::{FaceId, Mesh, UNDEF, VERTEX_HEAD};
use crate::path::Contour;
use crate::sweep::Sweep;
use crate::{ElementType, FillOptions};

use core::mem;

/// The output of the fill tessellator.
///
/// With [`ElementType::Polygons`], `elements` holds `polygon_size` vertex indices per
/// polygon, unused slots being set to [`UNDEF`](constant.UNDEF.html). With
/// [`ElementType::BoundaryContours`], `elements` holds a `(first_vertex, vertex_count)`
/// pair per contour.
#[derive(Clone, Debug, PartialEq)]
pub struct FillOutput {
    pub vertices: Vec<[f32; 3]>,
    /// For each output vertex, the insertion order of the input vertex it comes from,
    /// or `None` if it was created at an intersection.
    pub vertex_indices: Vec<Option<u32>>,
    pub elements: Vec<u32>,
    pub element_count: usize,
    pub element_type: ElementType,
}

impl FillOutput {
    fn empty(element_type: ElementType) -> Self {
        FillOutput {
            vertices: Vec::new(),
            vertex_indices: Vec::new(),
            elements: Vec::new(),
            element_count: 0,
            element_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Iterates over the polygons, without the unused slots.
    ///
    /// Empty if the output contains boundary contours.
    pub fn polygons(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let size = match self.element_type {
            ElementType::Polygons(size) => size.max(3),
            ElementType::BoundaryContours => 0,
        };
        let elements: &[u32] = if size == 0 { &[] } else { &self.elements };

        elements.chunks(size.max(1)).map(|polygon| {
            let len = polygon
                .iter()
                .position(|&idx| idx == UNDEF)
                .unwrap_or(polygon.len());
            &polygon[..len]
        })
    }

    /// Iterates over triangles, fanning out polygons with more than three vertices.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.polygons().flat_map(|polygon| {
            (1..polygon.len().saturating_sub(1))
                .map(move |i| [polygon[0], polygon[i], polygon[i + 1]])
        })
    }

    /// Iterates over the vertices of each boundary contour.
    ///
    /// Empty if the output contains polygons.
    pub fn contours(&self) -> impl Iterator<Item = &[[f32; 3]]> + '_ {
        let elements: &[u32] = match self.element_type {
            ElementType::BoundaryContours => &self.elements,
            ElementType::Polygons(_) => &[],
        };

        elements.chunks(2).filter_map(move |pair| {
            let (start, count) = (*pair.first()? as usize, *pair.get(1)? as usize);
            self.vertices.get(start..start + count)
        })
    }
}

/// A sweep-line polygon tessellator.
///
/// Contours are accumulated with the `add_contour*` methods, and consumed by
/// [`tessellate`](#method.tessellate) which computes the interior of the polygon
/// according to the winding rule and outputs it as triangles, convex polygons or
/// boundary contours.
///
/// Input contours can be self-intersecting, overlapping and use any orientation.
/// Three-dimensional input is projected on a plane, given by the normal in
/// [`FillOptions`] or computed from the input if none is specified.
///
/// # Examples
///
/// ```
/// # extern crate scenegl_tessellation as tess;
/// # use tess::{FillTessellator, FillOptions};
/// # use tess::math::point;
/// # fn main() {
/// let mut tessellator = FillTessellator::new();
/// tessellator.add_contour_2d(&[
///     point(0.0, 0.0),
///     point(10.0, 0.0),
///     point(10.0, 10.0),
///     point(0.0, 10.0),
/// ]).unwrap();
///
/// let output = tessellator.tessellate(&FillOptions::DEFAULT).unwrap();
/// assert_eq!(output.triangles().count(), 2);
/// # }
/// ```
pub struct FillTessellator {
    mesh: Mesh,
    next_index: u32,
    log: bool,
}

impl Default for FillTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl FillTessellator {
    pub fn new() -> Self {
        #[cfg(debug_assertions)]
        let log = std::env::var("SCENEGL_FORCE_LOGGING").is_ok();
        #[cfg(not(debug_assertions))]
        let log = false;

        FillTessellator {
            mesh: Mesh::new(),
            next_index: 0,
            log,
        }
    }

    /// Enables or disables the tracing of sweep events.
    ///
    /// Only has an effect in debug builds.
    pub fn set_logging(&mut self, is_enabled: bool) {
        #[cfg(debug_assertions)]
        let forced = std::env::var("SCENEGL_FORCE_LOGGING").is_ok();
        #[cfg(not(debug_assertions))]
        let forced = false;

        self.log = is_enabled || forced;
    }

    /// Adds a contour of 3D points.
    ///
    /// The contour is implicitly closed. Each vertex is given an input index
    /// following the insertion order, starting from zero after each call to
    /// [`tessellate`](#method.tessellate).
    pub fn add_contour(&mut self, points: &[[f64; 3]]) -> TessellationResult<()> {
        if points.iter().any(|p| p.iter().any(|c| c.is_nan())) {
            return Err(UnsupportedParameter::PositionIsNaN.into());
        }

        let mesh = &mut self.mesh;
        let mut e = None;
        for p in points {
            let edge = match e {
                None => {
                    // Make a self-loop (one vertex, one edge).
                    let edge = mesh.make_edge();
                    mesh.splice(edge, edge.sym());
                    edge
                }
                Some(prev) => {
                    // Create a new vertex and edge which immediately follow e
                    // in the ordering around the left face.
                    mesh.split_edge(prev);
                    mesh.lnext(prev)
                }
            };

            let v = mesh.org(edge);
            mesh[v].coords = *p;
            mesh[v].idx = self.next_index;
            self.next_index += 1;

            // The winding of an edge says how the winding number changes as we
            // cross from the edge's right face to its left face.
            mesh[edge].winding = 1;
            mesh[edge.sym()].winding = -1;

            e = Some(edge);
        }

        Ok(())
    }

    /// Adds a contour of 2D points, in the `z = 0` plane.
    pub fn add_contour_2d(&mut self, points: &[Point]) -> TessellationResult<()> {
        let points: Vec<[f64; 3]> = points
            .iter()
            .map(|p| [p.x as f64, p.y as f64, 0.0])
            .collect();

        self.add_contour(&points)
    }

    /// Adds each contour. Open contours are implicitly closed.
    pub fn add_contours(&mut self, contours: &[Contour]) -> TessellationResult<()> {
        for contour in contours {
            if !contour.is_empty() {
                self.add_contour_2d(&contour.points)?;
            }
        }

        Ok(())
    }

    /// Convenience for adding contours and tessellating them in one call.
    pub fn tessellate_contours(
        &mut self,
        contours: &[Contour],
        options: &FillOptions,
    ) -> TessellationResult<FillOutput> {
        if let Err(e) = self.add_contours(contours) {
            self.reset();
            return Err(e);
        }

        self.tessellate(options)
    }

    /// Computes the interior of the contours added so far.
    ///
    /// The tessellator is left empty and can be reused afterwards, whether the
    /// tessellation succeeds or not.
    pub fn tessellate(&mut self, options: &FillOptions) -> TessellationResult<FillOutput> {
        let mut mesh = mem::replace(&mut self.mesh, Mesh::new());
        self.next_index = 0;

        if let Some(normal) = options.normal {
            if normal.iter().any(|c| c.is_nan()) {
                return Err(UnsupportedParameter::NormalIsNaN.into());
            }
        }

        if mesh.vertex_count() == 0 {
            return Ok(FillOutput::empty(options.element));
        }

        let result = self.tessellate_mesh(&mut mesh, options);

        if let Err(e) = &result {
            tess_log!(self, "Tessellation failed with error: {}.", e);
        }

        result
    }

    fn reset(&mut self) {
        self.mesh = Mesh::new();
        self.next_index = 0;
    }

    fn tessellate_mesh(
        &self,
        mesh: &mut Mesh,
        options: &FillOptions,
    ) -> TessellationResult<FillOutput> {
        project_polygon(mesh, options.normal);

        // Determine the polygon normal and project vertices onto the plane of
        // the polygon, then compute the planar arrangement and mark each region
        // inside or outside.
        Sweep::new(mesh, options.winding_rule, self.log).compute_interior()?;

        let output = match options.element {
            ElementType::BoundaryContours => {
                // Replace the winding of the boundary edges and drop the others,
                // leaving one face loop per boundary contour.
                mesh.set_winding_number(1, true);
                check_mesh(mesh)?;
                output_contours(mesh)
            }
            ElementType::Polygons(size) => {
                // Subdivide each inside region into monotone triangles.
                mesh.tessellate_interior();
                check_mesh(mesh)?;
                output_polygons(mesh, size.max(3))?
            }
        };

        tess_log!(
            self,
            "{} elements, {} vertices",
            output.element_count,
            output.vertices.len()
        );

        Ok(output)
    }
}

fn check_mesh(mesh: &Mesh) -> Result<(), InternalError> {
    if cfg!(debug_assertions) && !mesh.check() {
        return Err(InternalError::InvalidMesh);
    }

    Ok(())
}

/// Computes a plane normal from the input vertices.
///
/// Finds the two vertices that are furthest apart along the axis of greatest
/// spread, then the third vertex that maximizes the area of the triangle they
/// form. Collinear input gets a normal perpendicular to the line.
fn compute_normal(mesh: &Mesh) -> [f64; 3] {
    let mut max_val = [f64::MIN; 3];
    let mut min_val = [f64::MAX; 3];
    let mut max_vert = [[0.0; 3]; 3];
    let mut min_vert = [[0.0; 3]; 3];

    let mut v = mesh[VERTEX_HEAD].next;
    while v != VERTEX_HEAD {
        let coords = mesh[v].coords;
        for i in 0..3 {
            let c = coords[i];
            if c < min_val[i] {
                min_val[i] = c;
                min_vert[i] = coords;
            }
            if c > max_val[i] {
                max_val[i] = c;
                max_vert[i] = coords;
            }
        }
        v = mesh[v].next;
    }

    // Find the two vertices separated by at least 1/sqrt(3) of the maximum
    // distance between any two vertices.
    let mut i = 0;
    if max_val[1] - min_val[1] > max_val[0] - min_val[0] {
        i = 1;
    }
    if max_val[2] - min_val[2] > max_val[i] - min_val[i] {
        i = 2;
    }
    if min_val[i] >= max_val[i] {
        // All vertices are the same -- normal doesn't matter.
        return [0.0, 0.0, 1.0];
    }

    // Look for a third vertex which forms the triangle with maximum area
    // (length of normal == twice the triangle area).
    let v1 = min_vert[i];
    let v2 = max_vert[i];
    let d1 = [v1[0] - v2[0], v1[1] - v2[1], v1[2] - v2[2]];

    let mut max_len2 = 0.0;
    let mut normal = [0.0; 3];
    let mut v = mesh[VERTEX_HEAD].next;
    while v != VERTEX_HEAD {
        let c = mesh[v].coords;
        let d2 = [c[0] - v2[0], c[1] - v2[1], c[2] - v2[2]];
        let t = [
            d1[1] * d2[2] - d1[2] * d2[1],
            d1[2] * d2[0] - d1[0] * d2[2],
            d1[0] * d2[1] - d1[1] * d2[0],
        ];
        let len2 = dot(t, t);
        if len2 > max_len2 {
            max_len2 = len2;
            normal = t;
        }
        v = mesh[v].next;
    }

    if max_len2 <= 0.0 {
        // All points lie on a single line -- any decent normal will do.
        normal = [0.0; 3];
        normal[short_axis(d1)] = 1.0;
    }

    normal
}

/// Makes the contours counter-clockwise in the sweep plane, flipping the `t`
/// axis if the overall signed area is negative.
fn check_orientation(mesh: &mut Mesh, t_unit: &mut [f64; 3]) {
    let mut area = 0.0;
    for f in mesh.face_ids() {
        let start = mesh[f].an_edge;
        if mesh[start].winding <= 0 {
            continue;
        }
        let mut e = start;
        loop {
            let (org, dst) = (mesh.st(mesh.org(e)), mesh.st(mesh.dst(e)));
            area += (org.0 - dst.0) * (org.1 + dst.1);
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
    }

    if area < 0.0 {
        // Reverse the orientation by flipping all the t-coordinates.
        let mut v = mesh[VERTEX_HEAD].next;
        while v != VERTEX_HEAD {
            mesh[v].t = -mesh[v].t;
            v = mesh[v].next;
        }
        for c in t_unit.iter_mut() {
            *c = -*c;
        }
    }
}

/// Projects every vertex onto the plane of the polygon, filling in the sweep
/// coordinates `s` and `t`.
fn project_polygon(mesh: &mut Mesh, normal: Option<[f64; 3]>) {
    let (normal, computed) = match normal {
        Some(n) if n != [0.0; 3] => (n, false),
        _ => (compute_normal(mesh), true),
    };

    let i = long_axis(normal);
    let mut s_unit = [0.0; 3];
    let mut t_unit = [0.0; 3];
    s_unit[(i + 1) % 3] = 1.0;
    t_unit[(i + 2) % 3] = if normal[i] > 0.0 { 1.0 } else { -1.0 };

    let mut v = mesh[VERTEX_HEAD].next;
    while v != VERTEX_HEAD {
        let coords = mesh[v].coords;
        mesh[v].s = dot(coords, s_unit);
        mesh[v].t = dot(coords, t_unit);
        v = mesh[v].next;
    }

    if computed {
        check_orientation(mesh, &mut t_unit);
    }
}

fn inside_faces(mesh: &Mesh) -> Vec<FaceId> {
    mesh.face_ids()
        .into_iter()
        .filter(|&f| mesh[f].inside)
        .collect()
}

fn output_polygons(mesh: &mut Mesh, polygon_size: usize) -> TessellationResult<FillOutput> {
    if polygon_size > 3 {
        mesh.merge_convex_faces(polygon_size);
    }

    // Mark unused.
    let mut v = mesh[VERTEX_HEAD].next;
    while v != VERTEX_HEAD {
        mesh[v].n = UNDEF;
        v = mesh[v].next;
    }

    let faces = inside_faces(mesh);

    // Number the vertices in order of first appearance.
    let mut vertices = Vec::new();
    let mut vertex_indices = Vec::new();
    for &f in &faces {
        let count = mesh.face_vertex_count(f);
        if count < 3 || count > polygon_size {
            return Err(InternalError::DegenerateFace.into());
        }

        let start = mesh[f].an_edge;
        let mut e = start;
        loop {
            let v = mesh.org(e);
            if mesh[v].n == UNDEF {
                mesh[v].n = vertices.len() as u32;
                let c = mesh[v].coords;
                vertices.push([c[0] as f32, c[1] as f32, c[2] as f32]);
                vertex_indices.push(if mesh[v].idx == UNDEF {
                    None
                } else {
                    Some(mesh[v].idx)
                });
            }
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
    }

    let mut elements = Vec::with_capacity(faces.len() * polygon_size);
    for &f in &faces {
        let start = mesh[f].an_edge;
        let mut e = start;
        let mut count = 0;
        loop {
            elements.push(mesh[mesh.org(e)].n);
            count += 1;
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        for _ in count..polygon_size {
            elements.push(UNDEF);
        }
    }

    Ok(FillOutput {
        vertices,
        vertex_indices,
        elements,
        element_count: faces.len(),
        element_type: ElementType::Polygons(polygon_size),
    })
}

fn output_contours(mesh: &Mesh) -> FillOutput {
    let faces = inside_faces(mesh);

    let mut vertices = Vec::new();
    let mut vertex_indices = Vec::new();
    let mut elements = Vec::with_capacity(faces.len() * 2);
    for &f in &faces {
        let first = vertices.len() as u32;
        let start = mesh[f].an_edge;
        let mut e = start;
        loop {
            let v = &mesh[mesh.org(e)];
            let c = v.coords;
            vertices.push([c[0] as f32, c[1] as f32, c[2] as f32]);
            vertex_indices.push(if v.idx == UNDEF { None } else { Some(v.idx) });
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        elements.push(first);
        elements.push(vertices.len() as u32 - first);
    }

    FillOutput {
        vertices,
        vertex_indices,
        elements,
        element_count: faces.len(),
        element_type: ElementType::BoundaryContours,
    }
}
