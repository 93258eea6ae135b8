//! The sweep-line pass of the fill tessellator.
//!
//! Invariants for the edge dictionary:
//!
//! - Each pair of adjacent edges `e2 = succ(e1)` satisfies `edge_leq(e1, e2)` at
//!   any valid location of the sweep event.
//! - If `edge_leq(e2, e1)` as well (at any valid sweep event), then `e1` and `e2`
//!   share a common endpoint.
//! - For each `e`, `e.dst` has been processed, but not `e.org`.
//! - Each edge `e` satisfies `vert_leq(e.dst, event) && vert_leq(event, e.org)`
//!   where `event` is the current sweep line event.
//! - No edge `e` has zero length.
//!
//! Invariants for the mesh (the processed portion):
//!
//! - The portion of the mesh left of the sweep line is a planar graph, ie. there
//!   is *some* way to embed it in the plane.
//! - No processed edge has zero length.
//! - No two processed vertices have identical coordinates.
//! - Each "inside" region is monotone, ie. can be broken into two chains of
//!   monotonically increasing vertices according to `vert_leq(v1, v2)`, a
//!   non-invariant: these chains may intersect (very slightly).
//!
//! Invariants for the sweep:
//!
//! - If none of the edges incident to the event vertex have an active region
//!   (ie. none of these edges are in the edge dictionary), then the vertex has
//!   only right-going edges.
//! - If an edge is marked `fix_upper_edge` (it is a temporary edge introduced by
//!   `connect_right_vertex`), then it is the only right-going edge from its
//!   associated vertex. (This says that these edges exist only when it is
//!   necessary.)
//!
//! Vertices are only merged when their projections are exactly equal.

use crate::dict::{Dict, NodeId, DICT_HEAD};
use crate::error::InternalError;
use crate::event_queue::EventQueue;
use crate::math_utils::{edge_eval, edge_intersect, edge_sign, vert_l1_dist, vert_leq, St};
use crate::mesh::{EdgeId, Mesh, RegionId, VertexId, EDGE_HEAD, FACE_HEAD, UNDEF, VERTEX_HEAD};
use crate::path::WindingRule;

type SweepResult<T> = Result<T, InternalError>;

/// For each pair of adjacent edges crossing the sweep line, there is an active
/// region to represent the region between them.
#[derive(Clone, Debug)]
struct ActiveRegion {
    /// Upper edge, directed right to left.
    e_up: EdgeId,
    /// Dictionary node corresponding to `e_up`.
    node_up: NodeId,
    /// Used to determine which regions are inside the polygon.
    winding_number: i32,
    inside: bool,
    /// Marks fake edges at t = +/-infinity.
    sentinel: bool,
    /// Marks regions where the upper or lower edge has changed, but we haven't
    /// checked whether they intersect yet.
    dirty: bool,
    /// Marks temporary edges introduced when we process a "right vertex"
    /// (one without any edges leaving to the right).
    fix_upper_edge: bool,
}

/// Orders two dictionary edges at the current sweep event.
///
/// Both edges must be directed from right to left (this is the canonical
/// direction for the upper edge of each region).
///
/// The strategy is to evaluate a "t" value for each edge at the current sweep
/// line position, given by `event`. The calculations are designed to be very
/// stable, but of course they are not perfect.
///
/// Special case: if both edge destinations are at the sweep event, we sort the
/// edges by slope (they would otherwise compare equally).
fn edge_leq(mesh: &Mesh, event: VertexId, e1: EdgeId, e2: EdgeId) -> bool {
    let (e1_org, e1_dst) = (mesh.org(e1), mesh.dst(e1));
    let (e2_org, e2_dst) = (mesh.org(e2), mesh.dst(e2));

    if e1_dst == event {
        if e2_dst == event {
            // Two edges right of the sweep line which meet at the sweep event.
            // Sort them by slope.
            if mesh.vert_leq(e1_org, e2_org) {
                return mesh.edge_sign(e2_dst, e1_org, e2_org) <= 0.0;
            }
            return mesh.edge_sign(e1_dst, e2_org, e1_org) >= 0.0;
        }
        return mesh.edge_sign(e2_dst, event, e2_org) <= 0.0;
    }
    if e2_dst == event {
        return mesh.edge_sign(e1_dst, event, e1_org) >= 0.0;
    }

    // General case - compute signed distance *from* e1, e2 to event.
    let ev = mesh.st(event);
    let t1 = edge_eval(mesh.st(e1_dst), ev, mesh.st(e1_org));
    let t2 = edge_eval(mesh.st(e2_dst), ev, mesh.st(e2_org));

    t1 >= t2
}

pub(crate) struct Sweep<'l> {
    mesh: &'l mut Mesh,
    dict: Dict,
    regions: Vec<ActiveRegion>,
    queue: EventQueue,
    event: VertexId,
    winding_rule: WindingRule,
    event_count: u64,
    max_events: u64,
    log: bool,
}

impl<'l> Sweep<'l> {
    pub fn new(mesh: &'l mut Mesh, winding_rule: WindingRule, log: bool) -> Self {
        Sweep {
            mesh,
            dict: Dict::new(),
            regions: Vec::new(),
            queue: EventQueue::default(),
            event: VertexId::NONE,
            winding_rule,
            event_count: 0,
            max_events: 0,
            log,
        }
    }

    /// Computes the planar arrangement specified by the contours of the mesh,
    /// and further subdivides this arrangement into regions. Each region is
    /// marked "inside" if it belongs to the polygon, according to the winding
    /// rule. Each interior region is guaranteed to be monotone.
    ///
    /// Each vertex defines an event for the sweep. Events are processed in
    /// lexicographic order: `e1 < e2` iff `e1.s < e2.s || (e1.s == e2.s && e1.t < e2.t)`.
    pub fn compute_interior(&mut self) -> SweepResult<()> {
        self.remove_degenerate_edges();

        let vertex_count = self.mesh.vertex_count();
        if vertex_count == 0 {
            return Ok(());
        }

        let n = vertex_count as u64 + 8;
        self.max_events = n.saturating_mul(n).saturating_mul(4);

        self.init_event_queue(vertex_count);
        self.init_edge_dict();

        while let Some(v) = self.queue.extract_min() {
            loop {
                let next = match self.queue.minimum() {
                    Some(next) if self.mesh.vert_eq(next, v) => next,
                    _ => break,
                };

                // Merge together all vertices at exactly the same location.
                // This is more efficient than processing them one at a time,
                // simplifies the code (see connect_left_degenerate), and is also
                // important for correct handling of certain degenerate cases.
                // For example, suppose there are two identical edges A and B
                // that belong to different contours (so without this code they would
                // be processed by separate sweep events). Suppose another edge C
                // crosses A and B from above. When A is processed, we split it
                // at its intersection point with C. However this also splits C,
                // so when we insert B we may compute a slightly different
                // intersection point. This might leave two edges with a small
                // gap between them.
                self.queue.extract_min();
                let (a, b) = (self.mesh[v].an_edge, self.mesh[next].an_edge);
                self.mesh.splice(a, b);
            }
            self.sweep_event(v)?;
        }

        self.done_edge_dict();
        self.remove_degenerate_faces();

        Ok(())
    }

    fn init_event_queue(&mut self, vertex_count: usize) {
        self.queue = EventQueue::with_capacity(vertex_count + 8);
        let mut v = self.mesh[VERTEX_HEAD].next;
        while v != VERTEX_HEAD {
            self.queue.insert(v, self.mesh.st(v));
            v = self.mesh[v].next;
        }
    }

    /// We add two sentinel edges above and below all other edges, to avoid
    /// special cases at the top and bottom.
    fn init_edge_dict(&mut self) {
        let mut min = (f64::MAX, f64::MAX);
        let mut max = (f64::MIN, f64::MIN);
        let mut v = self.mesh[VERTEX_HEAD].next;
        while v != VERTEX_HEAD {
            let (s, t) = self.mesh.st(v);
            min = (min.0.min(s), min.1.min(t));
            max = (max.0.max(s), max.1.max(t));
            v = self.mesh[v].next;
        }

        let w = (max.0 - min.0) + 0.01;
        let h = (max.1 - min.1) + 0.01;
        let (smin, smax) = (min.0 - w, max.0 + w);
        let (tmin, tmax) = (min.1 - h, max.1 + h);

        self.add_sentinel(smin, smax, tmin);
        self.add_sentinel(smin, smax, tmax);
    }

    fn add_sentinel(&mut self, smin: f64, smax: f64, t: f64) {
        let e = self.mesh.make_edge();
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh[org].s = smax;
        self.mesh[org].t = t;
        self.mesh[dst].s = smin;
        self.mesh[dst].t = t;
        self.event = dst;

        let reg = RegionId(self.regions.len() as u32);
        self.regions.push(ActiveRegion {
            e_up: e,
            node_up: DICT_HEAD,
            winding_number: 0,
            inside: false,
            sentinel: true,
            dirty: false,
            fix_upper_edge: false,
        });
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict.insert(reg, |a, b| {
                edge_leq(mesh, event, regions[a.index()].e_up, regions[b.index()].e_up)
            })
        };
        self.regions[reg.index()].node_up = node;
    }

    fn done_edge_dict(&mut self) {
        // At the end of all processing, the dictionary should contain only the
        // two sentinel edges, plus at most one "fixable" edge created by
        // connect_right_vertex.
        while let Some(reg) = self.dict.key(self.dict.min()) {
            if !self.reg(reg).sentinel {
                tess_log!(self, "leftover region {:?}", reg);
            }
            self.delete_region(reg);
        }
    }

    /// Removes zero-length edges, and contours with fewer than 3 vertices.
    fn remove_degenerate_edges(&mut self) {
        let mesh = &mut *self.mesh;
        let mut e = mesh[EDGE_HEAD].next;
        while e != EDGE_HEAD {
            let mut e_next = mesh[e].next;
            let mut e_lnext = mesh.lnext(e);

            if mesh.vert_eq(mesh.org(e), mesh.dst(e)) && mesh.lnext(e_lnext) != e {
                // Zero-length edge, contour has at least 3 edges.
                mesh.splice(e_lnext, e); // deletes e.org
                mesh.delete(e); // e is a self-loop
                e = e_lnext;
                e_lnext = mesh.lnext(e);
            }

            if mesh.lnext(e_lnext) == e {
                // Degenerate contour (one or two edges).
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == e_next.sym() {
                        e_next = mesh[e_next].next;
                    }
                    mesh.delete(e_lnext);
                }
                if e == e_next || e == e_next.sym() {
                    e_next = mesh[e_next].next;
                }
                mesh.delete(e);
            }

            e = e_next;
        }
    }

    /// Removes faces with only two edges, which can be created by the sweep.
    fn remove_degenerate_faces(&mut self) {
        let mesh = &mut *self.mesh;
        let mut f = mesh[FACE_HEAD].next;
        while f != FACE_HEAD {
            // Make sure we don't try to tessellate the new triangles.
            let f_next = mesh[f].next;
            let e = mesh[f].an_edge;
            debug_assert!(mesh.lnext(e) != e);

            if mesh.lnext(mesh.lnext(e)) == e {
                // A face with only two edges.
                let onext = mesh.onext(e);
                mesh.add_winding(onext, e);
                mesh.delete(e);
            }

            f = f_next;
        }
    }

    // Region helpers.

    #[inline]
    fn reg(&self, r: RegionId) -> &ActiveRegion {
        &self.regions[r.index()]
    }

    #[inline]
    fn reg_mut(&mut self, r: RegionId) -> &mut ActiveRegion {
        &mut self.regions[r.index()]
    }

    #[inline]
    fn e_up(&self, r: RegionId) -> EdgeId {
        self.regions[r.index()].e_up
    }

    fn region_below(&self, r: RegionId) -> Option<RegionId> {
        self.dict.key(self.dict.pred(self.reg(r).node_up))
    }

    fn region_above(&self, r: RegionId) -> Option<RegionId> {
        self.dict.key(self.dict.succ(self.reg(r).node_up))
    }

    fn below(&self, r: RegionId) -> SweepResult<RegionId> {
        self.region_below(r).ok_or(InternalError::MissingRegion)
    }

    fn above(&self, r: RegionId) -> SweepResult<RegionId> {
        self.region_above(r).ok_or(InternalError::MissingRegion)
    }

    fn mark_dirty_above(&mut self, r: RegionId) {
        if let Some(above) = self.region_above(r) {
            self.reg_mut(above).dirty = true;
        }
    }

    fn add_winding(&mut self, e_dst: EdgeId, e_src: EdgeId) {
        self.mesh.add_winding(e_dst, e_src);
    }

    fn delete_region(&mut self, reg: RegionId) {
        let e_up = self.e_up(reg);
        self.mesh[e_up].active_region = RegionId::NONE;
        let node = self.reg(reg).node_up;
        self.dict.delete(node);
    }

    /// Replaces an upper edge which needs fixing (see connect_right_vertex).
    fn fix_upper_edge(&mut self, reg: RegionId, new_edge: EdgeId) {
        debug_assert!(self.reg(reg).fix_upper_edge);
        let old = self.e_up(reg);
        self.mesh.delete(old);
        let region = self.reg_mut(reg);
        region.fix_upper_edge = false;
        region.e_up = new_edge;
        self.mesh[new_edge].active_region = reg;
    }

    /// Finds the region above the uppermost edge with the same origin.
    fn top_left_region(&mut self, reg: RegionId) -> SweepResult<RegionId> {
        let org = self.mesh.org(self.e_up(reg));

        let mut reg = reg;
        loop {
            reg = self.above(reg)?;
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }

        // If the edge above was a temporary edge introduced by
        // connect_right_vertex, now is the time to fix it.
        if self.reg(reg).fix_upper_edge {
            let below = self.below(reg)?;
            let a = self.e_up(below).sym();
            let b = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(a, b);
            self.fix_upper_edge(reg, e);
            reg = self.above(reg)?;
        }

        Ok(reg)
    }

    /// Finds the region above the uppermost edge with the same destination.
    fn top_right_region(&self, reg: RegionId) -> SweepResult<RegionId> {
        let dst = self.mesh.dst(self.e_up(reg));

        let mut reg = reg;
        loop {
            reg = self.above(reg)?;
            if self.mesh.dst(self.e_up(reg)) != dst {
                return Ok(reg);
            }
        }
    }

    /// Adds a new active region to the sweep line, *somewhere* below `reg_above`
    /// (according to where the new edge belongs in the sweep-line dictionary).
    /// The upper edge of the new region will be `e_new_up`.
    /// Winding number and "inside" flag are not updated.
    fn add_region_below(&mut self, reg_above: RegionId, e_new_up: EdgeId) -> RegionId {
        let reg = RegionId(self.regions.len() as u32);
        self.regions.push(ActiveRegion {
            e_up: e_new_up,
            node_up: DICT_HEAD,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        });

        let node_above = self.reg(reg_above).node_up;
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict.insert_before(node_above, reg, |a, b| {
                edge_leq(mesh, event, regions[a.index()].e_up, regions[b.index()].e_up)
            })
        };
        self.reg_mut(reg).node_up = node;
        self.mesh[e_new_up].active_region = reg;

        reg
    }

    fn compute_winding(&mut self, reg: RegionId) -> SweepResult<()> {
        let above = self.above(reg)?;
        let winding = self.reg(above).winding_number + self.mesh[self.e_up(reg)].winding;
        let inside = self.winding_rule.is_inside(winding);
        let region = self.reg_mut(reg);
        region.winding_number = winding;
        region.inside = inside;

        Ok(())
    }

    /// Deletes a region from the sweep line. This happens when the upper and
    /// lower chains of a region meet (at a vertex on the sweep line).
    ///
    /// The "inside" flag is copied to the appropriate mesh face (we could not do
    /// this before, since the structure of the mesh is always changing, this face
    /// may not have even existed until now).
    fn finish_region(&mut self, reg: RegionId) {
        let e = self.e_up(reg);
        let f = self.mesh.lface(e);
        self.mesh[f].inside = self.reg(reg).inside;
        self.mesh[f].an_edge = e;
        self.delete_region(reg);
    }

    /// We are given a vertex with one or more left-going edges. All affected
    /// edges should be in the edge dictionary. Starting at `reg_first.e_up`, we
    /// walk down deleting all regions where both edges have the same origin. At
    /// the same time we copy the "inside" flag from the active region to the
    /// face, since at this point each face will belong to at most one region.
    ///
    /// The walk stops at the region above `reg_last`. If `reg_last` is `None` we
    /// walk as far as possible. At the same time we relink the mesh if necessary,
    /// so that the ordering of edges around the vertex is the same as in the
    /// dictionary.
    fn finish_left_regions(
        &mut self,
        reg_first: RegionId,
        reg_last: Option<RegionId>,
    ) -> SweepResult<EdgeId> {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);

        while Some(reg_prev) != reg_last {
            // Placement was OK.
            self.reg_mut(reg_prev).fix_upper_edge = false;
            let reg = self.below(reg_prev)?;
            let mut e = self.e_up(reg);

            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.reg(reg).fix_upper_edge {
                    // Remove the last left-going edge. Even though there are no
                    // further edges in the dictionary with this origin, there may be
                    // further such edges in the mesh (if we are adding left edges to a
                    // vertex that has already been processed). Thus it is important to
                    // call finish_region rather than just delete_region.
                    self.finish_region(reg_prev);
                    break;
                }
                // If the edge below was a temporary edge introduced by
                // connect_right_vertex, now is the time to fix it.
                let lprev = self.mesh.lprev(e_prev);
                e = self.mesh.connect(lprev, e.sym());
                self.fix_upper_edge(reg, e);
            }

            // Relink edges so that e_prev.onext == e.
            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }

            // May change reg.e_up.
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }

        Ok(e_prev)
    }

    /// Inserts right-going edges into the edge dictionary, and updates winding
    /// numbers and mesh connectivity appropriately.
    ///
    /// All right-going edges share a common origin. Edges are inserted CCW
    /// starting at `e_first`; the last edge inserted is `e_last.oprev`. If the
    /// origin has any left-going edges already processed, then `e_top_left` must
    /// be the edge such that an imaginary upward vertical segment from the origin
    /// would be contained between `e_top_left.oprev` and `e_top_left`; otherwise
    /// `e_top_left` should be `None`.
    fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: EdgeId,
        e_last: EdgeId,
        e_top_left: Option<EdgeId>,
        clean_up: bool,
    ) -> SweepResult<()> {
        // Insert the new right-going edges in the dictionary.
        let mut e = e_first;
        loop {
            self.add_region_below(reg_up, e.sym());
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        // Walk *all* right-going edges from the origin, in the dictionary order,
        // updating the winding numbers of each region, and re-linking the mesh
        // edges to match the dictionary ordering (if necessary).
        let e_top_left = match e_top_left {
            Some(e) => e,
            None => {
                let below = self.below(reg_up)?;
                self.mesh.rprev(self.e_up(below))
            }
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.below(reg_prev)?;
            let e = self.e_up(reg).sym();
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }

            if self.mesh.onext(e) != e_prev {
                // Unlink e from its current position, and relink below e_prev.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e);
            }

            // Compute the winding number and "inside" flag for the new regions.
            let winding = self.reg(reg_prev).winding_number - self.mesh[e].winding;
            let inside = self.winding_rule.is_inside(winding);
            let region = self.reg_mut(reg);
            region.winding_number = winding;
            region.inside = inside;

            // Check for two outgoing edges with same slope -- process these
            // before any intersection tests.
            self.reg_mut(reg_prev).dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev)? {
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete(e_prev);
            }

            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }

        self.reg_mut(reg_prev).dirty = true;

        if clean_up {
            // Check for intersections between newly adjacent edges.
            self.walk_dirty_regions(reg_prev)?;
        }

        Ok(())
    }

    /// Checks the upper and lower edge of `reg_up`, to make sure that the
    /// `e_up.org` is above `e_lo`, or `e_lo.org` is below `e_up` (depending on
    /// which origin is leftmost).
    ///
    /// The main purpose is to splice right-going edges with the same dest vertex
    /// and nearly identical slopes (ie. we can't distinguish the slopes
    /// numerically). However the splicing can also help us to recover from
    /// numerical errors. For example, suppose at one point we checked `e_up` and
    /// `e_lo`, and decided that `e_up.org` is barely above `e_lo`. Then later, we
    /// split `e_lo` into two edges (eg. from a splice operation like this one).
    /// This can change the result of our test so that now `e_up.org` is incident
    /// to `e_lo`, or barely below it. We must correct this condition to maintain
    /// the dictionary invariants.
    ///
    /// One possibility is to check these edges for intersection again (ie.
    /// `check_for_intersect`). This is what we do if possible. However
    /// `check_for_intersect` requires that the event lies between `e_up` and
    /// `e_lo`, so that it has something to fall back on when the intersection
    /// calculation gives us an unusable answer. So, for those cases where we can't
    /// check for intersection, this routine fixes the problem by just splicing the
    /// offending vertex into the other edge. This is a guaranteed solution, no
    /// matter how degenerate things get. Basically this is a combinatorial
    /// solution to a numerical problem.
    fn check_for_right_splice(&mut self, reg_up: RegionId) -> SweepResult<bool> {
        let reg_lo = self.below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (org_up, org_lo) = (self.mesh.org(e_up), self.mesh.org(e_lo));

        if self.mesh.vert_leq(org_up, org_lo) {
            if self.mesh.edge_sign(self.mesh.dst(e_lo), org_up, org_lo) > 0.0 {
                return Ok(false);
            }

            // e_up.org appears to be below e_lo.
            if !self.mesh.vert_eq(org_up, org_lo) {
                // Splice e_up.org into e_lo.
                self.mesh.split_edge(e_lo.sym());
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.reg_mut(reg_up).dirty = true;
                self.reg_mut(reg_lo).dirty = true;
            } else if org_up != org_lo {
                // Merge the two vertices, discarding e_up.org.
                self.queue.delete(org_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(oprev, e_up);
            }
        } else {
            if self.mesh.edge_sign(self.mesh.dst(e_up), org_lo, org_up) < 0.0 {
                return Ok(false);
            }

            // e_lo.org appears to be above e_up, so splice e_lo.org into e_up.
            self.mark_dirty_above(reg_up);
            self.reg_mut(reg_up).dirty = true;
            self.mesh.split_edge(e_up.sym());
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }

        Ok(true)
    }

    /// Checks the upper and lower edge of `reg_up`, to make sure that the
    /// `e_up.dst` is above `e_lo`, or `e_lo.dst` is below `e_up` (depending on
    /// which destination is rightmost).
    ///
    /// Theoretically, this should always be true. However, splitting an edge into
    /// two pieces can change the results of previous tests. For example, suppose
    /// at one point we checked `e_up` and `e_lo`, and decided that `e_up.dst` is
    /// barely above `e_lo`. Then later, we split `e_lo` into two edges (eg. from a
    /// splice operation like this one). This can change the result of the test so
    /// that now `e_up.dst` is incident to `e_lo`, or barely below it. We must
    /// correct this condition to maintain the dictionary invariants (otherwise
    /// new edges might get inserted in the wrong place in the dictionary, and bad
    /// stuff will happen).
    ///
    /// We fix the problem by just splicing the offending vertex into the other
    /// edge.
    fn check_for_left_splice(&mut self, reg_up: RegionId) -> SweepResult<bool> {
        let reg_lo = self.below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));

        if self.mesh.vert_leq(dst_up, dst_lo) {
            if self.mesh.edge_sign(dst_up, dst_lo, self.mesh.org(e_up)) < 0.0 {
                return Ok(false);
            }

            // e_lo.dst is above e_up, so splice e_lo.dst into e_up.
            self.mark_dirty_above(reg_up);
            self.reg_mut(reg_up).dirty = true;
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(e_lo.sym(), e);
            let f = self.mesh.lface(e);
            self.mesh[f].inside = self.reg(reg_up).inside;
        } else {
            if self.mesh.edge_sign(dst_lo, dst_up, self.mesh.org(e_lo)) > 0.0 {
                return Ok(false);
            }

            // e_up.dst is below e_lo, so splice e_up.dst into e_lo.
            self.reg_mut(reg_up).dirty = true;
            self.reg_mut(reg_lo).dirty = true;
            let e = self.mesh.split_edge(e_lo);
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, e_lo.sym());
            let f = self.mesh.rface(e);
            self.mesh[f].inside = self.reg(reg_up).inside;
        }

        Ok(true)
    }

    /// Computes the coordinates of an intersection vertex as a weighted average
    /// of the endpoints of the two crossing edges.
    fn set_intersection_data(
        &mut self,
        isect: VertexId,
        org_up: VertexId,
        dst_up: VertexId,
        org_lo: VertexId,
        dst_lo: VertexId,
    ) {
        let mut coords = [0.0; 3];
        let p = self.mesh.st(isect);
        for &(org, dst) in &[(org_up, dst_up), (org_lo, dst_lo)] {
            let t1 = vert_l1_dist(self.mesh.st(org), p);
            let t2 = vert_l1_dist(self.mesh.st(dst), p);
            let (w0, w1) = if t1 + t2 > 0.0 {
                (0.5 * t2 / (t1 + t2), 0.5 * t1 / (t1 + t2))
            } else {
                (0.25, 0.25)
            };
            let (a, b) = (self.mesh[org].coords, self.mesh[dst].coords);
            for i in 0..3 {
                coords[i] += w0 * a[i] + w1 * b[i];
            }
        }

        let v = &mut self.mesh[isect];
        v.coords = coords;
        v.idx = UNDEF;
    }

    /// Checks the upper and lower edges of the given region to see if they
    /// intersect. If so, creates the intersection and adds it to the data
    /// structures.
    ///
    /// Returns true if adding the new intersection resulted in a recursive call
    /// to `add_right_edges`; in this case all "dirty" regions have been checked
    /// for intersections, and possibly `reg_up` has been deleted.
    fn check_for_intersect(&mut self, reg_up: RegionId) -> SweepResult<bool> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up)?;
        let mut e_up = self.e_up(reg_up);
        let mut e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.org(e_up);
        let org_lo = self.mesh.org(e_lo);
        let dst_up = self.mesh.dst(e_up);
        let dst_lo = self.mesh.dst(e_lo);
        let event = self.event;

        if org_up == org_lo {
            // Right endpoints are the same.
            return Ok(false);
        }

        let (ou, ol, du, dl) = (
            self.mesh.st(org_up),
            self.mesh.st(org_lo),
            self.mesh.st(dst_up),
            self.mesh.st(dst_lo),
        );

        let t_min_up = ou.1.min(du.1);
        let t_max_lo = ol.1.max(dl.1);
        if t_min_up > t_max_lo {
            // t ranges do not overlap.
            return Ok(false);
        }

        if vert_leq(ou, ol) {
            if edge_sign(dl, ou, ol) > 0.0 {
                return Ok(false);
            }
        } else if edge_sign(du, ol, ou) < 0.0 {
            return Ok(false);
        }

        // At this point the edges intersect, at least marginally.
        tess_log!(self, "intersection between {:?} and {:?}", e_up, e_lo);

        let ev = self.mesh.st(event);
        let mut isect: St = edge_intersect(du, ou, dl, ol);

        if vert_leq(isect, ev) {
            // The intersection point lies slightly to the left of the sweep line,
            // so move it until it's slightly to the right of the sweep line.
            // (If we had perfect numerical precision, this would never happen in
            // the first place). The easiest and safest thing to do is replace the
            // intersection by the event.
            isect = ev;
        }

        // Similarly, if the computed intersection lies to the right of the
        // rightmost origin (which should rarely happen), it can cause unbelievable
        // inefficiency on sufficiently degenerate inputs.
        let org_min = if vert_leq(ou, ol) { ou } else { ol };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if isect == ou || isect == ol {
            // Easy case -- intersection at one of the right endpoints.
            self.check_for_right_splice(reg_up)?;
            return Ok(false);
        }

        if (!self.mesh.vert_eq(dst_up, event) && edge_sign(du, ev, isect) >= 0.0)
            || (!self.mesh.vert_eq(dst_lo, event) && edge_sign(dl, ev, isect) <= 0.0)
        {
            // Very unusual -- the new upper or lower edge would pass on the wrong
            // side of the sweep event, or through it. This can happen due to very
            // small numerical errors in the intersection calculation.
            if dst_lo == event {
                // Splice dst_lo into e_up, and process the new region(s).
                self.mesh.split_edge(e_up.sym());
                self.mesh.splice(e_lo.sym(), e_up);
                reg_up = self.top_left_region(reg_up)?;
                let below = self.below(reg_up)?;
                e_up = self.e_up(below);
                self.finish_left_regions(below, Some(reg_lo))?;
                let oprev = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, oprev, e_up, Some(e_up), true)?;
                return Ok(true);
            }

            if dst_up == event {
                // Splice dst_up into e_lo, and process the new region(s).
                self.mesh.split_edge(e_lo.sym());
                let lnext = self.mesh.lnext(e_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext, oprev);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up)?;
                let below = self.below(reg_up)?;
                let e = self.mesh.rprev(self.e_up(below));
                self.reg_mut(reg_lo).e_up = self.mesh.oprev(e_lo);
                e_lo = self.finish_left_regions(reg_lo, None)?;
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.rprev(e_up);
                self.add_right_edges(reg_up, first, last, Some(e), true)?;
                return Ok(true);
            }

            // Special case: called from connect_right_vertex. If either edge passes
            // on the wrong side of the event, split it (and wait for
            // connect_right_vertex to splice it appropriately).
            if edge_sign(du, ev, isect) >= 0.0 {
                self.mark_dirty_above(reg_up);
                self.reg_mut(reg_up).dirty = true;
                self.mesh.split_edge(e_up.sym());
                let org = self.mesh.org(e_up);
                self.mesh[org].s = ev.0;
                self.mesh[org].t = ev.1;
            }
            if edge_sign(dl, ev, isect) <= 0.0 {
                self.reg_mut(reg_up).dirty = true;
                self.reg_mut(reg_lo).dirty = true;
                self.mesh.split_edge(e_lo.sym());
                let org = self.mesh.org(e_lo);
                self.mesh[org].s = ev.0;
                self.mesh[org].t = ev.1;
            }

            // Leave the rest for connect_right_vertex.
            return Ok(false);
        }

        // General case -- split both edges, splice into new vertex.
        // When we do the splice operation, the order of the arguments is
        // arbitrary as far as correctness goes. However, when the operation
        // creates a new face, the work done is proportional to the size of the
        // new face. We expect the faces in the processed part of the mesh (ie.
        // e_up.lface) to be smaller than the faces in the unprocessed original
        // contours (which will be e_lo.oprev.lface).
        self.mesh.split_edge(e_up.sym());
        self.mesh.split_edge(e_lo.sym());
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up);

        let v = self.mesh.org(e_up);
        self.mesh[v].s = isect.0;
        self.mesh[v].t = isect.1;
        self.queue.insert(v, isect);
        self.set_intersection_data(v, org_up, dst_up, org_lo, dst_lo);

        self.mark_dirty_above(reg_up);
        self.reg_mut(reg_up).dirty = true;
        self.reg_mut(reg_lo).dirty = true;

        Ok(false)
    }

    /// When the upper or lower edge of any region changes, the region is marked
    /// "dirty". This routine walks through all the dirty regions and makes sure
    /// that the dictionary invariants are satisfied (see the module
    /// documentation). Of course new dirty regions can be created as we make
    /// changes to restore the invariants.
    fn walk_dirty_regions(&mut self, reg_up: RegionId) -> SweepResult<()> {
        let mut reg_up = reg_up;
        let mut reg_lo = self.below(reg_up)?;

        loop {
            // Find the lowest dirty region (we walk from the bottom up).
            while self.reg(reg_lo).dirty {
                reg_up = reg_lo;
                reg_lo = self.below(reg_lo)?;
            }
            if !self.reg(reg_up).dirty {
                reg_lo = reg_up;
                match self.region_above(reg_up) {
                    Some(above) if self.reg(above).dirty => {
                        reg_up = above;
                    }
                    _ => {
                        // We've walked all the dirty regions.
                        return Ok(());
                    }
                }
            }

            self.reg_mut(reg_up).dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
                // Check that the edge ordering is obeyed at the dst vertices.
                if self.check_for_left_splice(reg_up)? {
                    // If the upper or lower edge was marked fix_upper_edge, then we no
                    // longer need it (since these edges are needed only for vertices
                    // which otherwise have no right-going edges).
                    if self.reg(reg_lo).fix_upper_edge {
                        self.delete_region(reg_lo);
                        self.mesh.delete(e_lo);
                        reg_lo = self.below(reg_up)?;
                        e_lo = self.e_up(reg_lo);
                    } else if self.reg(reg_up).fix_upper_edge {
                        self.delete_region(reg_up);
                        self.mesh.delete(e_up);
                        reg_up = self.above(reg_lo)?;
                        e_up = self.e_up(reg_up);
                    }
                }
            }

            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let (dst_up, dst_lo) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
                if dst_up != dst_lo
                    && !self.reg(reg_up).fix_upper_edge
                    && !self.reg(reg_lo).fix_upper_edge
                    && (dst_up == self.event || dst_lo == self.event)
                {
                    // When all else fails in check_for_intersect, it uses the event
                    // as the intersection location. To make this possible, it
                    // requires that the event lies between the upper and lower edges,
                    // and also that neither of these is marked fix_upper_edge (since
                    // in the worst case it might splice one of these edges into the
                    // event, and violate the invariant that fixable edges are the only
                    // right-going edge from their associated vertex).
                    if self.check_for_intersect(reg_up)? {
                        // walk_dirty_regions was called recursively; we're done.
                        return Ok(());
                    }
                } else {
                    // Even though we can't use check_for_intersect, the org vertices
                    // may violate the dictionary edge ordering. Check and correct this.
                    self.check_for_right_splice(reg_up)?;
                }
            }

            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo)
            {
                // A degenerate loop consisting of only two edges -- delete it.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete(e_up);
                reg_up = self.above(reg_lo)?;
            }
        }
    }

    /// Purpose: connect a "right" vertex (one where all edges go left) to the
    /// unprocessed portion of the mesh. Since there are no right-going edges, two
    /// regions (one above the event, one below) are being merged into one.
    /// `reg_up` is the upper of these two regions.
    ///
    /// There are two reasons for doing this (adding a right-going edge):
    ///
    /// - if the two regions being merged are "inside", we must add an edge to
    ///   keep them separated (the combined region would not be monotone).
    /// - in any case, we must leave some record of the event in the dictionary, so
    ///   that we can merge the event with features that we have not seen yet. For
    ///   example, maybe there is a vertical edge which passes just to the right of
    ///   the event; we would like to splice the event into this edge. Far too much
    ///   code relies on this to be worth avoiding.
    ///
    /// We add a temporary edge from the event to the closer of `e_up.org` and
    /// `e_lo.org`, and mark it `fix_upper_edge` so that it will be replaced by the
    /// first real right-going edge connected to its origin.
    fn connect_right_vertex(&mut self, reg_up: RegionId, e_bottom_left: EdgeId) -> SweepResult<()> {
        let mut reg_up = reg_up;
        let mut e_bottom_left = e_bottom_left;
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.below(reg_up)?;
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up)?;
        }

        // Possible new degeneracies: upper or lower edge of reg_up may pass through
        // the event, or may coincide with new intersection vertex.
        if self.mesh.vert_eq(self.mesh.org(e_up), self.event) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up)?;
            let below = self.below(reg_up)?;
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, Some(reg_lo))?;
            degenerate = true;
        }
        if self.mesh.vert_eq(self.mesh.org(e_lo), self.event) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, None)?;
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            return self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
        }

        // Non-degenerate situation -- need to add a temporary, fixable edge.
        // Connect to the closer of e_lo.org, e_up.org.
        let e_dst = if self.mesh.vert_leq(self.mesh.org(e_lo), self.mesh.org(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(lprev, e_dst);

        // Prevent cleanup, otherwise e_new might disappear before we've even had a
        // chance to mark it as a temporary edge.
        let onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, onext, Some(onext), false)?;
        let reg = self.mesh[e_new.sym()].active_region;
        if reg.is_none() {
            return Err(InternalError::MissingRegion);
        }
        self.reg_mut(reg).fix_upper_edge = true;

        self.walk_dirty_regions(reg_up)
    }

    /// The event vertex lies exactly on an already-processed edge or vertex.
    /// Adding the new vertex involves splicing it into the already-processed
    /// part of the mesh.
    fn connect_left_degenerate(&mut self, reg_up: RegionId, v_event: VertexId) -> SweepResult<()> {
        let e = self.e_up(reg_up);

        if self.mesh.vert_eq(self.mesh.org(e), v_event) {
            // e.org is an unprocessed vertex - just combine them, and wait for e.org
            // to be pulled from the queue.
            let an_edge = self.mesh[v_event].an_edge;
            self.mesh.splice(e, an_edge);
            return Ok(());
        }

        if !self.mesh.vert_eq(self.mesh.dst(e), v_event) {
            // General case -- splice the event into edge e which passes through it.
            self.mesh.split_edge(e.sym());
            if self.reg(reg_up).fix_upper_edge {
                // This edge was fixable -- delete unused portion of original edge.
                let onext = self.mesh.onext(e);
                self.mesh.delete(onext);
                self.reg_mut(reg_up).fix_upper_edge = false;
            }
            let an_edge = self.mesh[v_event].an_edge;
            self.mesh.splice(an_edge, e);
            // Recurse.
            return self.sweep_event(v_event);
        }

        // The event coincides with e.dst, which has already been processed.
        // Splice in the additional right-going edges.
        let reg_up = self.top_right_region(reg_up)?;
        let reg = self.below(reg_up)?;
        let mut e_top_right = self.e_up(reg).sym();
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = Some(e_last);

        if self.reg(reg).fix_upper_edge {
            // Here e.dst has only a single fixable edge going right. We can delete
            // it since now we have some real right-going edges.
            self.delete_region(reg);
            self.mesh.delete(e_top_right);
            e_top_right = self.mesh.oprev(e_last);
        }

        let an_edge = self.mesh[v_event].an_edge;
        self.mesh.splice(an_edge, e_top_right);
        if !self.mesh.edge_goes_left(e_last) {
            // e.dst had no left-going edges -- indicate this to add_right_edges.
            e_top_left = None;
        }

        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true)
    }

    /// Connects a "left" vertex (one where both edges go right) to the processed
    /// portion of the mesh.
    ///
    /// Let R be the active region containing the event, and let U and L be the
    /// upper and lower edge chains of R. There are two possibilities:
    ///
    /// - the normal case: split R into two regions, by connecting the event to
    ///   the rightmost vertex of U or L lying to the left of the sweep line.
    /// - the degenerate case: if the event is close enough to U or L, we merge
    ///   the event into that edge chain. The subcases are:
    ///   - merging with the rightmost vertex of U or L,
    ///   - merging with the active edge of U or L,
    ///   - merging with an already-processed portion of U or L.
    fn connect_left_vertex(&mut self, v_event: VertexId) -> SweepResult<()> {
        // Get a pointer to the active region containing the event.
        let tmp_e_up = self.mesh[v_event].an_edge.sym();
        let node = {
            let (mesh, regions, event) = (&*self.mesh, &self.regions, self.event);
            self.dict
                .search(|r| !edge_leq(mesh, event, tmp_e_up, regions[r.index()].e_up))
        };

        // These may be missing if the input polygon is degenerate.
        let reg_up = match self.dict.key(node) {
            Some(reg) => reg,
            None => {
                return Ok(());
            }
        };
        let reg_lo = match self.region_below(reg_up) {
            Some(reg) => reg,
            None => {
                return Ok(());
            }
        };

        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);

        // Try merging with U or L first.
        if self.mesh.edge_sign(self.mesh.dst(e_up), v_event, self.mesh.org(e_up)) == 0.0 {
            return self.connect_left_degenerate(reg_up, v_event);
        }

        // Connect the event to the rightmost processed vertex of either chain.
        // e.dst is the vertex that we will connect to the event.
        let reg = if self.mesh.vert_leq(self.mesh.dst(e_lo), self.mesh.dst(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.reg(reg_up).inside || self.reg(reg).fix_upper_edge {
            let e_new = if reg == reg_up {
                let a = self.mesh[v_event].an_edge.sym();
                let b = self.mesh.lnext(e_up);
                self.mesh.connect(a, b)
            } else {
                let a = self.mesh.dnext(e_lo);
                let b = self.mesh[v_event].an_edge;
                self.mesh.connect(a, b).sym()
            };

            if self.reg(reg).fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let new_reg = self.add_region_below(reg_up, e_new);
                self.compute_winding(new_reg)?;
            }

            self.sweep_event(v_event)
        } else {
            // The new vertex is in a region which does not belong to the polygon.
            // We don't need to connect this vertex to the rest of the mesh.
            let an_edge = self.mesh[v_event].an_edge;
            self.add_right_edges(reg_up, an_edge, an_edge, None, true)
        }
    }

    /// Does everything necessary when the sweep line crosses a vertex.
    /// Updates the mesh and the edge dictionary.
    fn sweep_event(&mut self, v_event: VertexId) -> SweepResult<()> {
        self.event = v_event;
        self.event_count += 1;
        if self.event_count > self.max_events {
            return Err(InternalError::SweepDidNotTerminate);
        }

        tess_log!(
            self,
            "event {:?} at ({}, {})",
            v_event,
            self.mesh[v_event].s,
            self.mesh[v_event].t
        );

        // Check if this vertex is the right endpoint of an edge that is already in
        // the dictionary. In this case we don't need to waste time searching for
        // the location to insert new edges.
        let start = self.mesh[v_event].an_edge;
        let mut e = start;
        while self.mesh[e].active_region.is_none() {
            e = self.mesh.onext(e);
            if e == start {
                // All edges go right -- not incident to any processed edges.
                return self.connect_left_vertex(v_event);
            }
        }

        // Processing consists of two phases: first we "finish" all the active
        // regions where both the upper and lower edges terminate at the event (ie.
        // the event is closing off these regions). We mark these faces "inside" or
        // "outside" the polygon according to their winding number, and delete the
        // edges from the dictionary. This takes care of all the left-going edges
        // from the event.
        let active_region = self.mesh[e].active_region;
        let reg_up = self.top_left_region(active_region)?;
        let reg = self.below(reg_up)?;
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, None)?;

        // Next we process all the right-going edges from the event. This involves
        // adding the edges to the dictionary, and creating the associated "active
        // regions" which record information about the regions between adjacent
        // dictionary edges.
        if self.mesh.onext(e_bottom_left) == e_top_left {
            // No right-going edges -- add a temporary "fixable" edge.
            self.connect_right_vertex(reg_up, e_bottom_left)
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true)
        }
    }
}
