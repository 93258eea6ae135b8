//! Half-edge mesh used by the fill tessellator.
//!
//! Vertices, faces and half-edges live in arenas and refer to each other by index.
//! Half-edges are allocated in pairs: the two halves of an edge are stored at
//! indices `2k` and `2k + 1`, so the symmetric half-edge of `e` is `e ^ 1`.
//!
//! Each arena starts with a dummy head element. Live vertices and faces form
//! circular doubly-linked lists through their head; live edges form a circular
//! list through the even half of each pair, the previous link of an edge being
//! stored in the `next` field of its odd half.
//!
//! Elements are never reused once removed. A mesh only lives for the duration of one
//! tessellation.

use crate::math_utils::{edge_goes_left, edge_goes_right, edge_sign, vert_ccw, vert_leq};
use core::ops::{Index, IndexMut};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub(crate) struct $name(pub u32);

        impl $name {
            pub const NONE: Self = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_none(self) -> bool {
                self == Self::NONE
            }

            #[inline]
            pub fn is_some(self) -> bool {
                self != Self::NONE
            }
        }
    };
}

id_type!(VertexId);
id_type!(FaceId);
id_type!(EdgeId);
id_type!(RegionId);

impl EdgeId {
    /// The other half of this edge.
    #[inline]
    pub fn sym(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    // The even half of the pair, which is the one threaded in the edge list.
    #[inline]
    fn canonical(self) -> EdgeId {
        EdgeId(self.0 & !1)
    }
}

pub(crate) const VERTEX_HEAD: VertexId = VertexId(0);
pub(crate) const FACE_HEAD: FaceId = FaceId(0);
pub(crate) const EDGE_HEAD: EdgeId = EdgeId(0);

/// Sentinel for "no index", used in the output buffers.
pub const UNDEF: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    pub next: VertexId,
    pub prev: VertexId,
    /// A half-edge with this vertex as origin.
    pub an_edge: EdgeId,

    pub coords: [f64; 3],
    /// Projection on the sweep plane.
    pub s: f64,
    pub t: f64,

    /// Output index.
    pub n: u32,
    /// Insertion order of the input vertex, `UNDEF` for synthesized vertices.
    pub idx: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct Face {
    pub next: FaceId,
    pub prev: FaceId,
    /// A half-edge with this face on its left.
    pub an_edge: EdgeId,

    /// Output index.
    pub n: u32,
    pub inside: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge {
    /// Edge list link (see the module documentation).
    pub next: EdgeId,
    /// Next edge counter-clockwise around the origin.
    pub onext: EdgeId,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeId,
    pub org: VertexId,
    pub lface: FaceId,

    /// The sweep region whose upper edge is this half-edge.
    pub active_region: RegionId,
    /// Change in winding number when crossing from the right face to the left face.
    pub winding: i32,
}

impl HalfEdge {
    fn new() -> Self {
        HalfEdge {
            next: EdgeId::NONE,
            onext: EdgeId::NONE,
            lnext: EdgeId::NONE,
            org: VertexId::NONE,
            lface: FaceId::NONE,
            active_region: RegionId::NONE,
            winding: 0,
        }
    }
}

pub(crate) struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub edges: Vec<HalfEdge>,
}

impl Index<VertexId> for Mesh {
    type Output = Vertex;
    #[inline]
    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }
}

impl IndexMut<VertexId> for Mesh {
    #[inline]
    fn index_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }
}

impl Index<FaceId> for Mesh {
    type Output = Face;
    #[inline]
    fn index(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }
}

impl IndexMut<FaceId> for Mesh {
    #[inline]
    fn index_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }
}

impl Index<EdgeId> for Mesh {
    type Output = HalfEdge;
    #[inline]
    fn index(&self, id: EdgeId) -> &HalfEdge {
        &self.edges[id.index()]
    }
}

impl IndexMut<EdgeId> for Mesh {
    #[inline]
    fn index_mut(&mut self, id: EdgeId) -> &mut HalfEdge {
        &mut self.edges[id.index()]
    }
}

impl Mesh {
    pub fn new() -> Self {
        let vertex_head = Vertex {
            next: VERTEX_HEAD,
            prev: VERTEX_HEAD,
            an_edge: EdgeId::NONE,
            coords: [0.0; 3],
            s: 0.0,
            t: 0.0,
            n: UNDEF,
            idx: UNDEF,
        };
        let face_head = Face {
            next: FACE_HEAD,
            prev: FACE_HEAD,
            an_edge: EdgeId::NONE,
            n: UNDEF,
            inside: false,
        };
        let mut e = HalfEdge::new();
        let mut e_sym = HalfEdge::new();
        e.next = EDGE_HEAD;
        e_sym.next = EDGE_HEAD.sym();

        Mesh {
            vertices: vec![vertex_head],
            faces: vec![face_head],
            edges: vec![e, e_sym],
        }
    }

    // Derived topological relations.

    #[inline]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self[e].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self[e].lnext
    }

    #[inline]
    pub fn org(&self, e: EdgeId) -> VertexId {
        self[e].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeId) -> VertexId {
        self[e.sym()].org
    }

    #[inline]
    pub fn lface(&self, e: EdgeId) -> FaceId {
        self[e].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeId) -> FaceId {
        self[e.sym()].lface
    }

    #[inline]
    pub fn oprev(&self, e: EdgeId) -> EdgeId {
        self[e.sym()].lnext
    }

    #[inline]
    pub fn lprev(&self, e: EdgeId) -> EdgeId {
        self[e].onext.sym()
    }

    #[inline]
    pub fn rprev(&self, e: EdgeId) -> EdgeId {
        self[e.sym()].onext
    }

    #[inline]
    pub fn dnext(&self, e: EdgeId) -> EdgeId {
        self.rprev(e).sym()
    }

    #[inline]
    pub fn st(&self, v: VertexId) -> (f64, f64) {
        let v = &self[v];
        (v.s, v.t)
    }

    #[inline]
    pub fn vert_eq(&self, u: VertexId, v: VertexId) -> bool {
        let (us, ut) = self.st(u);
        let (vs, vt) = self.st(v);
        us == vs && ut == vt
    }

    #[inline]
    pub fn vert_leq(&self, u: VertexId, v: VertexId) -> bool {
        vert_leq(self.st(u), self.st(v))
    }

    #[inline]
    pub fn edge_sign(&self, u: VertexId, v: VertexId, w: VertexId) -> f64 {
        edge_sign(self.st(u), self.st(v), self.st(w))
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeId) -> bool {
        edge_goes_left(self.st(self.org(e)), self.st(self.dst(e)))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeId) -> bool {
        edge_goes_right(self.st(self.org(e)), self.st(self.dst(e)))
    }

    // Primitive operations.

    /// Creates a new pair of half-edges which form their own loop. No vertex or
    /// face structure is allocated. The pair is inserted in the edge list before
    /// `e_next`.
    fn alloc_edge(&mut self, e_next: EdgeId) -> EdgeId {
        let e = EdgeId(self.edges.len() as u32);
        let e_sym = e.sym();
        self.edges.push(HalfEdge::new());
        self.edges.push(HalfEdge::new());

        let e_next = e_next.canonical();

        // Insert in circular doubly-linked list before e_next.
        // Note that the prev pointer is stored in sym.next.
        let e_prev = self[e_next.sym()].next;
        self[e_sym].next = e_prev;
        self[e_prev.sym()].next = e;
        self[e].next = e_next;
        self[e_next.sym()].next = e_sym;

        self[e].onext = e;
        self[e].lnext = e_sym;
        self[e_sym].onext = e_sym;
        self[e_sym].lnext = e;

        e
    }

    /// The basic operation for changing the mesh connectivity and topology.
    ///
    /// It changes the mesh so that `a.onext <- old(b.onext)` and
    /// `b.onext <- old(a.onext)`, with the left faces updated to match.
    fn splice_edges(&mut self, a: EdgeId, b: EdgeId) {
        let a_onext = self[a].onext;
        let b_onext = self[b].onext;

        self[a_onext.sym()].lnext = b;
        self[b_onext.sym()].lnext = a;
        self[a].onext = b_onext;
        self[b].onext = a_onext;
    }

    /// Attaches a new vertex to every edge of the origin ring of `e_orig`,
    /// inserting it in the vertex list before `v_next`.
    fn alloc_vertex(&mut self, e_orig: EdgeId, v_next: VertexId) -> VertexId {
        let v_new = VertexId(self.vertices.len() as u32);
        let v_prev = self[v_next].prev;
        self.vertices.push(Vertex {
            next: v_next,
            prev: v_prev,
            an_edge: e_orig,
            coords: [0.0; 3],
            s: 0.0,
            t: 0.0,
            n: UNDEF,
            idx: UNDEF,
        });
        self[v_prev].next = v_new;
        self[v_next].prev = v_new;

        let mut e = e_orig;
        loop {
            self[e].org = v_new;
            e = self[e].onext;
            if e == e_orig {
                break;
            }
        }

        v_new
    }

    /// Attaches a new face to every edge of the left loop of `e_orig`,
    /// inserting it in the face list before `f_next`.
    fn alloc_face(&mut self, e_orig: EdgeId, f_next: FaceId) -> FaceId {
        let f_new = FaceId(self.faces.len() as u32);
        let f_prev = self[f_next].prev;
        // The new face is interior iff the old one was.
        let inside = self[f_next].inside;
        self.faces.push(Face {
            next: f_next,
            prev: f_prev,
            an_edge: e_orig,
            n: UNDEF,
            inside,
        });
        self[f_prev].next = f_new;
        self[f_next].prev = f_new;

        let mut e = e_orig;
        loop {
            self[e].lface = f_new;
            e = self[e].lnext;
            if e == e_orig {
                break;
            }
        }

        f_new
    }

    /// Removes an edge pair from the edge list.
    fn unlink_edge(&mut self, e_del: EdgeId) {
        let e_del = e_del.canonical();
        let e_next = self[e_del].next;
        let e_prev = self[e_del.sym()].next;
        self[e_next.sym()].next = e_prev;
        self[e_prev.sym()].next = e_next;

        self[e_del].org = VertexId::NONE;
        self[e_del.sym()].org = VertexId::NONE;
    }

    /// Removes a vertex from the vertex list, giving its edges `new_org`.
    fn unlink_vertex(&mut self, v_del: VertexId, new_org: VertexId) {
        let e_start = self[v_del].an_edge;
        let mut e = e_start;
        loop {
            self[e].org = new_org;
            e = self[e].onext;
            if e == e_start {
                break;
            }
        }

        let v_prev = self[v_del].prev;
        let v_next = self[v_del].next;
        self[v_next].prev = v_prev;
        self[v_prev].next = v_next;
    }

    /// Removes a face from the face list, giving its edges `new_lface`.
    fn unlink_face(&mut self, f_del: FaceId, new_lface: FaceId) {
        let e_start = self[f_del].an_edge;
        let mut e = e_start;
        loop {
            self[e].lface = new_lface;
            e = self[e].lnext;
            if e == e_start {
                break;
            }
        }

        let f_prev = self[f_del].prev;
        let f_next = self[f_del].next;
        self[f_next].prev = f_prev;
        self[f_prev].next = f_next;
    }

    // Mesh editing operations.

    /// Creates one edge, two vertices, and a loop (face).
    /// The loop consists of the two new half-edges.
    pub fn make_edge(&mut self) -> EdgeId {
        let e = self.alloc_edge(EDGE_HEAD);
        self.alloc_vertex(e, VERTEX_HEAD);
        self.alloc_vertex(e.sym(), VERTEX_HEAD);
        self.alloc_face(e, FACE_HEAD);
        e
    }

    /// Splices the origin rings and left loops of two edges, merging or splitting
    /// vertices and faces as needed.
    ///
    /// If `e_org.org != e_dst.org` the two vertices are merged (`e_dst.org` is
    /// destroyed), otherwise the vertex is split in two. Similarly for the left
    /// faces.
    pub fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) {
        if e_org == e_dst {
            return;
        }

        let mut joining_vertices = false;
        let mut joining_loops = false;

        if self.org(e_dst) != self.org(e_org) {
            // We are merging two disjoint vertices -- destroy e_dst.org.
            joining_vertices = true;
            let (v_del, new_org) = (self.org(e_dst), self.org(e_org));
            self.unlink_vertex(v_del, new_org);
        }
        if self.lface(e_dst) != self.lface(e_org) {
            // We are connecting two disjoint loops -- destroy e_dst.lface.
            joining_loops = true;
            let (f_del, new_lface) = (self.lface(e_dst), self.lface(e_org));
            self.unlink_face(f_del, new_lface);
        }

        self.splice_edges(e_dst, e_org);

        if !joining_vertices {
            // We split one vertex into two -- the new vertex is e_dst.org.
            // Make sure the old vertex points to a valid half-edge.
            let org = self.org(e_org);
            self.alloc_vertex(e_dst, org);
            self[org].an_edge = e_org;
        }
        if !joining_loops {
            // We split one loop into two -- the new loop is e_dst.lface.
            // Make sure the old face points to a valid half-edge.
            let lface = self.lface(e_org);
            self.alloc_face(e_dst, lface);
            self[lface].an_edge = e_org;
        }
    }

    /// Removes the edge `e_del`, joining or splitting faces and removing the
    /// endpoints if they become isolated.
    pub fn delete(&mut self, e_del: EdgeId) {
        let e_del_sym = e_del.sym();
        let mut joining_loops = false;

        // First step: disconnect the origin vertex e_del.org. We make all
        // changes to get a consistent mesh in this "intermediate" state.
        if self.lface(e_del) != self.rface(e_del) {
            // We are joining two loops into one -- remove the left face.
            joining_loops = true;
            let (f_del, new_lface) = (self.lface(e_del), self.rface(e_del));
            self.unlink_face(f_del, new_lface);
        }

        if self.onext(e_del) == e_del {
            let org = self.org(e_del);
            self.unlink_vertex(org, VertexId::NONE);
        } else {
            // Make sure that e_del.org and e_del.rface point to valid half-edges.
            let rface = self.rface(e_del);
            let oprev = self.oprev(e_del);
            self[rface].an_edge = oprev;
            let org = self.org(e_del);
            let onext = self.onext(e_del);
            self[org].an_edge = onext;

            self.splice_edges(e_del, oprev);
            if !joining_loops {
                // We are splitting one loop into two -- create a new loop for e_del.
                let lface = self.lface(e_del);
                self.alloc_face(e_del, lface);
            }
        }

        // Claim: the mesh is now in a consistent state, except that e_del.org
        // may have been deleted. Now we disconnect e_del.dst.
        if self.onext(e_del_sym) == e_del_sym {
            let org = self.org(e_del_sym);
            self.unlink_vertex(org, VertexId::NONE);
            let lface = self.lface(e_del_sym);
            self.unlink_face(lface, FaceId::NONE);
        } else {
            // Make sure that e_del.dst and e_del.lface point to valid half-edges.
            let lface = self.lface(e_del);
            let sym_oprev = self.oprev(e_del_sym);
            self[lface].an_edge = sym_oprev;
            let org = self.org(e_del_sym);
            let onext = self.onext(e_del_sym);
            self[org].an_edge = onext;
            self.splice_edges(e_del_sym, sym_oprev);
        }

        // Any isolated vertices or faces have already been freed.
        self.unlink_edge(e_del);
    }

    /// Creates a new edge `e_new` such that `e_new == e_org.lnext`, and
    /// `e_new.dst` is a newly created vertex. `e_org` and `e_new` share the
    /// same left face.
    pub fn add_edge_vertex(&mut self, e_org: EdgeId) -> EdgeId {
        let e_new = self.alloc_edge(e_org);
        let e_new_sym = e_new.sym();

        // Connect the new edge appropriately.
        let lnext = self.lnext(e_org);
        self.splice_edges(e_new, lnext);

        // Set the vertex and face information.
        let dst = self.dst(e_org);
        self[e_new].org = dst;
        self.alloc_vertex(e_new_sym, dst);
        let lface = self.lface(e_org);
        self[e_new].lface = lface;
        self[e_new_sym].lface = lface;

        e_new
    }

    /// Splits `e_org` into two edges `e_org` and `e_new`, such that
    /// `e_new == e_org.lnext`. The new vertex is `e_org.dst == e_new.org`.
    /// `e_org` and `e_new` have the same left face.
    pub fn split_edge(&mut self, e_org: EdgeId) -> EdgeId {
        let temp = self.add_edge_vertex(e_org);
        let e_new = temp.sym();

        // Disconnect e_org from e_org.dst and connect it to e_new.org.
        let e_org_sym = e_org.sym();
        let oprev = self.oprev(e_org_sym);
        self.splice_edges(e_org_sym, oprev);
        self.splice_edges(e_org_sym, e_new);

        // Set the vertex and face information.
        let new_org = self.org(e_new);
        self[e_org_sym].org = new_org;
        let new_dst = self.dst(e_new);
        self[new_dst].an_edge = e_new.sym(); // may have pointed to e_org.sym
        let rface = self.rface(e_org);
        self[e_new.sym()].lface = rface;
        // Copy the old winding information.
        self[e_new].winding = self[e_org].winding;
        self[e_new.sym()].winding = self[e_org_sym].winding;

        e_new
    }

    /// Creates a new edge from `e_org.dst` to `e_dst.org`, and returns the
    /// corresponding half-edge `e_new`.
    ///
    /// If `e_org.lface == e_dst.lface`, this splits one loop into two, and the
    /// newly created loop is `e_new.lface`. Otherwise, two disjoint loops are
    /// merged into one, and the loop `e_dst.lface` is destroyed.
    pub fn connect(&mut self, e_org: EdgeId, e_dst: EdgeId) -> EdgeId {
        let mut joining_loops = false;
        let e_new = self.alloc_edge(e_org);
        let e_new_sym = e_new.sym();

        if self.lface(e_dst) != self.lface(e_org) {
            // We are connecting two disjoint loops -- destroy e_dst.lface.
            joining_loops = true;
            let (f_del, new_lface) = (self.lface(e_dst), self.lface(e_org));
            self.unlink_face(f_del, new_lface);
        }

        // Connect the new edge appropriately.
        let lnext = self.lnext(e_org);
        self.splice_edges(e_new, lnext);
        self.splice_edges(e_new_sym, e_dst);

        // Set the vertex and face information.
        let org = self.dst(e_org);
        self[e_new].org = org;
        let dst = self.org(e_dst);
        self[e_new_sym].org = dst;
        let lface = self.lface(e_org);
        self[e_new].lface = lface;
        self[e_new_sym].lface = lface;

        // Make sure the old face points to a valid half-edge.
        self[lface].an_edge = e_new_sym;

        if !joining_loops {
            // We split one loop into two -- the new loop is e_new.lface.
            self.alloc_face(e_new, lface);
        }

        e_new
    }

    /// Adds the windings of `e_src` to `e_dst`.
    pub fn add_winding(&mut self, e_dst: EdgeId, e_src: EdgeId) {
        let (w, w_sym) = (self[e_src].winding, self[e_src.sym()].winding);
        self[e_dst].winding += w;
        self[e_dst.sym()].winding += w_sym;
    }

    /// Iterates over the live faces.
    pub fn face_ids(&self) -> Vec<FaceId> {
        let mut faces = Vec::new();
        let mut f = self[FACE_HEAD].next;
        while f != FACE_HEAD {
            faces.push(f);
            f = self[f].next;
        }
        faces
    }

    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        let mut v = self[VERTEX_HEAD].next;
        while v != VERTEX_HEAD {
            count += 1;
            v = self[v].next;
        }
        count
    }

    pub fn face_vertex_count(&self, f: FaceId) -> usize {
        let e_start = self[f].an_edge;
        let mut e = e_start;
        let mut count = 0;
        loop {
            count += 1;
            e = self.lnext(e);
            if e == e_start {
                break;
            }
        }
        count
    }

    /// Tessellates a monotone region (what else would it do??). The region must
    /// consist of a single loop of half-edges oriented CCW. "Monotone" in this
    /// case means that any vertical line intersects the interior of the region
    /// in a single interval.
    ///
    /// Tessellation consists of adding interior edges (actually pairs of
    /// half-edges), to split the region into non-overlapping triangles.
    ///
    /// The basic idea is to walk the upper and lower chains from right to left
    /// (from the rightmost vertex), adding a diagonal whenever it stays inside
    /// the polygon. The `edge_goes_left` tests guarantee progress even when some
    /// triangles are CW, given that the upper and lower chains are truly
    /// monotone.
    pub fn tessellate_mono_region(&mut self, face: FaceId) {
        // All edges are oriented CCW around the boundary of the region.
        // First, find the half-edge whose origin vertex is rightmost.
        // Since the sweep goes from left to right, face.an_edge should
        // be close to the edge we want.
        let mut up = self[face].an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        while self.vert_leq(self.dst(up), self.org(up)) {
            up = self.lprev(up);
        }
        while self.vert_leq(self.org(up), self.dst(up)) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if self.vert_leq(self.dst(up), self.org(lo)) {
                // up.dst is on the left. It is safe to form triangles from lo.org.
                while self.lnext(lo) != up
                    && (self.edge_goes_left(self.lnext(lo))
                        || self.edge_sign(self.org(lo), self.dst(lo), self.dst(self.lnext(lo)))
                            <= 0.0)
                {
                    let lo_next = self.lnext(lo);
                    let temp = self.connect(lo_next, lo);
                    lo = temp.sym();
                }
                lo = self.lprev(lo);
            } else {
                // lo.org is on the left. We can make CCW triangles from up.dst.
                while self.lnext(lo) != up
                    && (self.edge_goes_right(self.lprev(up))
                        || self.edge_sign(self.dst(up), self.org(up), self.org(self.lprev(up)))
                            >= 0.0)
                {
                    let up_prev = self.lprev(up);
                    let temp = self.connect(up, up_prev);
                    up = temp.sym();
                }
                up = self.lnext(up);
            }
        }

        // Now lo.org == up.dst == the leftmost vertex. The remaining region
        // can be tessellated in a fan from this leftmost vertex.
        debug_assert!(self.lnext(lo) != up);
        while self.lnext(self.lnext(lo)) != up {
            let lo_next = self.lnext(lo);
            let temp = self.connect(lo_next, lo);
            lo = temp.sym();
        }
    }

    /// Tessellates each region of the mesh which is marked "inside".
    pub fn tessellate_interior(&mut self) {
        let mut f = self[FACE_HEAD].next;
        while f != FACE_HEAD {
            // Make sure we don't try to tessellate the new triangles.
            let next = self[f].next;
            if self[f].inside {
                self.tessellate_mono_region(f);
            }
            f = next;
        }
    }

    /// Resets the winding numbers on all edges so that regions marked "inside"
    /// have winding number `value`, and regions outside have a winding number
    /// of zero.
    ///
    /// If `keep_only_boundary` is true, it also deletes all edges which do not
    /// separate an interior region from an exterior one.
    pub fn set_winding_number(&mut self, value: i32, keep_only_boundary: bool) {
        let mut e = self[EDGE_HEAD].next;
        while e != EDGE_HEAD {
            let e_next = self[e].next;
            let l_inside = self[self.lface(e)].inside;
            let r_inside = self[self.rface(e)].inside;
            if r_inside != l_inside {
                // This is a boundary edge (one side is interior, one is exterior).
                self[e].winding = if l_inside { value } else { -value };
            } else if !keep_only_boundary {
                // Both regions are interior, or both are exterior.
                self[e].winding = 0;
            } else {
                self.delete(e);
            }
            e = e_next;
        }
    }

    /// Merges adjacent inside faces when the result is convex and has at most
    /// `max_verts_per_face` vertices.
    pub fn merge_convex_faces(&mut self, max_verts_per_face: usize) {
        let mut f = self[FACE_HEAD].next;
        while f != FACE_HEAD {
            // Skip faces which are outside the result.
            if !self[f].inside {
                f = self[f].next;
                continue;
            }

            let mut e_cur = self[f].an_edge;
            let v_start = self.org(e_cur);

            loop {
                let mut e_next = self.lnext(e_cur);
                let e_sym = e_cur.sym();
                let mut merged = false;

                // Try to merge if the neighbour face is valid.
                let sym_face = self.lface(e_sym);
                if sym_face.is_some() && self[sym_face].inside && sym_face != f {
                    // Try to merge the neighbour faces if the resulting polygons would be convex.
                    let cur_nv = self.face_vertex_count(f);
                    let sym_nv = self.face_vertex_count(sym_face);
                    if cur_nv + sym_nv - 2 <= max_verts_per_face {
                        // Merge if the resulting poly is convex.
                        let a = self.st(self.org(self.lprev(e_cur)));
                        let b = self.st(self.org(e_cur));
                        let c = self.st(self.org(self.lnext(self.lnext(e_sym))));
                        let d = self.st(self.org(self.lprev(e_sym)));
                        let e = self.st(self.org(e_sym));
                        let g = self.st(self.org(self.lnext(self.lnext(e_cur))));
                        if vert_ccw(a, b, c) && vert_ccw(d, e, g) {
                            e_next = self.lnext(e_sym);
                            self.delete(e_sym);
                            merged = true;
                        }
                    }
                }

                if !merged && self.org(self.lnext(e_cur)) == v_start {
                    break;
                }

                // Continue to next edge.
                e_cur = e_next;
            }

            f = self[f].next;
        }
    }

    /// Checks the structural invariants of the mesh.
    ///
    /// Returns false if a link is inconsistent. Used by tests and debug builds.
    pub fn check(&self) -> bool {
        let mut f_prev = FACE_HEAD;
        loop {
            let f = self[f_prev].next;
            if f == FACE_HEAD {
                break;
            }
            if self[f].prev != f_prev {
                return false;
            }
            let e_start = self[f].an_edge;
            let mut e = e_start;
            loop {
                if !self.edge_links_ok(e) || self.lface(e) != f {
                    return false;
                }
                e = self.lnext(e);
                if e == e_start {
                    break;
                }
            }
            f_prev = f;
        }

        let mut v_prev = VERTEX_HEAD;
        loop {
            let v = self[v_prev].next;
            if v == VERTEX_HEAD {
                break;
            }
            if self[v].prev != v_prev {
                return false;
            }
            let e_start = self[v].an_edge;
            let mut e = e_start;
            loop {
                if !self.edge_links_ok(e) || self.org(e) != v {
                    return false;
                }
                e = self.onext(e);
                if e == e_start {
                    break;
                }
            }
            v_prev = v;
        }

        let mut e_prev = EDGE_HEAD;
        loop {
            let e = self[e_prev].next;
            if e == EDGE_HEAD {
                break;
            }
            if self[e.sym()].next != e_prev.sym() {
                return false;
            }
            if self.org(e).is_none() || self.dst(e).is_none() || !self.edge_links_ok(e) {
                return false;
            }
            e_prev = e;
        }

        true
    }

    fn edge_links_ok(&self, e: EdgeId) -> bool {
        self.onext(self.lnext(e)).sym() == e && self.lnext(self.onext(e).sym()) == e
    }
}

#[cfg(test)]
fn loop_len(mesh: &Mesh, e_start: EdgeId) -> usize {
    let mut e = e_start;
    let mut n = 0;
    loop {
        n += 1;
        e = mesh.lnext(e);
        if e == e_start {
            return n;
        }
    }
}

#[test]
fn make_edge_and_split() {
    let mut mesh = Mesh::new();
    let e = mesh.make_edge();
    assert!(mesh.check());
    assert_eq!(mesh.vertex_count(), 2);
    assert_eq!(mesh.face_ids().len(), 1);
    assert_eq!(mesh.lnext(e), e.sym());

    // Self loop: one vertex, one edge, two faces.
    mesh.splice(e, e.sym());
    assert!(mesh.check());
    assert_eq!(mesh.vertex_count(), 1);
    assert_eq!(mesh.face_ids().len(), 2);

    // Grow it into a triangle.
    let e2 = mesh.split_edge(e);
    assert!(mesh.check());
    assert_eq!(mesh.lnext(e), e2);
    mesh.split_edge(e2);
    assert!(mesh.check());
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(loop_len(&mesh, e), 3);
    assert_eq!(loop_len(&mesh, e.sym()), 3);
}

#[test]
fn connect_and_delete() {
    let mut mesh = Mesh::new();
    let e = mesh.make_edge();
    mesh.splice(e, e.sym());
    let mut last = e;
    for _ in 0..3 {
        last = mesh.split_edge(last);
    }
    // A quad.
    assert_eq!(loop_len(&mesh, e), 4);
    assert_eq!(mesh.face_ids().len(), 2);

    // A diagonal splits the quad's left face in two triangles.
    let diagonal = mesh.connect(mesh.lnext(e), e);
    assert!(mesh.check());
    assert_eq!(mesh.face_ids().len(), 3);
    assert_eq!(loop_len(&mesh, diagonal), 3);
    assert_eq!(loop_len(&mesh, diagonal.sym()), 3);

    mesh.delete(diagonal);
    assert!(mesh.check());
    assert_eq!(mesh.face_ids().len(), 2);
    assert_eq!(loop_len(&mesh, e), 4);
}
