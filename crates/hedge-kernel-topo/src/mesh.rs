//! The generic half-edge graph: vertices, half-edges, and loops.
//!
//! `HalfEdgeMesh<T>` is shared by the 2D polygon and 3D polyhedron/polyline
//! layers built on top of it; `T` is the vector type of the ambient space
//! (`Vec2` or `Vec3` from `hedge-kernel-math`). The mesh owns every record
//! through a [`CircularList`] per kind and mints [`TopoId`]s from its own
//! per-kind counters rather than a process-global, so that merging two
//! meshes only ever requires offsetting one side's counters.

use crate::circular_list::CircularList;
use crate::topo_id::{IdCounter, TopoId};

slotmap::new_key_type! {
    /// Handle for a vertex.
    pub struct VertexId;
    /// Handle for a half-edge.
    pub struct HalfEdgeId;
    /// Handle for a loop (a closed cycle of half-edges).
    pub struct LoopId;
}

/// A vertex: a position of vector type `T` plus a representative outgoing
/// half-edge.
#[derive(Debug, Clone)]
pub struct Vertex<T> {
    /// Stable topological identity.
    pub topo_id: TopoId,
    /// Position in the ambient space.
    pub position: T,
    /// One outgoing half-edge, used as the starting point for star
    /// traversals. `None` only for a vertex not yet wired into any edge.
    pub half_edge: Option<HalfEdgeId>,
}

/// A half-edge: one oriented side of an edge, bounding a loop.
#[derive(Debug, Clone)]
pub struct HalfEdge<T> {
    /// Stable topological identity.
    pub topo_id: TopoId,
    /// Origin vertex.
    pub vert: VertexId,
    /// The loop this half-edge borders, if wired in.
    pub loop_id: Option<LoopId>,
    /// The reverse-orientation half-edge on the neighboring loop, if the
    /// mesh is closed along this edge.
    pub twin: Option<HalfEdgeId>,
    /// Previous half-edge around the loop.
    pub prev: Option<HalfEdgeId>,
    /// Next half-edge around the loop.
    pub next: Option<HalfEdgeId>,
    _marker: std::marker::PhantomData<T>,
}

/// A loop: a closed cycle of half-edges bounding one side of a face.
#[derive(Debug, Clone)]
pub struct Loop<T> {
    /// Stable topological identity.
    pub topo_id: TopoId,
    /// Any half-edge on this loop; the cycle is recovered by following
    /// `next`.
    pub edge: HalfEdgeId,
    _marker: std::marker::PhantomData<T>,
}

/// Owning storage and per-kind id counters for a half-edge graph over
/// vector type `T`.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<T> {
    /// Live vertices.
    pub verts: CircularList<VertexId, Vertex<T>>,
    /// Live half-edges.
    pub edges: CircularList<HalfEdgeId, HalfEdge<T>>,
    /// Live loops.
    pub loops: CircularList<LoopId, Loop<T>>,
    next_vert_id: IdCounter,
    next_edge_id: IdCounter,
    next_loop_id: IdCounter,
}

impl<T: Clone> HalfEdgeMesh<T> {
    /// An empty graph.
    pub fn new() -> Self {
        HalfEdgeMesh {
            verts: CircularList::new(),
            edges: CircularList::new(),
            loops: CircularList::new(),
            next_vert_id: IdCounter::new(),
            next_edge_id: IdCounter::new(),
            next_loop_id: IdCounter::new(),
        }
    }

    /// Mint a fresh vertex id from this mesh's counter.
    pub fn fresh_vert_id(&mut self) -> TopoId {
        self.next_vert_id.fresh()
    }

    /// Mint a fresh half-edge id from this mesh's counter.
    pub fn fresh_edge_id(&mut self) -> TopoId {
        self.next_edge_id.fresh()
    }

    /// Mint a fresh loop id from this mesh's counter.
    pub fn fresh_loop_id(&mut self) -> TopoId {
        self.next_loop_id.fresh()
    }

    /// The next id each per-kind counter would mint, without consuming it.
    /// Used by callers (e.g. `copy`) to pick an offset guaranteed to be
    /// past every id this mesh has handed out.
    pub fn counters_peek(&self) -> (u32, u32, u32) {
        (
            self.next_vert_id.peek(),
            self.next_edge_id.peek(),
            self.next_loop_id.peek(),
        )
    }

    /// Bump every counter past the path entries of an adopted, possibly
    /// foreign id.
    pub fn observe_vert_id(&mut self, id: &TopoId) {
        self.next_vert_id.observe(id);
    }

    /// See [`Self::observe_vert_id`].
    pub fn observe_edge_id(&mut self, id: &TopoId) {
        self.next_edge_id.observe(id);
    }

    /// See [`Self::observe_vert_id`].
    pub fn observe_loop_id(&mut self, id: &TopoId) {
        self.next_loop_id.observe(id);
    }

    /// Offset every live record's `TopoId` path entries by `k`, and shift
    /// the id counters to match. Used when merging two meshes: offset the
    /// incoming mesh's ids past the host's current maxima before splicing
    /// (invariant I5 — UIDs unique among live records of the same kind).
    pub fn offset_all_ids(&mut self, k: u32) {
        let vert_keys: Vec<_> = self.verts.keys().collect();
        for key in vert_keys {
            self.verts.index_mut(key).topo_id.offset(k);
        }
        let edge_keys: Vec<_> = self.edges.keys().collect();
        for key in edge_keys {
            self.edges.index_mut(key).topo_id.offset(k);
        }
        let loop_keys: Vec<_> = self.loops.keys().collect();
        for key in loop_keys {
            self.loops.index_mut(key).topo_id.offset(k);
        }
    }

    /// Insert a vertex at `position`, adopting `topo_id` if valid or else
    /// minting a fresh one.
    pub fn add_vertex(&mut self, position: T, topo_id: Option<TopoId>) -> VertexId {
        let id = match topo_id {
            Some(id) => {
                self.observe_vert_id(&id);
                id
            }
            None => self.fresh_vert_id(),
        };
        self.verts.append(Vertex {
            topo_id: id,
            position,
            half_edge: None,
        })
    }

    /// Insert a half-edge with origin `origin`, adopting `topo_id` if
    /// valid or else minting a fresh one. Sets the origin's representative
    /// half-edge if it has none yet.
    pub fn add_half_edge(&mut self, origin: VertexId, topo_id: Option<TopoId>) -> HalfEdgeId {
        let id = match topo_id {
            Some(id) => {
                self.observe_edge_id(&id);
                id
            }
            None => self.fresh_edge_id(),
        };
        let he = self.edges.append(HalfEdge {
            topo_id: id,
            vert: origin,
            loop_id: None,
            twin: None,
            prev: None,
            next: None,
            _marker: std::marker::PhantomData,
        });
        if self.verts.index(origin).half_edge.is_none() {
            self.verts.index_mut(origin).half_edge = Some(he);
        }
        he
    }

    /// `connect(a, b)`: set `a.next = b`, `b.prev = a`. Returns `b`.
    pub fn connect(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> HalfEdgeId {
        self.edges.index_mut(a).next = Some(b);
        self.edges.index_mut(b).prev = Some(a);
        b
    }

    /// Pair `e0` and `e1` as twins. It is a logic error to pair an edge
    /// that already has a *different* twin.
    pub fn make_pair(&mut self, e0: HalfEdgeId, e1: HalfEdgeId) {
        debug_assert!(
            self.edges.index(e0).twin.is_none() || self.edges.index(e0).twin == Some(e1),
            "make_pair: e0 already twinned with a different edge"
        );
        debug_assert!(
            self.edges.index(e1).twin.is_none() || self.edges.index(e1).twin == Some(e0),
            "make_pair: e1 already twinned with a different edge"
        );
        self.edges.index_mut(e0).twin = Some(e1);
        self.edges.index_mut(e1).twin = Some(e0);
    }

    /// Sever `e`'s twin pairing, on both sides, if any.
    pub fn del_pair(&mut self, e: HalfEdgeId) {
        if let Some(twin) = self.edges.index(e).twin {
            self.edges.index_mut(e).twin = None;
            self.edges.index_mut(twin).twin = None;
        }
    }

    /// Build a loop from an ordered slice of half-edges: connects them
    /// into a cycle via `next`/`prev`, mints a loop id (or adopts
    /// `topo_id`), and binds every member's `loop_id`.
    pub fn add_loop(&mut self, half_edges: &[HalfEdgeId], topo_id: Option<TopoId>) -> LoopId {
        assert!(!half_edges.is_empty(), "a loop needs at least one half-edge");
        let n = half_edges.len();
        for i in 0..n {
            self.connect(half_edges[i], half_edges[(i + 1) % n]);
        }
        let id = match topo_id {
            Some(id) => {
                self.observe_loop_id(&id);
                id
            }
            None => self.fresh_loop_id(),
        };
        let loop_key = self.loops.append(Loop {
            topo_id: id,
            edge: half_edges[0],
            _marker: std::marker::PhantomData,
        });
        self.bind_edge_loop(loop_key, half_edges[0]);
        loop_key
    }

    /// Build an open chain from an ordered slice of half-edges: a `Loop`
    /// whose last member's `next` is left `None` rather than wrapping back
    /// to the first (the Polyline model). Connects `half_edges[i].next =
    /// half_edges[i + 1]` for consecutive pairs, mints a loop id (or adopts
    /// `topo_id`), and binds every member's `loop_id` directly (no
    /// wraparound walk, since the chain never closes).
    pub fn add_open_chain(&mut self, half_edges: &[HalfEdgeId], topo_id: Option<TopoId>) -> LoopId {
        assert!(!half_edges.is_empty(), "a chain needs at least one half-edge");
        for pair in half_edges.windows(2) {
            self.connect(pair[0], pair[1]);
        }
        let id = match topo_id {
            Some(id) => {
                self.observe_loop_id(&id);
                id
            }
            None => self.fresh_loop_id(),
        };
        let loop_key = self.loops.append(Loop {
            topo_id: id,
            edge: half_edges[0],
            _marker: std::marker::PhantomData,
        });
        for &he in half_edges {
            self.edges.index_mut(he).loop_id = Some(loop_key);
        }
        loop_key
    }

    /// Iterate the half-edges of an open chain rooted at `start`, following
    /// `next` until it is `None` (as opposed to [`Self::loop_edges`], which
    /// assumes a closed cycle).
    pub fn chain_edges(&self, start: HalfEdgeId) -> ChainEdgeIter<'_, T> {
        ChainEdgeIter {
            mesh: self,
            current: Some(start),
        }
    }

    /// Set `loop.edge = e` and walk `e`'s `next`-cycle, setting every
    /// member's `loop_id` to `loop_id`.
    pub fn bind_edge_loop(&mut self, loop_id: LoopId, e: HalfEdgeId) {
        self.loops.index_mut(loop_id).edge = e;
        let mut current = e;
        loop {
            self.edges.index_mut(current).loop_id = Some(loop_id);
            let next = self.edges.index(current).next.expect("loop must be closed");
            if next == e {
                break;
            }
            current = next;
        }
    }

    /// Destination vertex of a half-edge: the origin of its `next`.
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        let next = self.edges.index(he).next.expect("half-edge has no next");
        self.edges.index(next).vert
    }

    /// Iterate the half-edges of `loop_id` in cycle order.
    pub fn loop_edges(&self, loop_id: LoopId) -> LoopEdgeIter<'_, T> {
        let start = self.loops.index(loop_id).edge;
        LoopEdgeIter {
            mesh: self,
            start,
            current: Some(start),
            started: false,
        }
    }

    /// Number of half-edges on `loop_id`.
    pub fn loop_len(&self, loop_id: LoopId) -> usize {
        self.loop_edges(loop_id).count()
    }

    /// Iterate the half-edges emanating from `vertex_id` (star traversal
    /// via `twin -> next`); stops early (yielding a partial star) if the
    /// mesh is open along some edge of the fan.
    pub fn vertex_edges(&self, vertex_id: VertexId) -> VertexEdgeIter<'_, T> {
        let start = self.verts.index(vertex_id).half_edge;
        VertexEdgeIter {
            mesh: self,
            start,
            current: start,
            started: false,
        }
    }
}

impl<T: Clone> Default for HalfEdgeMesh<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the half-edges of a loop in cycle order.
pub struct LoopEdgeIter<'a, T> {
    mesh: &'a HalfEdgeMesh<T>,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
    started: bool,
}

impl<'a, T: Clone> Iterator for LoopEdgeIter<'a, T> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        if self.started && current == self.start {
            return None;
        }
        self.started = true;
        self.current = self.mesh.edges.get(current).and_then(|e| e.next);
        Some(current)
    }
}

/// Iterator over the half-edges leaving a vertex.
pub struct VertexEdgeIter<'a, T> {
    mesh: &'a HalfEdgeMesh<T>,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    started: bool,
}

impl<'a, T: Clone> Iterator for VertexEdgeIter<'a, T> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let start = self.start?;
        let current = self.current?;
        if self.started && current == start {
            return None;
        }
        self.started = true;
        self.current = self
            .mesh
            .edges
            .get(current)
            .and_then(|e| e.twin)
            .and_then(|twin| self.mesh.edges.get(twin))
            .and_then(|twin_edge| twin_edge.next);
        Some(current)
    }
}

/// Iterator over the half-edges of an open chain, following `next` until
/// it runs out.
pub struct ChainEdgeIter<'a, T> {
    mesh: &'a HalfEdgeMesh<T>,
    current: Option<HalfEdgeId>,
}

impl<'a, T: Clone> Iterator for ChainEdgeIter<'a, T> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        self.current = self.mesh.edges.get(current).and_then(|e| e.next);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedge_kernel_math::Vec3;

    fn v3(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn build_triangle_loop_and_walk_it() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);

        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);

        let loop_id = mesh.add_loop(&[he0, he1, he2], None);

        assert_eq!(mesh.loop_len(loop_id), 3);
        let verts: Vec<VertexId> = mesh.loop_edges(loop_id).map(|he| mesh.edges.index(he).vert).collect();
        assert_eq!(verts, vec![v0, v1, v2]);

        for he in mesh.loop_edges(loop_id) {
            assert_eq!(mesh.edges.index(he).loop_id, Some(loop_id));
        }
    }

    #[test]
    fn make_pair_and_del_pair() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let a = mesh.add_half_edge(v0, None);
        let b = mesh.add_half_edge(v1, None);

        mesh.make_pair(a, b);
        assert_eq!(mesh.edges.index(a).twin, Some(b));
        assert_eq!(mesh.edges.index(b).twin, Some(a));

        mesh.del_pair(a);
        assert_eq!(mesh.edges.index(a).twin, None);
        assert_eq!(mesh.edges.index(b).twin, None);
    }

    #[test]
    fn fresh_ids_are_unique_and_adopted_ids_bump_counter() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), Some(TopoId::new(41)));
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        assert_eq!(mesh.verts.index(v0).topo_id.path(), &[41]);
        assert_eq!(mesh.verts.index(v1).topo_id.path(), &[42]);
    }

    #[test]
    fn dest_returns_origin_of_next() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        mesh.add_loop(&[he0, he1, he2], None);
        assert_eq!(mesh.dest(he0), v1);
        assert_eq!(mesh.dest(he1), v2);
        assert_eq!(mesh.dest(he2), v0);
    }

    #[test]
    fn open_chain_leaves_last_next_none() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(2.0, 0.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        mesh.add_open_chain(&[he0, he1, he2], None);

        assert_eq!(mesh.edges.index(he2).next, None);
        assert_eq!(mesh.edges.index(he0).prev, None);
        let chain: Vec<HalfEdgeId> = mesh.chain_edges(he0).collect();
        assert_eq!(chain, vec![he0, he1, he2]);
    }

    #[test]
    fn vertex_star_traversal_across_two_faces() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let center = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let a = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let b = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let c = mesh.add_vertex(v3(-1.0, 0.0, 0.0), None);

        // Face 1: center -> a -> b
        let he_c_a = mesh.add_half_edge(center, None);
        let he_a_b = mesh.add_half_edge(a, None);
        let he_b_c = mesh.add_half_edge(b, None);
        mesh.add_loop(&[he_c_a, he_a_b, he_b_c], None);

        // Face 2: center -> b -> c (shares the center->b edge as a twin of b->center... )
        let he_c_b = mesh.add_half_edge(center, None);
        let he_b_c2 = mesh.add_half_edge(b, None);
        let he_c2_c = mesh.add_half_edge(c, None);
        mesh.add_loop(&[he_c_b, he_b_c2, he_c2_c], None);

        mesh.make_pair(he_b_c, he_c_b);

        let star: Vec<HalfEdgeId> = mesh.vertex_edges(center).collect();
        assert_eq!(star.len(), 2);
        assert!(star.contains(&he_c_a));
        assert!(star.contains(&he_c_b));
    }
}
