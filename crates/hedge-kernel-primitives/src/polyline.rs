//! `Polyline`: an open half-edge chain (C11). Unlike [`crate::polygon::Polygon`]
//! and [`crate::polyhedron::Polyhedron`], a polyline has no closed loop and
//! no `Face` container — it is a single chain whose last half-edge's `next`
//! is `None`.

use hedge_kernel_math::Vec2;
use hedge_kernel_topo::{HalfEdgeId, HalfEdgeMesh, LoopId};
use nalgebra::Point2;

/// An open chain of 2D points.
#[derive(Debug, Clone)]
pub struct Polyline {
    /// The underlying half-edge graph.
    pub mesh: HalfEdgeMesh<Vec2>,
    /// The chain's loop record (its `edge` is the chain head).
    pub chain: LoopId,
}

/// Default proximity threshold for [`Polyline::fuse`], matching the
/// kernel-wide default used by [`crate::polyhedron::Polyhedron`]'s Fuse.
pub const DEFAULT_FUSE_DISTANCE: f64 = 1e-3;

impl Polyline {
    /// Build an open chain from an ordered sequence of points.
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        assert!(points.len() >= 2, "a polyline needs at least two points");
        let mut mesh: HalfEdgeMesh<Vec2> = HalfEdgeMesh::new();
        let verts: Vec<_> = points.iter().map(|p| mesh.add_vertex(p.coords, None)).collect();
        let half_edges: Vec<HalfEdgeId> = verts.iter().map(|&v| mesh.add_half_edge(v, None)).collect();
        let chain = mesh.add_open_chain(&half_edges, None);
        Polyline { mesh, chain }
    }

    /// Head half-edge of the chain.
    pub fn head(&self) -> HalfEdgeId {
        self.mesh.loops.index(self.chain).edge
    }

    /// The chain's half-edges in order, from head to tail.
    pub fn edges(&self) -> Vec<HalfEdgeId> {
        self.mesh.chain_edges(self.head()).collect()
    }

    /// Point positions along the chain, head to tail (one more point than
    /// there are half-edges: the tail half-edge's destination is included).
    pub fn to_points(&self) -> Vec<Vec2> {
        let edges = self.edges();
        let mut points: Vec<Vec2> = edges.iter().map(|&he| self.mesh.verts.index(self.mesh.edges.index(he).vert).position).collect();
        if let Some(&last) = edges.last() {
            if let Some(next) = self.mesh.edges.index(last).next {
                points.push(self.mesh.verts.index(self.mesh.edges.index(next).vert).position);
            }
        }
        points
    }

    /// Merge consecutive chain vertices within `distance` of each other:
    /// splice the later vertex's half-edge out of the chain and delete both
    /// it and its incoming edge. Mirrors
    /// [`crate::polyhedron::Polyhedron`]'s vertex-pair Fuse, but restricted
    /// to consecutive pairs since an open chain has no proximity structure
    /// beyond adjacency.
    pub fn fuse(&mut self, distance: f64) {
        let mut edges = self.edges();
        let mut i = 0;
        while i + 1 < edges.len() {
            let a = self.mesh.edges.index(edges[i]).vert;
            let b = self.mesh.edges.index(edges[i + 1]).vert;
            let pa = self.mesh.verts.index(a).position;
            let pb = self.mesh.verts.index(b).position;
            if (pa - pb).norm() <= distance {
                // Drop edges[i+1]: its origin b is coincident with a, so
                // retarget the following edge (if any) to start at a and
                // drop the now-degenerate edge.
                let dropped = edges[i + 1];
                let after = self.mesh.edges.index(dropped).next;
                match after {
                    Some(next_he) => {
                        self.mesh.edges.index_mut(edges[i]).next = Some(next_he);
                        self.mesh.edges.index_mut(next_he).prev = Some(edges[i]);
                    }
                    None => {
                        self.mesh.edges.index_mut(edges[i]).next = None;
                    }
                }
                self.mesh.edges.remove(dropped);
                self.mesh.verts.remove(b);
                edges.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    /// Split shared vertices so every half-edge origin is a distinct
    /// record: walk the chain, and whenever an origin vertex has already
    /// been claimed by an earlier edge, clone it (new `TopoId` appended
    /// from the source path) and retarget this edge to the clone.
    pub fn unique_points(&mut self) {
        let edges = self.edges();
        let mut claimed = std::collections::HashSet::new();
        for he in edges {
            let origin = self.mesh.edges.index(he).vert;
            if claimed.contains(&origin) {
                let position = self.mesh.verts.index(origin).position;
                let src_topo = self.mesh.verts.index(origin).topo_id.clone();
                let fresh = self.mesh.fresh_vert_id();
                let new_vert = self.mesh.add_vertex(position, Some(src_topo.appended(fresh.path()[0])));
                self.mesh.edges.index_mut(he).vert = new_vert;
                claimed.insert(new_vert);
            } else {
                claimed.insert(origin);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_builds_open_and_walks_in_order() {
        let line = Polyline::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)]);
        assert_eq!(line.edges().len(), 3);
        assert_eq!(line.mesh.edges.index(*line.edges().last().unwrap()).next, None);
    }

    #[test]
    fn to_points_includes_tail_destination() {
        let line = Polyline::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)]);
        let pts = line.to_points();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[2], Vec2::new(2.0, 0.0));
    }

    #[test]
    fn fuse_merges_near_coincident_consecutive_points() {
        let mut line = Polyline::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(1e-6, 0.0),
            Point2::new(1.0, 0.0),
        ]);
        line.fuse(DEFAULT_FUSE_DISTANCE);
        assert_eq!(line.edges().len(), 2);
        assert_eq!(line.mesh.verts.size(), 2);
    }

    #[test]
    fn fuse_leaves_distant_points_untouched() {
        let mut line = Polyline::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)]);
        line.fuse(DEFAULT_FUSE_DISTANCE);
        assert_eq!(line.edges().len(), 3);
    }

    #[test]
    fn unique_points_is_noop_when_origins_already_distinct() {
        let mut line = Polyline::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)]);
        let before = line.mesh.verts.size();
        line.unique_points();
        assert_eq!(line.mesh.verts.size(), before);
    }
}
