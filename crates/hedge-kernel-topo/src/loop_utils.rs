//! Loop-level utilities: flip, clone, vertex/plane extraction, and the
//! point-vs-plane classification used throughout the clip engine.

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, LoopId, VertexId};
use crate::topo_id::TopoId;
use hedge_kernel_math::{is_polygon_clockwise, is_polygon_convex, newell_normal, Plane, Vec2, Vec3, POINT_STATUS_EPSILON};
use nalgebra::{Point2, Point3};

/// A point's classification relative to a plane, with a small epsilon band
/// counted as exactly on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// Strictly on the positive side of the plane's normal.
    Above,
    /// Strictly on the negative side.
    Below,
    /// Within [`POINT_STATUS_EPSILON`] of the plane.
    Inside,
}

/// Classify `point` against `plane` using the fixed epsilon tolerance.
pub fn calc_point_plane_status(plane: &Plane, point: Point3<f64>) -> PointStatus {
    let d = plane.get_distance(point);
    if d.abs() <= POINT_STATUS_EPSILON {
        PointStatus::Inside
    } else if d > 0.0 {
        PointStatus::Above
    } else {
        PointStatus::Below
    }
}

impl<T: Clone> HalfEdgeMesh<T> {
    /// Gather the positions of a loop's vertices in cycle order.
    pub fn loop_to_vertices(&self, loop_id: LoopId) -> Vec<T> {
        self.loop_edges(loop_id)
            .map(|he| self.verts.index(self.edges.index(he).vert).position.clone())
            .collect()
    }

    /// Number of half-edges on a loop (alias kept for spec parity with
    /// `edge_size`; identical to [`HalfEdgeMesh::loop_len`]).
    pub fn edge_size(&self, loop_id: LoopId) -> usize {
        self.loop_len(loop_id)
    }

    /// Reverse a loop's cycle in place: every edge's `next` becomes its old
    /// `prev` and vice versa. The loop's representative edge is left
    /// pointing at the same physical half-edge (now traversed backward).
    pub fn flip(&mut self, loop_id: LoopId) {
        let edges: Vec<HalfEdgeId> = self.loop_edges(loop_id).collect();
        for &he in &edges {
            let old_next = self.edges.index(he).next;
            let old_prev = self.edges.index(he).prev;
            self.edges.index_mut(he).next = old_prev;
            self.edges.index_mut(he).prev = old_next;
        }
    }

    /// Clone a loop's half-edges into a fresh cycle, reusing the same
    /// vertex records as the source (the 4-argument form in the spec).
    /// Returns the head half-edge of the new cycle (not yet bound to a
    /// loop record).
    pub fn clone_loop_shared_verts(&mut self, src_loop: LoopId) -> Vec<HalfEdgeId> {
        let src_edges: Vec<HalfEdgeId> = self.loop_edges(src_loop).collect();
        src_edges
            .iter()
            .map(|&he| {
                let origin = self.edges.index(he).vert;
                self.add_half_edge(origin, None)
            })
            .collect()
    }

    /// Clone a loop's half-edges into a fresh cycle, also cloning each
    /// vertex (the 5-argument form in the spec) so the new loop shares no
    /// vertex records with the source. Returns the new half-edge cycle.
    pub fn clone_loop_fresh_verts(&mut self, src_loop: LoopId) -> Vec<HalfEdgeId> {
        let src_edges: Vec<HalfEdgeId> = self.loop_edges(src_loop).collect();
        src_edges
            .iter()
            .map(|&he| {
                let src_origin = self.edges.index(he).vert;
                let position = self.verts.index(src_origin).position.clone();
                let src_topo = self.verts.index(src_origin).topo_id.clone();
                let new_vert = self.add_vertex(position, Some(src_topo.appended(self.fresh_vert_id_raw())));
                self.add_half_edge(new_vert, None)
            })
            .collect()
    }

    fn fresh_vert_id_raw(&mut self) -> u32 {
        // Local helper: the *value* of the next fresh id, without minting a
        // whole TopoId (we only need a unique integer to append).
        let id = self.fresh_vert_id();
        id.path()[0]
    }
}

impl HalfEdgeMesh<Vec2> {
    /// Whether the 2D loop (given by vertex order) is convex.
    pub fn is_loop_convex(&self, loop_id: LoopId) -> bool {
        let pts = self.loop_to_points2(loop_id);
        is_polygon_convex(&pts)
    }

    /// Whether the 2D loop winds clockwise.
    pub fn is_loop_clockwise(&self, loop_id: LoopId) -> bool {
        let pts = self.loop_to_points2(loop_id);
        is_polygon_clockwise(&pts)
    }

    fn loop_to_points2(&self, loop_id: LoopId) -> Vec<Point2<f64>> {
        self.loop_to_vertices(loop_id)
            .into_iter()
            .map(|v: Vec2| Point2::new(v.x, v.y))
            .collect()
    }
}

impl HalfEdgeMesh<Vec3> {
    /// Signed Newell normal of a 3D loop (not normalized).
    pub fn calc_loop_norm(&self, loop_id: LoopId) -> Vec3 {
        let pts: Vec<Point3<f64>> = self
            .loop_to_vertices(loop_id)
            .into_iter()
            .map(|v: Vec3| Point3::from(v))
            .collect();
        newell_normal(&pts)
    }

    /// Build the plane of a 3D loop: pass through its first vertex, with
    /// normal the (flipped) Newell sum of the cycle, so that a
    /// counter-clockwise loop viewed from outside the solid yields a
    /// plane whose normal points into the solid.
    pub fn loop_to_plane(&self, loop_id: LoopId) -> Plane {
        let verts = self.loop_to_vertices(loop_id);
        let pts: Vec<Point3<f64>> = verts.iter().map(|v: &Vec3| Point3::from(*v)).collect();
        let normal = newell_normal(&pts);
        let first = pts.first().copied().unwrap_or_else(Point3::origin);
        Plane::build(normal, first).flip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn v3(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn flip_then_flip_restores_cycle() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2], None);

        let before: Vec<VertexId> = mesh.loop_edges(loop_id).map(|he| mesh.edges.index(he).vert).collect();
        mesh.flip(loop_id);
        mesh.flip(loop_id);
        let after: Vec<VertexId> = mesh.loop_edges(loop_id).map(|he| mesh.edges.index(he).vert).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn flip_reverses_traversal_order() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2], None);

        mesh.flip(loop_id);
        // Walk from he0 following next; order should now be reversed.
        let mut current = he0;
        let mut verts = Vec::new();
        for _ in 0..3 {
            verts.push(mesh.edges.index(current).vert);
            current = mesh.edges.index(current).next.unwrap();
        }
        assert_eq!(verts, vec![v0, v2, v1]);
    }

    #[test]
    fn convex_and_clockwise_2d_loop() {
        let mut mesh: HalfEdgeMesh<Vec2> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v2(0.0, 0.0), None);
        let v1 = mesh.add_vertex(v2(1.0, 0.0), None);
        let v2v = mesh.add_vertex(v2(1.0, 1.0), None);
        let v3v = mesh.add_vertex(v2(0.0, 1.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2v, None);
        let he3 = mesh.add_half_edge(v3v, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2, he3], None);

        assert!(mesh.is_loop_convex(loop_id));
        assert!(!mesh.is_loop_clockwise(loop_id));
    }

    #[test]
    fn loop_to_plane_of_xy_square_has_upward_or_downward_normal() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(1.0, 1.0, 0.0), None);
        let v3v = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        let he3 = mesh.add_half_edge(v3v, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2, he3], None);

        let plane = mesh.loop_to_plane(loop_id);
        assert!(plane.normal.z.abs() > 0.99);
    }

    #[test]
    fn clone_loop_shared_verts_reuses_vertex_records() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2], None);

        let cloned = mesh.clone_loop_shared_verts(loop_id);
        assert_eq!(cloned.len(), 3);
        let cloned_verts: Vec<VertexId> = cloned.iter().map(|&he| mesh.edges.index(he).vert).collect();
        assert_eq!(cloned_verts, vec![v0, v1, v2]);
    }

    #[test]
    fn clone_loop_fresh_verts_creates_new_vertex_records() {
        let mut mesh: HalfEdgeMesh<Vec3> = HalfEdgeMesh::new();
        let v0 = mesh.add_vertex(v3(0.0, 0.0, 0.0), None);
        let v1 = mesh.add_vertex(v3(1.0, 0.0, 0.0), None);
        let v2 = mesh.add_vertex(v3(0.0, 1.0, 0.0), None);
        let he0 = mesh.add_half_edge(v0, None);
        let he1 = mesh.add_half_edge(v1, None);
        let he2 = mesh.add_half_edge(v2, None);
        let loop_id = mesh.add_loop(&[he0, he1, he2], None);

        let cloned = mesh.clone_loop_fresh_verts(loop_id);
        let cloned_verts: Vec<VertexId> = cloned.iter().map(|&he| mesh.edges.index(he).vert).collect();
        assert_ne!(cloned_verts, vec![v0, v1, v2]);
        for (orig, new) in [v0, v1, v2].iter().zip(cloned_verts.iter()) {
            assert_eq!(mesh.verts.index(*orig).position, mesh.verts.index(*new).position);
        }
    }

    #[test]
    fn point_status_classifies_by_epsilon_band() {
        let plane = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(calc_point_plane_status(&plane, Point3::new(0.0, 0.0, 1.0)), PointStatus::Above);
        assert_eq!(calc_point_plane_status(&plane, Point3::new(0.0, 0.0, -1.0)), PointStatus::Below);
        assert_eq!(calc_point_plane_status(&plane, Point3::new(0.0, 0.0, 1e-6)), PointStatus::Inside);
    }
}
