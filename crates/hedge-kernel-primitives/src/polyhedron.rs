//! `Polyhedron`: a 3D half-edge solid with faces that may carry holes.

use std::collections::HashMap;

use hedge_kernel_math::{Aabb, Plane, Vec3};
use hedge_kernel_topo::loop_utils::PointStatus;
use hedge_kernel_topo::{HalfEdgeId, HalfEdgeMesh, LoopId, TopoId, VertexId};
use nalgebra::Point3;
use slotmap::SlotMap;

use crate::face::{Face, FaceId, IndexedFace};

/// A 3D half-edge polyhedron: vertices/half-edges/loops from the generic
/// graph, plus an indexable [`Face`] container and a cached bounding box.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    /// The underlying half-edge graph.
    pub mesh: HalfEdgeMesh<Vec3>,
    /// Faces, each a border loop plus holes.
    pub faces: SlotMap<FaceId, Face>,
    /// Cached axis-aligned bounding box; kept current by [`Polyhedron::update_aabb`].
    pub aabb: Aabb,
}

/// Four-valued classification of a face relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacePlaneStatus {
    /// Every vertex of the face is above (or inside-epsilon of) the plane.
    Above,
    /// Every vertex of the face is below (or inside-epsilon of) the plane.
    Below,
    /// Every vertex is within epsilon of the plane.
    Inside,
    /// The face has vertices strictly on both sides.
    Cross,
}

impl Polyhedron {
    /// An empty polyhedron.
    pub fn new() -> Self {
        Polyhedron {
            mesh: HalfEdgeMesh::new(),
            faces: SlotMap::with_key(),
            aabb: Aabb::make_empty(),
        }
    }

    /// Build a box from its min/max corners. Six faces, twelve edges, all
    /// twinned, normals outward per the right-hand rule.
    pub fn from_aabb(min: Point3<f64>, max: Point3<f64>) -> Self {
        let positions = vec![
            Vec3::new(min.x, min.y, min.z), // 0
            Vec3::new(max.x, min.y, min.z), // 1
            Vec3::new(max.x, min.y, max.z), // 2
            Vec3::new(min.x, min.y, max.z), // 3
            Vec3::new(min.x, max.y, min.z), // 4
            Vec3::new(max.x, max.y, min.z), // 5
            Vec3::new(max.x, max.y, max.z), // 6
            Vec3::new(min.x, max.y, max.z), // 7
        ];
        let faces = vec![
            IndexedFace::new(vec![0, 1, 2, 3]), // bottom, -y
            IndexedFace::new(vec![4, 7, 6, 5]), // top, +y
            IndexedFace::new(vec![0, 4, 5, 1]), // front, -z
            IndexedFace::new(vec![3, 2, 6, 7]), // back, +z
            IndexedFace::new(vec![1, 5, 6, 2]), // right, +x
            IndexedFace::new(vec![0, 3, 7, 4]), // left, -x
        ];
        Self::from_indexed_faces(&positions, faces)
    }

    /// Build from a shared vertex array and a list of faces (border plus
    /// optional holes, each an ordered index list into `positions`).
    ///
    /// Twin pairing: every half-edge is registered by its ordered
    /// `(origin_index, dest_index)` key; a half-edge whose key's reverse
    /// `(dest_index, origin_index)` was also seen is paired with that
    /// mate. Half-edges with no mate remain twinless — the boundary is
    /// open there.
    pub fn from_indexed_faces(positions: &[Vec3], faces: Vec<IndexedFace>) -> Self {
        let mut poly = Polyhedron::new();
        let mut verts: Vec<VertexId> = Vec::with_capacity(positions.len());
        for &p in positions {
            verts.push(poly.mesh.add_vertex(p, None));
        }

        let mut edge_by_key: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

        for input_face in faces {
            let border_loop = poly.build_indexed_loop(&input_face.border, &verts, &mut edge_by_key, input_face.topo_id);
            let mut hole_loops = Vec::with_capacity(input_face.holes.len());
            for hole in &input_face.holes {
                hole_loops.push(poly.build_indexed_loop(hole, &verts, &mut edge_by_key, None));
            }
            poly.faces.insert(Face::with_holes(border_loop, hole_loops));
        }

        poly.pair_twins(&edge_by_key);
        poly.update_aabb();
        poly
    }

    fn build_indexed_loop(
        &mut self,
        indices: &[usize],
        verts: &[VertexId],
        edge_by_key: &mut HashMap<(usize, usize), HalfEdgeId>,
        topo_id: Option<TopoId>,
    ) -> LoopId {
        let n = indices.len();
        assert!(n >= 3, "a loop needs at least three vertices");
        let half_edges: Vec<HalfEdgeId> = indices
            .iter()
            .map(|&idx| self.mesh.add_half_edge(verts[idx], None))
            .collect();
        for i in 0..n {
            let key = (indices[i], indices[(i + 1) % n]);
            edge_by_key.insert(key, half_edges[i]);
        }
        self.mesh.add_loop(&half_edges, topo_id)
    }

    fn pair_twins(&mut self, edge_by_key: &HashMap<(usize, usize), HalfEdgeId>) {
        let mut seen: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
        for (&(i, j), &he) in edge_by_key {
            if seen.contains(&(i, j)) || seen.contains(&(j, i)) {
                continue;
            }
            if let Some(&mate) = edge_by_key.get(&(j, i)) {
                self.mesh.make_pair(he, mate);
                seen.insert((i, j));
                seen.insert((j, i));
            }
        }
    }

    /// Whether every half-edge has a twin (invariant I6): the polyhedron
    /// is watertight.
    pub fn is_closed(&self) -> bool {
        self.mesh.edges.iter().all(|(_, e)| e.twin.is_some())
    }

    /// Recompute the cached bounding box from live vertices.
    pub fn update_aabb(&mut self) {
        let mut aabb = Aabb::make_empty();
        for (_, v) in self.mesh.verts.iter() {
            aabb.combine(Point3::from(v.position));
        }
        self.aabb = aabb;
    }

    /// Vertex positions of a face's border, in order.
    pub fn face_border_vertices(&self, face_id: FaceId) -> Vec<Vec3> {
        let border = self.faces[face_id].border;
        self.mesh.loop_to_vertices(border)
    }

    /// The face's supporting plane, derived from its border loop (a hole-
    /// only, degenerate "face" has no canonical plane and panics; callers
    /// are expected to only call this on faces with a valid border).
    pub fn calc_face_norm(&self, face_id: FaceId) -> Plane {
        self.mesh.loop_to_plane(self.faces[face_id].border)
    }

    /// Classify a face against `plane` by combining the per-vertex status
    /// of every vertex on its border and holes.
    pub fn calc_face_plane_status(&self, face_id: FaceId, plane: &Plane) -> FacePlaneStatus {
        let face = &self.faces[face_id];
        let mut loops = vec![face.border];
        loops.extend(face.holes.iter().copied());

        let mut any_above = false;
        let mut any_below = false;
        for loop_id in loops {
            for v in self.mesh.loop_to_vertices(loop_id) {
                match hedge_kernel_topo::calc_point_plane_status(plane, Point3::from(v)) {
                    PointStatus::Above => any_above = true,
                    PointStatus::Below => any_below = true,
                    PointStatus::Inside => {}
                }
            }
        }
        match (any_above, any_below) {
            (true, true) => FacePlaneStatus::Cross,
            (true, false) => FacePlaneStatus::Above,
            (false, true) => FacePlaneStatus::Below,
            (false, false) => FacePlaneStatus::Inside,
        }
    }

    /// Dump this polyhedron to a shared vertex array and a list of
    /// per-face index sequences (border plus holes), preserving each
    /// live record's `TopoId`. The inverse of [`Polyhedron::from_indexed_faces`].
    pub fn dump(&self) -> (Vec<Vec3>, Vec<IndexedFace>) {
        let mut index_of: HashMap<VertexId, usize> = HashMap::new();
        let mut positions = Vec::new();
        for (id, v) in self.mesh.verts.iter() {
            index_of.insert(id, positions.len());
            positions.push(v.position);
        }

        let loop_indices = |loop_id: LoopId| -> Vec<usize> {
            self.mesh
                .loop_edges(loop_id)
                .map(|he| index_of[&self.mesh.edges.index(he).vert])
                .collect()
        };

        let mut faces = Vec::with_capacity(self.faces.len());
        for (_, face) in &self.faces {
            faces.push(IndexedFace {
                topo_id: Some(self.mesh.loops.index(face.border).topo_id.clone()),
                border: loop_indices(face.border),
                holes: face.holes.iter().map(|&h| loop_indices(h)).collect(),
            });
        }
        (positions, faces)
    }

    /// Deep copy: dump and rebuild, then offset every `TopoId` in the copy
    /// past this mesh's current counters so the copy's ids are disjoint
    /// from the original's (the two can be merged later without an I5
    /// collision).
    pub fn copy(&self) -> Polyhedron {
        let (positions, faces) = self.dump();
        let mut clone = Polyhedron::from_indexed_faces(&positions, faces);
        let (v, e, l) = self.mesh.counters_peek();
        let offset = v.max(e).max(l);
        clone.mesh.offset_all_ids(offset);
        clone
    }
}

impl Default for Polyhedron {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Polyhedron {
        Polyhedron::from_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn cube_has_24_half_edges_all_twinned() {
        let cube = unit_cube();
        assert_eq!(cube.mesh.edges.size(), 24);
        assert_eq!(cube.mesh.loops.size(), 6);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.is_closed());
    }

    #[test]
    fn cube_aabb_matches_corners() {
        let cube = unit_cube();
        assert_eq!(cube.aabb.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(cube.aabb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn cube_face_normals_point_outward() {
        let cube = unit_cube();
        for (_, face) in &cube.faces {
            let plane = cube.mesh.loop_to_plane(face.border);
            let centroid: Vec3 = cube
                .mesh
                .loop_to_vertices(face.border)
                .iter()
                .fold(Vec3::zeros(), |acc, v| acc + v)
                / 4.0;
            // The plane normal should point away from the cube's center.
            assert!(plane.normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn dump_then_rebuild_round_trips_face_count_and_closedness() {
        let cube = unit_cube();
        let (positions, faces) = cube.dump();
        let rebuilt = Polyhedron::from_indexed_faces(&positions, faces);
        assert_eq!(rebuilt.faces.len(), cube.faces.len());
        assert!(rebuilt.is_closed());
    }

    #[test]
    fn copy_produces_disjoint_ids() {
        let cube = unit_cube();
        let copy = cube.copy();
        let orig_ids: std::collections::HashSet<u64> =
            cube.mesh.verts.iter().map(|(_, v)| v.topo_id.uid()).collect();
        let copy_ids: std::collections::HashSet<u64> =
            copy.mesh.verts.iter().map(|(_, v)| v.topo_id.uid()).collect();
        assert!(orig_ids.is_disjoint(&copy_ids));
        assert!(copy.is_closed());
    }

    #[test]
    fn copy_then_copy_is_structurally_equal_to_first_copy() {
        let cube = unit_cube();
        let copy1 = cube.copy();
        let (p1, f1) = copy1.dump();
        let copy2 = copy1.copy();
        let (p2, _f2) = copy2.dump();
        assert_eq!(p1.len(), p2.len());
        assert_eq!(f1.len(), copy2.faces.len());
    }

    #[test]
    fn non_closed_mesh_reports_not_closed() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![IndexedFace::new(vec![0, 1, 2])];
        let single_tri = Polyhedron::from_indexed_faces(&positions, faces);
        assert!(!single_tri.is_closed());
    }
}
