//! `Polygon`: a 2D half-edge shape with one or more faces, each a border
//! loop plus hole loops.

use std::collections::{HashMap, HashSet};

use hedge_kernel_math::Vec2;
use hedge_kernel_topo::{HalfEdgeId, HalfEdgeMesh, LoopId, TopoId, VertexId};
use nalgebra::Point2;
use slotmap::SlotMap;

use crate::face::{Face, FaceId, IndexedFace};

/// A 2D half-edge polygon: possibly several disjoint faces, each with a
/// border loop and any number of hole loops.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// The underlying half-edge graph.
    pub mesh: HalfEdgeMesh<Vec2>,
    /// Faces, each a border loop plus holes.
    pub faces: SlotMap<FaceId, Face>,
}

impl Polygon {
    /// An empty polygon.
    pub fn new() -> Self {
        Polygon {
            mesh: HalfEdgeMesh::new(),
            faces: SlotMap::with_key(),
        }
    }

    /// A single-face polygon whose border is the given ordered points.
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let positions: Vec<Vec2> = points.iter().map(|p| p.coords).collect();
        let faces = vec![IndexedFace::new((0..positions.len()).collect())];
        Self::from_indexed_faces(&positions, faces)
    }

    /// Build from a shared vertex array and a list of faces (border plus
    /// optional holes, each an ordered index list into `positions`). Edges
    /// sharing an ordered endpoint pair with a reversed-order mate elsewhere
    /// in the input are twinned, per the same rule as
    /// [`crate::polyhedron::Polyhedron::from_indexed_faces`].
    pub fn from_indexed_faces(positions: &[Vec2], faces: Vec<IndexedFace>) -> Self {
        let mut poly = Polygon::new();
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
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
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

    /// Vertex positions of a face's border, in order.
    pub fn face_border_vertices(&self, face_id: FaceId) -> Vec<Vec2> {
        self.mesh.loop_to_vertices(self.faces[face_id].border)
    }

    /// Dump to a shared vertex array and per-face index sequences,
    /// preserving each live border/hole loop's `TopoId`. The inverse of
    /// [`Polygon::from_indexed_faces`].
    pub fn dump(&self) -> (Vec<Vec2>, Vec<IndexedFace>) {
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

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl Default for Polygon {
    fn default() -> Self {
        Self::new()
    }
}
