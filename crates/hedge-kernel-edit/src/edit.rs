//! Fill, Fuse, and UniquePoints: the editing operations shared by
//! [`Polyhedron`]. These never fail — each is a best-effort structural
//! rewrite, not a validated operation with its own error type.

use std::collections::{HashMap, HashSet};

use hedge_kernel_primitives::{IndexedFace, Polyhedron, DEFAULT_FUSE_DISTANCE};
use hedge_kernel_topo::{HalfEdgeId, LoopId, VertexId};

/// Allocate a boundary half-edge for every twinless half-edge, recovering
/// each missing-face cycle by hopping from an edge's origin to the
/// twinless edge that lands on it, and bind a fresh (uncapped) loop per
/// distinct cycle. Returns the loops created — callers decide whether to
/// cap them as faces.
pub fn fill(poly: &mut Polyhedron) -> Vec<LoopId> {
    let twinless: Vec<HalfEdgeId> = poly
        .mesh
        .edges
        .keys()
        .filter(|&he| poly.mesh.edges.index(he).twin.is_none())
        .collect();
    if twinless.is_empty() {
        return Vec::new();
    }

    let mut boundary_of: HashMap<HalfEdgeId, HalfEdgeId> = HashMap::new();
    for &e in &twinless {
        let dest = poly.mesh.dest(e);
        let b = poly.mesh.add_half_edge(dest, None);
        poly.mesh.make_pair(e, b);
        boundary_of.insert(e, b);
    }

    // For the boundary cycle to close, the loop after `e`'s boundary twin
    // must originate where `e` itself originates — i.e. at the (assumed
    // unique) twinless edge landing on `e`'s origin.
    let mut incoming_twinless: HashMap<VertexId, HalfEdgeId> = HashMap::new();
    for &e in &twinless {
        incoming_twinless.insert(poly.mesh.dest(e), e);
    }

    let mut new_loops = Vec::new();
    let mut assigned: HashSet<HalfEdgeId> = HashSet::new();
    for &start in &twinless {
        let start_b = boundary_of[&start];
        if assigned.contains(&start_b) {
            continue;
        }
        let mut cycle = Vec::new();
        let mut e = start;
        loop {
            let b = boundary_of[&e];
            cycle.push(b);
            assigned.insert(b);
            let origin = poly.mesh.edges.index(e).vert;
            let next_e = incoming_twinless[&origin];
            if next_e == start {
                break;
            }
            e = next_e;
        }
        new_loops.push(poly.mesh.add_loop(&cycle, None));
    }
    new_loops
}

/// Merge every pair of vertices within `distance`: rewrite every half-edge
/// referencing the later vertex to reference the earlier one, then drop the
/// later vertex. Quadratic in vertex count.
pub fn fuse(poly: &mut Polyhedron, distance: f64) {
    let verts: Vec<VertexId> = poly.mesh.verts.keys().collect();
    let mut dead: HashSet<VertexId> = HashSet::new();

    for i in 0..verts.len() {
        let vi = verts[i];
        if dead.contains(&vi) {
            continue;
        }
        for &vj in &verts[i + 1..] {
            if dead.contains(&vj) {
                continue;
            }
            let pi = poly.mesh.verts.index(vi).position;
            let pj = poly.mesh.verts.index(vj).position;
            if (pi - pj).norm() <= distance {
                retarget_vertex(poly, vj, vi);
                dead.insert(vj);
            }
        }
    }

    for v in dead {
        poly.mesh.verts.remove(v);
    }
}

fn retarget_vertex(poly: &mut Polyhedron, from: VertexId, to: VertexId) {
    let edges: Vec<HalfEdgeId> = poly.mesh.edges.keys().collect();
    for he in edges {
        if poly.mesh.edges.index(he).vert == from {
            poly.mesh.edges.index_mut(he).vert = to;
        }
    }
}

/// Concatenate several polyhedra into one (fresh ids throughout) and fuse
/// the result at `distance`.
pub fn fuse_many(polys: &[Polyhedron], distance: f64) -> Polyhedron {
    let mut positions = Vec::new();
    let mut faces = Vec::new();
    for poly in polys {
        let (pos, poly_faces) = poly.dump();
        let offset = positions.len();
        positions.extend(pos);
        for f in poly_faces {
            faces.push(IndexedFace {
                topo_id: None,
                border: f.border.iter().map(|&i| i + offset).collect(),
                holes: f.holes.iter().map(|h| h.iter().map(|&i| i + offset).collect()).collect(),
            });
        }
    }
    let mut merged = Polyhedron::from_indexed_faces(&positions, faces);
    fuse(&mut merged, distance);
    merged
}

/// Split shared vertices so every half-edge owns a distinct origin record:
/// walk the mesh's half-edges in storage order, and whenever an origin has
/// already been claimed by an earlier edge, clone it (a fresh `TopoId`
/// appended from the source's path) and retarget this edge to the clone.
/// Reverses the sharing `fuse` performs.
pub fn unique_points(poly: &mut Polyhedron) {
    let edges: Vec<HalfEdgeId> = poly.mesh.edges.keys().collect();
    let mut claimed: HashSet<VertexId> = HashSet::new();
    for he in edges {
        let origin = poly.mesh.edges.index(he).vert;
        if claimed.contains(&origin) {
            let position = poly.mesh.verts.index(origin).position;
            let src_topo = poly.mesh.verts.index(origin).topo_id.clone();
            let fresh = poly.mesh.fresh_vert_id();
            let new_vert = poly.mesh.add_vertex(position, Some(src_topo.appended(fresh.path()[0])));
            poly.mesh.edges.index_mut(he).vert = new_vert;
            claimed.insert(new_vert);
        } else {
            claimed.insert(origin);
        }
    }
}
