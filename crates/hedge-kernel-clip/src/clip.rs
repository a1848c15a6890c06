//! The plane-clipping engine: the kernel's central algorithm.
//!
//! Clipping proceeds in three phases: (1) a per-vertex census against the
//! plane decides whether a cut is needed at all; (2) every crossed face is
//! split in place, inserting a fresh "Inside" vertex per crossing edge
//! (mirrored onto the twin so adjacent faces see the same seam vertex) and
//! a splitter edge pair dividing the face's loop in two; (3) the seam
//! formed by every face's splitter is walked to confirm it closes into a
//! single cycle, optionally capped, and the discarded side is deleted by
//! invalidation cascade.

use std::collections::{HashMap, HashSet};

use hedge_kernel_math::Plane;
use hedge_kernel_primitives::{Face, FaceId, Polyhedron};
use hedge_kernel_topo::{calc_point_plane_status, HalfEdgeId, LoopId, PointStatus, VertexId};
use nalgebra::Point3;
use thiserror::Error;

/// Which half-space survives a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepMode {
    /// Keep the side the plane's normal points toward.
    Above,
    /// Keep the side opposite the plane's normal.
    Below,
    /// Keep both sides (the plane only inserts a seam, nothing is deleted).
    All,
}

/// Failure of the clip engine to resolve a single, unambiguous seam cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipError {
    /// The set of per-face splitters does not form one closed cycle.
    #[error("clip seam does not form a single cycle")]
    AmbiguousSeam,
}

struct SplitFace {
    v_a: VertexId,
    v_b: VertexId,
    s_old: HalfEdgeId,
    s_new: HalfEdgeId,
    sample_old: VertexId,
    sample_new: VertexId,
}

/// Cut `poly` by `plane`, keeping `keep` and optionally sealing the cut with
/// a cap face. Returns `Ok(true)` if the polyhedron changed, `Ok(false)` if
/// the plane missed the mesh (every vertex already on the kept side, or the
/// whole mesh coplanar with the plane).
pub fn clip(poly: &mut Polyhedron, plane: &Plane, keep: KeepMode, seam_face: bool) -> Result<bool, ClipError> {
    let mut status = census(poly, plane);
    if let Some(side) = overall_side(&status) {
        return Ok(keep == KeepMode::All || keep == side);
    }

    let loop_ids: Vec<LoopId> = poly.faces.values().map(|f| f.border).collect();
    let mut splits = Vec::new();

    for loop_id in loop_ids {
        if let Some((ha, hb)) = inside_points(poly, loop_id, &mut status, plane) {
            let sample_old = poly.mesh.edges.index(poly.mesh.edges.index(hb).prev.expect("loop is closed")).vert;
            let sample_new = poly.mesh.edges.index(poly.mesh.edges.index(ha).prev.expect("loop is closed")).vert;
            let (s_old, s_new, new_loop) = split_loop_at(poly, loop_id, ha, hb);
            let v_a = poly.mesh.edges.index(ha).vert;
            let v_b = poly.mesh.edges.index(hb).vert;
            poly.faces.insert(Face::new(new_loop));
            splits.push(SplitFace {
                v_a,
                v_b,
                s_old,
                s_new,
                sample_old,
                sample_new,
            });
        }
    }

    if splits.is_empty() {
        return Ok(false);
    }

    let walk = walk_seam(&splits)?;

    if seam_face {
        build_cap(poly, &splits, &walk, plane, keep);
    }

    if keep != KeepMode::All {
        sweep(poly, &status, keep);
    }

    poly.update_aabb();
    Ok(true)
}

fn census(poly: &Polyhedron, plane: &Plane) -> HashMap<VertexId, PointStatus> {
    poly.mesh
        .verts
        .iter()
        .map(|(id, v)| (id, calc_point_plane_status(plane, Point3::from(v.position))))
        .collect()
}

fn overall_side(status: &HashMap<VertexId, PointStatus>) -> Option<KeepMode> {
    let mut any_above = false;
    let mut any_below = false;
    for &s in status.values() {
        match s {
            PointStatus::Above => any_above = true,
            PointStatus::Below => any_below = true,
            PointStatus::Inside => {}
        }
    }
    match (any_above, any_below) {
        (true, true) => None,
        (true, false) => Some(KeepMode::Above),
        (false, true) => Some(KeepMode::Below),
        (false, false) => Some(KeepMode::Above),
    }
}

/// Split every still-crossing edge on `loop_id`, then report its two
/// `Inside`-status vertices (if the loop is touched by the plane at
/// exactly two points; otherwise `None`, meaning this face needs no
/// splitter — either it doesn't meet the plane at all, or it only grazes
/// a single vertex already split by a neighboring face).
fn inside_points(
    poly: &mut Polyhedron,
    loop_id: LoopId,
    status: &mut HashMap<VertexId, PointStatus>,
    plane: &Plane,
) -> Option<(HalfEdgeId, HalfEdgeId)> {
    loop {
        let crossing = poly.mesh.loop_edges(loop_id).find(|&he| {
            let a = status[&poly.mesh.edges.index(he).vert];
            let b = status[&poly.mesh.dest(he)];
            matches!(
                (a, b),
                (PointStatus::Above, PointStatus::Below) | (PointStatus::Below, PointStatus::Above)
            )
        });
        match crossing {
            Some(he) => {
                let t = param_t(poly, he, plane);
                let v = split_edge_pair(poly, he, t);
                status.insert(v, PointStatus::Inside);
            }
            None => break,
        }
    }

    let inside_hes: Vec<HalfEdgeId> = poly
        .mesh
        .loop_edges(loop_id)
        .filter(|&he| status[&poly.mesh.edges.index(he).vert] == PointStatus::Inside)
        .collect();

    match inside_hes.len() {
        2 => Some((inside_hes[0], inside_hes[1])),
        _ => None,
    }
}

fn param_t(poly: &Polyhedron, he: HalfEdgeId, plane: &Plane) -> f64 {
    let origin = poly.mesh.edges.index(he).vert;
    let dest = poly.mesh.dest(he);
    let ds = plane.get_distance(Point3::from(poly.mesh.verts.index(origin).position));
    let de = plane.get_distance(Point3::from(poly.mesh.verts.index(dest).position));
    ds / (ds - de)
}

fn split_edge_pair(poly: &mut Polyhedron, he: HalfEdgeId, t: f64) -> VertexId {
    let origin = poly.mesh.edges.index(he).vert;
    let dest = poly.mesh.dest(he);
    let ps = poly.mesh.verts.index(origin).position;
    let pe = poly.mesh.verts.index(dest).position;
    let new_vert = poly.mesh.add_vertex(ps + (pe - ps) * t, None);

    insert_after(poly, he, new_vert);

    if let Some(twin) = poly.mesh.edges.index(he).twin {
        let new_twin_he = insert_after(poly, twin, new_vert);
        let he_second = poly.mesh.edges.index(he).next.expect("just connected");
        poly.mesh.del_pair(he);
        poly.mesh.make_pair(he, new_twin_he);
        poly.mesh.make_pair(he_second, twin);
    }
    new_vert
}

fn insert_after(poly: &mut Polyhedron, he: HalfEdgeId, new_vert: VertexId) -> HalfEdgeId {
    let old_next = poly.mesh.edges.index(he).next.expect("half-edge must close a loop");
    let loop_id = poly.mesh.edges.index(he).loop_id;
    let new_he = poly.mesh.add_half_edge(new_vert, None);
    poly.mesh.connect(he, new_he);
    poly.mesh.connect(new_he, old_next);
    poly.mesh.edges.index_mut(new_he).loop_id = loop_id;
    new_he
}

/// Divide `old_loop`'s cycle into two rings at its two `Inside` vertices
/// `ha`/`hb`, via a twinned splitter edge pair. `old_loop` is rebound to one
/// ring; the other gets a freshly minted loop id, returned for the caller
/// to wrap in a new `Face`.
fn split_loop_at(poly: &mut Polyhedron, old_loop: LoopId, ha: HalfEdgeId, hb: HalfEdgeId) -> (HalfEdgeId, HalfEdgeId, LoopId) {
    let before_b = poly.mesh.edges.index(hb).prev.expect("loop is closed");
    let before_a = poly.mesh.edges.index(ha).prev.expect("loop is closed");
    let v_a = poly.mesh.edges.index(ha).vert;
    let v_b = poly.mesh.edges.index(hb).vert;

    let s1 = poly.mesh.add_half_edge(v_b, None);
    let s2 = poly.mesh.add_half_edge(v_a, None);

    poly.mesh.connect(before_b, s1);
    poly.mesh.connect(s1, ha);
    poly.mesh.connect(before_a, s2);
    poly.mesh.connect(s2, hb);
    poly.mesh.make_pair(s1, s2);

    poly.mesh.bind_edge_loop(old_loop, ha);

    let mut ring2 = vec![hb];
    let mut current = poly.mesh.edges.index(hb).next.expect("ring2 closes");
    while current != hb {
        ring2.push(current);
        current = poly.mesh.edges.index(current).next.expect("ring2 closes");
    }
    let new_loop = poly.mesh.add_loop(&ring2, None);

    (s1, s2, new_loop)
}

/// Walk the per-face splitters via their shared seam vertices, confirming
/// they form one closed cycle. Returns the cycle as `(split_index,
/// forward)` pairs, `forward` meaning the walk crossed that face from
/// `v_a` to `v_b`.
fn walk_seam(splits: &[SplitFace]) -> Result<Vec<(usize, bool)>, ClipError> {
    if splits.is_empty() {
        return Err(ClipError::AmbiguousSeam);
    }
    let mut touch: HashMap<VertexId, Vec<usize>> = HashMap::new();
    for (i, s) in splits.iter().enumerate() {
        touch.entry(s.v_a).or_default().push(i);
        touch.entry(s.v_b).or_default().push(i);
    }

    let mut order = vec![(0usize, true)];
    let mut visited = vec![false; splits.len()];
    visited[0] = true;
    let mut current_vertex = splits[0].v_b;
    let mut current_face = 0usize;

    while order.len() < splits.len() {
        let touches = touch.get(&current_vertex).ok_or(ClipError::AmbiguousSeam)?;
        if touches.len() != 2 {
            return Err(ClipError::AmbiguousSeam);
        }
        let next_face = *touches.iter().find(|&&f| f != current_face).ok_or(ClipError::AmbiguousSeam)?;
        if visited[next_face] {
            return Err(ClipError::AmbiguousSeam);
        }
        let forward = splits[next_face].v_a == current_vertex;
        current_vertex = if forward { splits[next_face].v_b } else { splits[next_face].v_a };
        visited[next_face] = true;
        order.push((next_face, forward));
        current_face = next_face;
    }

    let closing_touches = touch.get(&current_vertex).ok_or(ClipError::AmbiguousSeam)?;
    if !closing_touches.contains(&0) {
        return Err(ClipError::AmbiguousSeam);
    }
    Ok(order)
}

fn vertex_side(poly: &Polyhedron, v: VertexId, plane: &Plane) -> KeepMode {
    let p = Point3::from(poly.mesh.verts.index(v).position);
    match calc_point_plane_status(plane, p) {
        PointStatus::Above => KeepMode::Above,
        _ => KeepMode::Below,
    }
}

fn build_cap(poly: &mut Polyhedron, splits: &[SplitFace], walk: &[(usize, bool)], plane: &Plane, keep: KeepMode) {
    if keep == KeepMode::All {
        return;
    }
    let desired_normal = if keep == KeepMode::Above { plane.normal } else { -plane.normal };

    let mut cap_half_edges = Vec::with_capacity(walk.len());
    for &(face_idx, forward) in walk {
        let s = &splits[face_idx];
        let kept_is_old = vertex_side(poly, s.sample_old, plane) == keep;
        let kept_splitter = if kept_is_old { s.s_old } else { s.s_new };
        let to_v = if forward { s.v_b } else { s.v_a };
        let cap_he = poly.mesh.add_half_edge(to_v, None);
        poly.mesh.make_pair(cap_he, kept_splitter);
        cap_half_edges.push(cap_he);
    }
    cap_half_edges.reverse();
    let cap_loop = poly.mesh.add_loop(&cap_half_edges, None);

    let normal = poly.mesh.calc_loop_norm(cap_loop);
    if normal.dot(&desired_normal) < 0.0 {
        poly.mesh.flip(cap_loop);
    }
    poly.faces.insert(Face::new(cap_loop));
}

/// Step 6: mark every vertex on the discarded side invalid, cascade the
/// invalidation through edges and loops, repair surviving records'
/// representative pointers, then sweep dead records away.
fn sweep(poly: &mut Polyhedron, status: &HashMap<VertexId, PointStatus>, keep: KeepMode) {
    let discard_side = if keep == KeepMode::Above { PointStatus::Below } else { PointStatus::Above };

    let mut invalid_verts: HashSet<VertexId> = poly
        .mesh
        .verts
        .keys()
        .filter(|v| status.get(v).copied() == Some(discard_side))
        .collect();
    let mut invalid_edges: HashSet<HalfEdgeId> = HashSet::new();
    let mut invalid_loops: HashSet<LoopId> = HashSet::new();

    loop {
        let mut changed = false;
        for (id, e) in poly.mesh.edges.iter() {
            if !invalid_edges.contains(&id) && invalid_verts.contains(&e.vert) {
                invalid_edges.insert(id);
                changed = true;
            }
        }
        for (id, e) in poly.mesh.edges.iter() {
            if let Some(loop_id) = e.loop_id {
                if invalid_edges.contains(&id) && invalid_loops.insert(loop_id) {
                    changed = true;
                }
            }
        }
        for (id, e) in poly.mesh.edges.iter() {
            if let Some(loop_id) = e.loop_id {
                if invalid_loops.contains(&loop_id) && invalid_edges.insert(id) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let vert_ids: Vec<VertexId> = poly.mesh.verts.keys().collect();
    for v in &vert_ids {
        if invalid_verts.contains(v) {
            continue;
        }
        let rep = poly.mesh.verts.index(*v).half_edge;
        let rep_invalid = rep.map(|he| invalid_edges.contains(&he)).unwrap_or(true);
        if rep_invalid {
            match poly.mesh.vertex_edges(*v).find(|he| !invalid_edges.contains(he)) {
                Some(he) => poly.mesh.verts.index_mut(*v).half_edge = Some(he),
                None => {
                    invalid_verts.insert(*v);
                }
            }
        }
    }

    let edge_ids: Vec<HalfEdgeId> = poly.mesh.edges.keys().collect();
    for e in &edge_ids {
        if invalid_edges.contains(e) {
            continue;
        }
        if let Some(twin) = poly.mesh.edges.index(*e).twin {
            if invalid_edges.contains(&twin) {
                poly.mesh.edges.index_mut(*e).twin = None;
            }
        }
    }

    let loop_ids: Vec<LoopId> = poly.mesh.loops.keys().collect();
    for l in &loop_ids {
        if invalid_loops.contains(l) {
            continue;
        }
        let rep = poly.mesh.loops.index(*l).edge;
        if invalid_edges.contains(&rep) {
            if let Some(replacement) = poly.mesh.edges.iter().find(|(_, e)| e.loop_id == Some(*l)).map(|(id, _)| id) {
                poly.mesh.loops.index_mut(*l).edge = replacement;
            }
        }
    }

    let face_ids: Vec<FaceId> = poly.faces.iter().map(|(id, _)| id).collect();
    for f in face_ids {
        let face = &poly.faces[f];
        let border_bad = invalid_loops.contains(&face.border);
        let hole_bad = face.holes.iter().any(|h| invalid_loops.contains(h));
        if border_bad || hole_bad {
            poly.faces.remove(f);
        }
    }

    for l in loop_ids {
        if invalid_loops.contains(&l) {
            poly.mesh.loops.remove(l);
        }
    }
    for e in edge_ids {
        if invalid_edges.contains(&e) {
            poly.mesh.edges.remove(e);
        }
    }
    for v in vert_ids {
        if invalid_verts.contains(&v) {
            poly.mesh.verts.remove(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Polyhedron {
        Polyhedron::from_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn plane_missing_mesh_is_unchanged() {
        let mut cube = unit_cube();
        let plane = Plane::build(hedge_kernel_math::Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 5.0));
        let changed = clip(&mut cube, &plane, KeepMode::Above, true).unwrap();
        assert!(!changed);
        assert_eq!(cube.mesh.verts.size(), 8);
    }

    #[test]
    fn clip_unit_cube_at_z_zero_keep_above_with_cap() {
        let mut cube = unit_cube();
        let plane = Plane::build(hedge_kernel_math::Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 0.0));
        let changed = clip(&mut cube, &plane, KeepMode::Above, true).unwrap();
        assert!(changed);
        assert_eq!(cube.mesh.verts.size(), 8);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.is_closed());
        assert_eq!(cube.aabb.min, Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(cube.aabb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn clip_keep_all_retains_both_sides_and_stays_closed() {
        let mut cube = unit_cube();
        let plane = Plane::build(hedge_kernel_math::Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 0.0));
        let changed = clip(&mut cube, &plane, KeepMode::All, true).unwrap();
        assert!(changed);
        assert!(cube.is_closed());
        assert_eq!(cube.mesh.verts.size(), 12);
    }
}
