//! 2D polygon offset (inset/outset) by a signed distance, per-vertex
//! mitered at each loop's interior angle.
//!
//! Every mode starts from the same per-vertex construction: at a vertex
//! `v` with predecessor `p` and successor `n`, the interior angle
//! `alpha = angle_between(p, v, n)` gives a miter normal pointing into the
//! loop's interior; the offset point slides `v` along that normal by
//! `distance / cos(alpha / 2)` so that two adjacent offset edges still
//! meet exactly at the corner.

use hedge_kernel_math::{angle_between, rotate2, Vec2};
use hedge_kernel_primitives::{Face, FaceId, Polygon};
use hedge_kernel_topo::{HalfEdgeId, LoopId, VertexId};
use nalgebra::Point2;

/// Which loops survive an [`offset`] call, and what (if anything) gets
/// added alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetMode {
    /// Move every loop of the face (border and holes) to its offset
    /// position in place; no new loops or faces are created.
    KeepInside,
    /// Leave the border in place and add an inset clone of it as a new
    /// hole of the same face.
    KeepBorder,
    /// As [`OffsetMode::KeepBorder`], plus a second new `Face` whose
    /// border is an unflipped copy of the same offset loop, so the ring
    /// between the original border and the offset sits on its own as an
    /// independent face (the "inner island").
    KeepAll,
}

/// Apply `distance` (positive shrinks a counter-clockwise border toward
/// its interior) to every face of `poly` under `mode`.
pub fn offset(poly: &mut Polygon, distance: f64, mode: OffsetMode) {
    let face_ids: Vec<FaceId> = poly.faces.keys().collect();
    for face_id in face_ids {
        match mode {
            OffsetMode::KeepInside => {
                let border = poly.faces[face_id].border;
                let holes = poly.faces[face_id].holes.clone();
                reposition_loop(poly, border, distance);
                for hole in holes {
                    reposition_loop(poly, hole, distance);
                }
            }
            OffsetMode::KeepBorder => {
                add_inset_hole(poly, face_id, distance);
            }
            OffsetMode::KeepAll => {
                let border = poly.faces[face_id].border;
                add_inset_hole(poly, face_id, distance);
                let island = build_offset_loop(poly, border, distance);
                poly.faces.insert(Face::new(island));
            }
        }
    }
}

fn add_inset_hole(poly: &mut Polygon, face_id: FaceId, distance: f64) {
    let border = poly.faces[face_id].border;
    let hole = build_offset_loop(poly, border, distance);
    poly.mesh.flip(hole);
    poly.faces[face_id].holes.push(hole);
}

/// Offset position of every vertex of `loop_id`, in cycle order.
fn offset_positions(poly: &Polygon, loop_id: LoopId, distance: f64) -> Vec<Vec2> {
    let verts = poly.mesh.loop_to_vertices(loop_id);
    let n = verts.len();
    (0..n)
        .map(|i| {
            let p = verts[(i + n - 1) % n];
            let v = verts[i];
            let next = verts[(i + 1) % n];
            let alpha = angle_between(Point2::from(p), Point2::from(v), Point2::from(next));
            let mut normal = rotate2(p - v, -alpha / 2.0);
            if normal.norm() > 1e-12 {
                normal /= normal.norm();
            }
            let half_cos = (alpha / 2.0).cos();
            let miter = if half_cos.abs() > 1e-9 { distance / half_cos } else { distance };
            v + normal * miter
        })
        .collect()
}

/// Move an existing loop's vertices to their offset positions in place.
fn reposition_loop(poly: &mut Polygon, loop_id: LoopId, distance: f64) {
    let positions = offset_positions(poly, loop_id, distance);
    let edges: Vec<HalfEdgeId> = poly.mesh.loop_edges(loop_id).collect();
    for (he, pos) in edges.into_iter().zip(positions) {
        let v: VertexId = poly.mesh.edges.index(he).vert;
        poly.mesh.verts.index_mut(v).position = pos;
    }
}

/// Build a brand-new loop (fresh vertices and half-edges, same winding as
/// the source) at the offset positions of `src_loop`, carrying its
/// `TopoId`'s identity path forward with one fresh component appended.
fn build_offset_loop(poly: &mut Polygon, src_loop: LoopId, distance: f64) -> LoopId {
    let positions = offset_positions(poly, src_loop, distance);
    let src_topo = poly.mesh.loops.index(src_loop).topo_id.clone();
    let fresh = poly.mesh.fresh_loop_id();
    let new_topo = src_topo.appended(fresh.path()[0]);

    let verts: Vec<VertexId> = positions.into_iter().map(|p| poly.mesh.add_vertex(p, None)).collect();
    let edges: Vec<HalfEdgeId> = verts.iter().map(|&v| poly.mesh.add_half_edge(v, None)).collect();
    poly.mesh.add_loop(&edges, Some(new_topo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::from_points(&[
            Point2::new(-0.5, -0.5),
            Point2::new(0.5, -0.5),
            Point2::new(0.5, 0.5),
            Point2::new(-0.5, 0.5),
        ])
    }

    fn border_bbox(poly: &Polygon, face_id: FaceId) -> (f64, f64) {
        let pts = poly.face_border_vertices(face_id);
        let max = pts.iter().map(|p| p.x.abs().max(p.y.abs())).fold(0.0, f64::max);
        let min = pts.iter().map(|p| p.x.abs().min(p.y.abs())).fold(f64::MAX, f64::min);
        (min, max)
    }

    #[test]
    fn keep_inside_shrinks_border_in_place() {
        let mut square = unit_square();
        let face_id = square.faces.keys().next().unwrap();
        offset(&mut square, 0.1, OffsetMode::KeepInside);
        let (_, max) = border_bbox(&square, face_id);
        assert!((max - 0.4).abs() < 1e-9);
        assert_eq!(square.faces.len(), 1);
    }

    #[test]
    fn keep_border_adds_one_hole_and_leaves_border_untouched() {
        let mut square = unit_square();
        let face_id = square.faces.keys().next().unwrap();
        offset(&mut square, 0.1, OffsetMode::KeepBorder);

        assert_eq!(square.faces.len(), 1);
        let face = &square.faces[face_id];
        assert_eq!(face.holes.len(), 1);

        let (_, border_max) = border_bbox(&square, face_id);
        assert!((border_max - 0.5).abs() < 1e-9);

        let hole_pts = square.mesh.loop_to_vertices(face.holes[0]);
        let hole_max = hole_pts.iter().map(|p| p.x.abs().max(p.y.abs())).fold(0.0, f64::max);
        assert!((hole_max - 0.4).abs() < 1e-9);
        assert!(square.mesh.is_loop_clockwise(face.holes[0]));
    }

    #[test]
    fn keep_all_adds_hole_plus_inner_island_face() {
        let mut square = unit_square();
        offset(&mut square, 0.1, OffsetMode::KeepAll);

        assert_eq!(square.faces.len(), 2);
        let island_id = square
            .faces
            .keys()
            .find(|&id| square.faces[id].holes.is_empty())
            .unwrap();
        assert!(!square.mesh.is_loop_clockwise(square.faces[island_id].border));
        let (_, island_max) = border_bbox(&square, island_id);
        assert!((island_max - 0.4).abs() < 1e-9);
    }

    #[test]
    fn keep_inside_negative_distance_grows_the_border() {
        let mut square = unit_square();
        let face_id = square.faces.keys().next().unwrap();
        offset(&mut square, -0.1, OffsetMode::KeepInside);
        let (_, max) = border_bbox(&square, face_id);
        assert!((max - 0.6).abs() < 1e-9);
    }
}
