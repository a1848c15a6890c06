//! Face extrusion: front/side/back face synthesis from a marked subset of a
//! polyhedron's faces, translated along their own supporting planes.
//!
//! The three stages are independently switchable:
//! - `front` caps the translated copy of the marked faces.
//! - `side` builds a quad skirt between the old and new rims, suppressing
//!   the seam between two adjacent marked faces and twin-pairing the
//!   neighboring quads directly instead.
//! - `back` leaves an inward-facing copy of the marked faces at their
//!   original position (reversed winding), useful for hollowing a boss out
//!   of a solid rather than just pushing its cap away.
//!
//! None of the new topology reuses an old half-edge's identity: a marked
//! face's old border is always fully discarded once its replacement
//! geometry is built, and the old border's original twin pairing (where it
//! bordered an untouched face) is migrated onto the new edge that now
//! occupies that position.

use std::collections::{HashMap, HashSet};

use hedge_kernel_math::{intersect_planes, Plane};
use hedge_kernel_primitives::{Face, FaceId, Polyhedron};
use hedge_kernel_topo::{HalfEdgeId, VertexId};
use nalgebra::Point3;
use thiserror::Error;

/// Which of the three extrusion stages to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrudeFlags {
    /// Cap the translated rim.
    pub front: bool,
    /// Leave an inward-facing copy at the original position.
    pub back: bool,
    /// Build the quad skirt connecting old and new rims.
    pub side: bool,
}

/// Errors an extrusion can report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtrudeError {
    /// No faces were marked.
    #[error("no faces were marked for extrusion")]
    NoFaces,
    /// A shared vertex's three-plane reposition had no unique solution.
    #[error("reposition of a shared vertex failed: no three-plane intersection exists")]
    DegenerateReposition,
}

/// Extrude the faces in `faces` by `distance` along their own supporting
/// planes, per `flags`. Holes are not extruded — only each face's border is
/// considered.
pub fn extrude(
    poly: &mut Polyhedron,
    faces: &[FaceId],
    distance: f64,
    flags: ExtrudeFlags,
) -> Result<(), ExtrudeError> {
    if faces.is_empty() {
        return Err(ExtrudeError::NoFaces);
    }

    let loop_to_face: HashMap<_, _> = faces.iter().map(|&f| (poly.faces[f].border, f)).collect();

    // Step 1: translated supporting planes.
    let translated: HashMap<FaceId, Plane> = faces
        .iter()
        .map(|&f| {
            let p = poly.calc_face_norm(f);
            (f, Plane { normal: p.normal, dist: p.dist + distance })
        })
        .collect();

    // Snapshot each marked face's old border before any mutation.
    let old_loop_edges: HashMap<FaceId, Vec<HalfEdgeId>> = faces
        .iter()
        .map(|&f| (f, poly.mesh.loop_edges(poly.faces[f].border).collect()))
        .collect();
    let original_twin: HashMap<HalfEdgeId, Option<HalfEdgeId>> = old_loop_edges
        .values()
        .flatten()
        .map(|&he| (he, poly.mesh.edges.index(he).twin))
        .collect();

    // Step 2/3: shared old->new vertex map, repositioned by triple-plane intersection.
    let mut new_of: HashMap<VertexId, VertexId> = HashMap::new();
    if flags.front || flags.side {
        for &f in faces {
            for &he in &old_loop_edges[&f] {
                let v = poly.mesh.edges.index(he).vert;
                new_of.entry(v).or_insert_with(|| {
                    let pos = poly.mesh.verts.index(v).position;
                    poly.mesh.add_vertex(pos, None)
                });
            }
        }

        let mut incident: HashMap<VertexId, Vec<FaceId>> = HashMap::new();
        for &f in faces {
            for &he in &old_loop_edges[&f] {
                let v = poly.mesh.edges.index(he).vert;
                let bucket = incident.entry(v).or_default();
                if !bucket.contains(&f) {
                    bucket.push(f);
                }
            }
        }

        let repositioned: Vec<(VertexId, Point3<f64>)> = new_of
            .keys()
            .map(|&old_v| {
                let pos = reposition_vertex(poly, old_v, &incident[&old_v], &translated, &old_loop_edges)
                    .ok_or(ExtrudeError::DegenerateReposition)?;
                Ok((old_v, pos))
            })
            .collect::<Result<_, ExtrudeError>>()?;
        for (old_v, pos) in repositioned {
            poly.mesh.verts.index_mut(new_of[&old_v]).position = pos.coords;
        }
    }

    // Step 4: front loops, capped only if `front`.
    if flags.front || flags.side {
        for &f in faces {
            let new_he: Vec<HalfEdgeId> = old_loop_edges[&f]
                .iter()
                .map(|&he| {
                    let old_v = poly.mesh.edges.index(he).vert;
                    poly.mesh.add_half_edge(new_of[&old_v], None)
                })
                .collect();
            let new_loop = poly.mesh.add_loop(&new_he, None);
            if flags.front {
                poly.faces.insert(Face::new(new_loop));
            }
        }
    }

    // Step 5: side walls.
    let mut side_bottom: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
    if flags.side {
        let mut vertical: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
        for &f in faces {
            let list = &old_loop_edges[&f];
            let n = list.len();
            for i in 0..n {
                let he = list[i];
                let twin = poly.mesh.edges.index(he).twin;
                let suppressed = twin.is_some_and(|t| {
                    poly.mesh.edges.index(t).loop_id.is_some_and(|l| loop_to_face.contains_key(&l))
                });
                if suppressed {
                    continue;
                }

                let old_vi = poly.mesh.edges.index(he).vert;
                let old_vi1 = poly.mesh.edges.index(list[(i + 1) % n]).vert;
                let new_vi = new_of[&old_vi];
                let new_vi1 = new_of[&old_vi1];

                let bottom = poly.mesh.add_half_edge(old_vi, None);
                let right = vertical_edge(poly, &mut vertical, old_vi1, new_vi1);
                let top = poly.mesh.add_half_edge(new_vi1, None);
                let left = vertical_edge(poly, &mut vertical, new_vi, old_vi);

                let new_loop = poly.mesh.add_loop(&[bottom, right, top, left], None);
                poly.faces.insert(Face::new(new_loop));

                side_bottom.insert((old_vi, old_vi1), bottom);

                if !flags.back {
                    if let Some(orig_t) = original_twin[&he] {
                        poly.mesh.del_pair(he);
                        poly.mesh.make_pair(bottom, orig_t);
                    }
                }
            }
        }
    }

    // Step 6/7: back faces, reusing old vertices in reverse cycle order.
    if flags.back {
        let mut back_edges: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
        for &f in faces {
            let list = &old_loop_edges[&f];
            let verts: Vec<VertexId> = list.iter().map(|&he| poly.mesh.edges.index(he).vert).collect();
            let n = verts.len();
            let mut reversed = verts.clone();
            reversed.reverse();
            reversed.rotate_right(1);

            let back_he: Vec<HalfEdgeId> = reversed.iter().map(|&v| poly.mesh.add_half_edge(v, None)).collect();
            poly.mesh.add_loop(&back_he, None);
            let back_loop = poly.mesh.edges.index(back_he[0]).loop_id.expect("just bound");
            poly.faces.insert(Face::new(back_loop));

            for i in 0..n {
                let u = reversed[i];
                let v = reversed[(i + 1) % n];
                let this = back_he[i];
                if let Some(&bottom) = side_bottom.get(&(v, u)) {
                    poly.mesh.make_pair(this, bottom);
                } else if let Some(&other) = back_edges.get(&(v, u)) {
                    poly.mesh.make_pair(this, other);
                } else {
                    back_edges.insert((u, v), this);
                }
            }
        }
    }

    // Step 8: remove the old marked faces and their border loops.
    let marked: HashSet<FaceId> = faces.iter().copied().collect();
    for &f in &marked {
        let border = poly.faces[f].border;
        for &he in &old_loop_edges[&f] {
            poly.mesh.edges.remove(he);
        }
        poly.mesh.loops.remove(border);
        poly.faces.remove(f);
    }

    // Step 9.
    poly.update_aabb();
    Ok(())
}

/// Build (or reuse) the half-edge from `from` to `to`, twin-pairing it with
/// the opposite-direction edge if one was already built at this position by
/// a neighboring quad.
fn vertical_edge(
    poly: &mut Polyhedron,
    map: &mut HashMap<(VertexId, VertexId), HalfEdgeId>,
    from: VertexId,
    to: VertexId,
) -> HalfEdgeId {
    let he = poly.mesh.add_half_edge(from, None);
    if let Some(&opposite) = map.get(&(to, from)) {
        poly.mesh.make_pair(he, opposite);
    } else {
        map.insert((from, to), he);
    }
    he
}

fn out_edge_at(poly: &Polyhedron, loop_edges: &[HalfEdgeId], v: VertexId) -> HalfEdgeId {
    *loop_edges
        .iter()
        .find(|&&he| poly.mesh.edges.index(he).vert == v)
        .expect("vertex is on this face's border")
}

fn edge_plane(face_normal: hedge_kernel_math::Vec3, a: Point3<f64>, b: Point3<f64>) -> Plane {
    let dir = b - a;
    Plane::build(dir.cross(&face_normal), a)
}

fn reposition_vertex(
    poly: &Polyhedron,
    v: VertexId,
    incident: &[FaceId],
    translated: &HashMap<FaceId, Plane>,
    old_loop_edges: &HashMap<FaceId, Vec<HalfEdgeId>>,
) -> Option<Point3<f64>> {
    let old_pos = Point3::from(poly.mesh.verts.index(v).position);

    let edge_planes_at = |f: FaceId| -> (Plane, Plane) {
        let edges = &old_loop_edges[&f];
        let out = out_edge_at(poly, edges, v);
        let inp = poly.mesh.edges.index(out).prev.expect("face border is closed");
        let face_plane = translated[&f];
        let dest_pos = Point3::from(poly.mesh.verts.index(poly.mesh.dest(out)).position);
        let origin_pos = Point3::from(poly.mesh.verts.index(poly.mesh.edges.index(inp).vert).position);
        (
            edge_plane(face_plane.normal, old_pos, dest_pos),
            edge_plane(face_plane.normal, origin_pos, old_pos),
        )
    };

    match incident.len() {
        0 => None,
        1 => {
            let f = incident[0];
            let (plane_out, plane_in) = edge_planes_at(f);
            intersect_planes(&translated[&f], &plane_out, &plane_in)
        }
        2 => {
            let p0 = translated[&incident[0]];
            let p1 = translated[&incident[1]];
            for &f in &incident[..2] {
                let (plane_out, plane_in) = edge_planes_at(f);
                if let Some(p) = intersect_planes(&p0, &p1, &plane_out) {
                    return Some(p);
                }
                if let Some(p) = intersect_planes(&p0, &p1, &plane_in) {
                    return Some(p);
                }
            }
            None
        }
        _ => {
            let p0 = translated[&incident[0]];
            let p1 = translated[&incident[1]];
            let p2 = translated[&incident[2]];
            intersect_planes(&p0, &p1, &p2)
        }
    }
}
