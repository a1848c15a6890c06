//! CSG union/intersect/subtract on closed polyhedra.
//!
//! All three operations are built from [`hedge_kernel_clip::clip`]: there is
//! no surface-surface intersection or face classification pipeline here.
//! Each supporting plane of one operand is used to trim (a copy of) the
//! other; the recursive fragmentation in [`subtract`] is what gives the
//! engine symmetric-difference behavior without ever computing it directly.

use hedge_kernel_clip::{clip, ClipError, KeepMode};
use hedge_kernel_math::Plane;
use hedge_kernel_primitives::Polyhedron;
use thiserror::Error;

/// Errors a boolean operation can report.
#[derive(Debug, Error)]
pub enum BooleanError {
    /// [`intersect`] requires at least one operand to be closed (I6); neither was.
    #[error("intersect requires at least one operand to be closed")]
    OperandNotClosed,
    /// A clip step produced an ambiguous seam.
    #[error(transparent)]
    Clip(#[from] ClipError),
}

/// The three CSG operations this crate provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Keep the region covered by both operands.
    Intersection,
    /// Keep the region covered by `a` but not `b`.
    Difference,
    /// Keep the region covered by either operand.
    Union,
}

/// One supporting plane per face of `poly`, outward-facing.
fn supporting_planes(poly: &Polyhedron) -> Vec<Plane> {
    poly.faces.keys().map(|id| poly.calc_face_norm(id)).collect()
}

/// `A ∩ B`. Requires at least one operand closed (I6): clips a copy of the
/// closed operand by every supporting plane of the other, keeping the side
/// below each plane (capping as it goes). Empties out early if the running
/// result becomes empty.
pub fn intersect(a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, BooleanError> {
    let (base, other) = if a.is_closed() {
        (a, b)
    } else if b.is_closed() {
        (b, a)
    } else {
        return Err(BooleanError::OperandNotClosed);
    };

    let mut result = base.copy();
    for plane in supporting_planes(other) {
        if !clip(&mut result, &plane, KeepMode::Below, true)? {
            result.faces.clear();
            break;
        }
    }
    Ok(result)
}

/// `A \ B`. Recursive fragmentation: starting from a single fragment (a
/// copy of `A`), every supporting plane of `B` splits each live fragment in
/// two. The above-the-plane half is outside `B` with respect to that plane
/// and becomes a permanent result fragment; the below-the-plane half might
/// still be inside `B` and carries on to the next plane. Whatever is left
/// after the last plane is entirely inside `B` and is discarded.
pub fn subtract(a: &Polyhedron, b: &Polyhedron) -> Result<Vec<Polyhedron>, BooleanError> {
    let mut fragments = vec![a.copy()];
    let mut result = Vec::new();

    for plane in supporting_planes(b) {
        let mut next_fragments = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let mut above = fragment.copy();
            let mut below = fragment;
            if clip(&mut above, &plane, KeepMode::Above, true)? {
                result.push(above);
            }
            if clip(&mut below, &plane, KeepMode::Below, true)? {
                next_fragments.push(below);
            }
        }
        fragments = next_fragments;
    }

    Ok(result)
}

/// `A ∪ B`. If the operands don't overlap, the union is just the pair of
/// them. Otherwise the union is `(A \ I) ∪ (B \ I)` where `I = A ∩ B`: the
/// part of each operand outside their shared intersection.
pub fn union(a: &Polyhedron, b: &Polyhedron) -> Result<Vec<Polyhedron>, BooleanError> {
    let overlap = intersect(a, b)?;
    if overlap.faces.is_empty() {
        return Ok(vec![a.copy(), b.copy()]);
    }
    let mut result = subtract(a, &overlap)?;
    result.extend(subtract(b, &overlap)?);
    Ok(result)
}

/// Dispatch on a [`BooleanOp`]. `Intersection` returns at most one solid;
/// `Difference` and `Union` may return several disjoint fragments.
pub fn boolean_op(a: &Polyhedron, b: &Polyhedron, op: BooleanOp) -> Result<Vec<Polyhedron>, BooleanError> {
    match op {
        BooleanOp::Intersection => {
            let result = intersect(a, b)?;
            if result.faces.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![result])
            }
        }
        BooleanOp::Difference => subtract(a, b),
        BooleanOp::Union => union(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn cube(min: f64, max: f64) -> Polyhedron {
        Polyhedron::from_aabb(Point3::new(min, min, min), Point3::new(max, max, max))
    }

    fn shifted_cube(size: f64, dx: f64, dy: f64, dz: f64) -> Polyhedron {
        Polyhedron::from_aabb(
            Point3::new(dx, dy, dz),
            Point3::new(dx + size, dy + size, dz + size),
        )
    }

    #[test]
    fn disjoint_union_returns_both_operands_untouched() {
        let a = cube(0.0, 1.0);
        let b = shifted_cube(1.0, 5.0, 0.0, 0.0);
        let result = union(&a, &b).unwrap();
        assert_eq!(result.len(), 2);
        for solid in &result {
            assert!(solid.is_closed());
        }
    }

    #[test]
    fn intersect_of_disjoint_cubes_is_empty() {
        let a = cube(0.0, 1.0);
        let b = shifted_cube(1.0, 5.0, 0.0, 0.0);
        let result = intersect(&a, &b).unwrap();
        assert!(result.faces.is_empty());
    }

    #[test]
    fn intersect_of_overlapping_cubes_is_closed_and_smaller() {
        let a = cube(0.0, 2.0);
        let b = shifted_cube(2.0, 1.0, 1.0, 1.0);
        let result = intersect(&a, &b).unwrap();
        assert!(result.is_closed());
        assert_eq!(result.aabb.min, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(result.aabb.max, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn subtract_disjoint_leaves_a_unchanged() {
        let a = cube(0.0, 1.0);
        let b = shifted_cube(1.0, 5.0, 0.0, 0.0);
        let result = subtract(&a, &b).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_closed());
        assert_eq!(result[0].aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(result[0].aabb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn subtract_full_overlap_is_empty() {
        let a = cube(0.0, 1.0);
        let b = cube(-1.0, 2.0);
        let result = subtract(&a, &b).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn subtract_corner_overlap_produces_one_closed_fragment() {
        let a = cube(0.0, 2.0);
        let b = shifted_cube(2.0, 1.0, 1.0, 1.0);
        let result = subtract(&a, &b).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_closed());
    }

    #[test]
    fn boolean_op_dispatches_to_the_right_algorithm() {
        let a = cube(0.0, 2.0);
        let b = shifted_cube(2.0, 1.0, 1.0, 1.0);
        assert_eq!(boolean_op(&a, &b, BooleanOp::Intersection).unwrap().len(), 1);
        assert_eq!(boolean_op(&a, &b, BooleanOp::Difference).unwrap().len(), 1);
        assert_eq!(boolean_op(&a, &b, BooleanOp::Union).unwrap().len(), 2);
    }

    #[test]
    fn intersect_requires_one_closed_operand() {
        let positions = vec![
            hedge_kernel_math::Vec3::new(0.0, 0.0, 0.0),
            hedge_kernel_math::Vec3::new(1.0, 0.0, 0.0),
            hedge_kernel_math::Vec3::new(0.0, 1.0, 0.0),
        ];
        let open = Polyhedron::from_indexed_faces(
            &positions,
            vec![hedge_kernel_primitives::IndexedFace::new(vec![0, 1, 2])],
        );
        let other = open.copy();
        assert!(matches!(
            intersect(&open, &other),
            Err(BooleanError::OperandNotClosed)
        ));
    }
}
