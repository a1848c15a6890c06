//! IsContain (C12): point-in-convex-polyhedron by signed half-space test.

use hedge_kernel_math::POINT_STATUS_EPSILON;
use nalgebra::Point3;

use crate::polyhedron::Polyhedron;

/// Whether `point` lies inside (or on, within [`POINT_STATUS_EPSILON`]) the
/// convex polyhedron's every face plane.
///
/// For a face with holes, a hole's plane is tested with the same
/// inside-the-border rule as the border itself (the hole-logic collapses to
/// border-logic, matching the approximation one upstream source used).
pub fn is_contain(poly: &Polyhedron, point: Point3<f64>) -> bool {
    for (_, face) in &poly.faces {
        let border_plane = poly.mesh.loop_to_plane(face.border);
        if border_plane.get_distance(point) > POINT_STATUS_EPSILON {
            return false;
        }
        for &hole in &face.holes {
            let hole_plane = poly.mesh.loop_to_plane(hole);
            if hole_plane.get_distance(point) > POINT_STATUS_EPSILON {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn unit_cube() -> Polyhedron {
        Polyhedron::from_aabb(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn point_strictly_inside_is_contained() {
        let cube = unit_cube();
        assert!(is_contain(&cube, Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn point_just_outside_by_two_epsilon_is_not_contained() {
        let cube = unit_cube();
        let eps = POINT_STATUS_EPSILON;
        assert!(!is_contain(&cube, Point3::new(1.0 + 2.0 * eps, 0.0, 0.0)));
    }

    #[test]
    fn point_on_a_face_is_contained() {
        let cube = unit_cube();
        assert!(is_contain(&cube, Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn point_well_outside_is_not_contained() {
        let cube = unit_cube();
        assert!(!is_contain(&cube, Point3::new(5.0, 5.0, 5.0)));
    }
}
