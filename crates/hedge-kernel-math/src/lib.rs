#![warn(missing_docs)]

//! Vector, plane, and polygon-predicate primitives for the hedge kernel.
//!
//! This crate is the external collaborator the half-edge kernel leans on for
//! anything purely numeric: 2D/3D vector arithmetic, plane construction and
//! intersection, polygon orientation/convexity tests, and axis-aligned
//! bounding boxes. It intentionally does not attempt exact-arithmetic
//! predicates — every test here accepts a small floating-point epsilon
//! rather than falling back to adaptive or rational arithmetic.

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// 2D vector (also used for 2D points).
pub type Vec2 = Vector2<f64>;
/// 3D vector (also used for 3D points).
pub type Vec3 = Vector3<f64>;

/// Plane tolerance used when classifying a point as above/below/on a plane.
///
/// Distances with absolute value at or below this are treated as "on" the
/// plane. Callers working at a different physical scale (millimeters versus
/// meters, say) should not rely on this constant and should carry their own
/// tolerance instead.
pub const POINT_STATUS_EPSILON: f64 = 1e-4;

/// An oriented plane in 3D, represented in Hesse normal form.
///
/// `normal` is expected to be unit length; `dist` is the signed distance
/// from the origin to the plane along `normal`, so that a point `p` lies on
/// the plane iff `normal.dot(p) - dist == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane.
    pub normal: Vec3,
    /// Signed distance from the origin along `normal`.
    pub dist: f64,
}

impl Plane {
    /// Build a plane from a normal and a point it passes through.
    ///
    /// The normal is normalized; if it is (numerically) zero, the returned
    /// plane has a zero normal and `dist = 0.0` — callers should treat this
    /// as a degenerate plane.
    pub fn build(normal: Vec3, point: Point3<f64>) -> Self {
        let len = normal.norm();
        if len <= f64::EPSILON {
            return Plane {
                normal: Vec3::zeros(),
                dist: 0.0,
            };
        }
        let n = normal / len;
        let dist = n.dot(&point.coords);
        Plane { normal: n, dist }
    }

    /// Build a plane through three points, right-hand-rule oriented:
    /// the normal is `(b - a) x (c - a)`, normalized.
    pub fn from_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        let normal = (b - a).cross(&(c - a));
        Self::build(normal, a)
    }

    /// Signed distance from `point` to this plane (positive on the side the
    /// normal points toward).
    pub fn get_distance(&self, point: Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.dist
    }

    /// Return the plane with the opposite normal, passing through the same
    /// set of points.
    pub fn flip(&self) -> Self {
        Plane {
            normal: -self.normal,
            dist: -self.dist,
        }
    }
}

/// Intersect three planes at a point, if they have a unique common point.
///
/// Returns `None` when the three planes' normals are (numerically) linearly
/// dependent — parallel planes, or two planes that share a line of
/// intersection with the third.
pub fn intersect_planes(p0: &Plane, p1: &Plane, p2: &Plane) -> Option<Point3<f64>> {
    let n0 = p0.normal;
    let n1 = p1.normal;
    let n2 = p2.normal;

    let denom = n0.dot(&n1.cross(&n2));
    if denom.abs() < 1e-9 {
        return None;
    }

    let numer = p0.dist * n1.cross(&n2) + p1.dist * n2.cross(&n0) + p2.dist * n0.cross(&n1);
    Some(Point3::from(numer / denom))
}

/// Distance between two 3D points.
pub fn distance3(a: Point3<f64>, b: Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Unsigned interior angle, in radians, at vertex `b` of the path `a -> b -> c`.
pub fn angle_between(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let u = a - b;
    let v = c - b;
    let cos_theta = (u.dot(&v) / (u.norm() * v.norm())).clamp(-1.0, 1.0);
    cos_theta.acos()
}

/// Rotate a 2D vector by `angle` radians (counter-clockwise for positive angles).
pub fn rotate2(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Signed area of a 2D polygon given in order (positive iff counter-clockwise).
pub fn signed_area2(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

/// Test whether a planar polygon (given in order) winds clockwise.
///
/// An empty or degenerate (fewer than 3 points) polygon is reported as not
/// clockwise.
pub fn is_polygon_clockwise(points: &[Point2<f64>]) -> bool {
    signed_area2(points) < 0.0
}

/// Test whether a planar polygon (given in order) is convex.
///
/// Degenerate polygons (fewer than 3 points) are considered convex.
pub fn is_polygon_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return true;
    }
    let mut sign = 0.0_f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).x * (c - b).y - (b - a).y * (c - b).x;
        if cross.abs() < 1e-12 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Compute the (non-unit) normal of a planar 3D loop given by its ordered
/// vertex positions, via the Newell sum `sum(v_i x v_{i+1})`.
///
/// Works for non-convex and near-degenerate planar loops; returns a zero
/// vector for fewer than 3 points.
pub fn newell_normal(points: &[Point3<f64>]) -> Vec3 {
    let mut n = Vec3::zeros();
    let len = points.len();
    if len < 3 {
        return n;
    }
    for i in 0..len {
        let a = points[i];
        let b = points[(i + 1) % len];
        n += a.coords.cross(&b.coords);
    }
    n
}

/// Axis-aligned bounding box. An empty box reports `min > max` on every axis
/// and contributes nothing when combined with another box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// An empty bounding box (no point has been combined into it yet).
    pub fn make_empty() -> Self {
        Aabb {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Whether this box has never been combined with a point.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Extend the box to include `point`.
    pub fn combine(&mut self, point: Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::make_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_build_and_distance() {
        let plane = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 2.0));
        assert!((plane.get_distance(Point3::new(5.0, 5.0, 2.0)) - 0.0).abs() < 1e-9);
        assert!((plane.get_distance(Point3::new(0.0, 0.0, 5.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn plane_flip_negates_distance() {
        let plane = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 2.0));
        let flipped = plane.flip();
        assert!((flipped.normal + plane.normal).norm() < 1e-12);
        assert!((flipped.get_distance(Point3::origin()) + plane.get_distance(Point3::origin())).abs() < 1e-12);
    }

    #[test]
    fn intersect_three_orthogonal_planes() {
        let px = Plane::build(Vec3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let py = Plane::build(Vec3::new(0.0, 1.0, 0.0), Point3::new(0.0, 2.0, 0.0));
        let pz = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 3.0));
        let p = intersect_planes(&px, &py, &pz).expect("unique intersection");
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-9);
    }

    #[test]
    fn intersect_parallel_planes_is_none() {
        let p0 = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 0.0));
        let p1 = Plane::build(Vec3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0));
        let p2 = Plane::build(Vec3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        assert!(intersect_planes(&p0, &p1, &p2).is_none());
    }

    #[test]
    fn convex_and_clockwise_square() {
        let ccw = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(is_polygon_convex(&ccw));
        assert!(!is_polygon_clockwise(&ccw));

        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert!(is_polygon_convex(&cw));
        assert!(is_polygon_clockwise(&cw));
    }

    #[test]
    fn non_convex_polygon_detected() {
        // An "L" shape.
        let l_shape = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(!is_polygon_convex(&l_shape));
    }

    #[test]
    fn newell_normal_of_xy_square_points_up() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&square).normalize();
        assert!((n - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn aabb_combine_grows_box() {
        let mut aabb = Aabb::make_empty();
        assert!(aabb.is_empty());
        aabb.combine(Point3::new(1.0, -1.0, 2.0));
        aabb.combine(Point3::new(-1.0, 3.0, 0.0));
        assert_eq!(aabb.min, Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 2.0));
    }
}
