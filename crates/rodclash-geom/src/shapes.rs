//! Parametric shapes for building elements.
//!
//! Geometry kind is deliberately separate from the domain classification
//! (duct, beam, ...) — a duct can be a box or a round run, and the
//! clearance rules upstream only care about the classification. The
//! closed [`Shape`] union replaces the open string-tagged records of
//! earlier tooling.

use rodclash_math::{Point3, Tolerance, Vec3};

use crate::aabb::Aabb3;

/// A finite cylinder: a rod segment or round pipe run.
///
/// Degenerate when `p1 == p2`, in which case it behaves as a sphere of
/// the same radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    /// First endpoint of the centerline.
    pub p1: Point3,
    /// Second endpoint of the centerline.
    pub p2: Point3,
    /// Radius, must be non-negative.
    pub radius: f64,
}

impl Cylinder {
    /// Create a cylinder from two endpoints and a radius.
    pub fn new(p1: Point3, p2: Point3, radius: f64) -> Self {
        Self { p1, p2, radius }
    }

    /// Centerline vector `p2 - p1`.
    pub fn axis(&self) -> Vec3 {
        self.p2 - self.p1
    }

    /// Centerline length.
    pub fn length(&self) -> f64 {
        self.axis().norm()
    }

    /// Whether the centerline is shorter than the linear tolerance.
    pub fn is_degenerate(&self, tol: &Tolerance) -> bool {
        tol.is_zero(self.length())
    }

    /// Axis-aligned bounds: the endpoint box grown by the radius.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        aabb.include_point(&self.p1);
        aabb.include_point(&self.p2);
        aabb.expand(self.radius);
        aabb
    }
}

/// An oriented box: center, three orthonormal axes, and half extents.
///
/// Used for beams, headers and duct runs that are not axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Center of the box.
    pub center: Point3,
    /// Orthonormal local axes.
    pub axes: [Vec3; 3],
    /// Half extent along each local axis, all non-negative.
    pub half_extents: [f64; 3],
}

impl Obb {
    /// Create an oriented box.
    pub fn new(center: Point3, axes: [Vec3; 3], half_extents: [f64; 3]) -> Self {
        Self {
            center,
            axes,
            half_extents,
        }
    }

    /// Map a world-space point into the box's local frame.
    ///
    /// In the local frame the box is axis-aligned and centered at the
    /// origin with corners at `±half_extents`.
    pub fn to_local(&self, p: &Point3) -> Point3 {
        let d = p - self.center;
        Point3::new(
            d.dot(&self.axes[0]),
            d.dot(&self.axes[1]),
            d.dot(&self.axes[2]),
        )
    }

    /// Map a local-frame point back into world space.
    pub fn to_world(&self, p: &Point3) -> Point3 {
        self.center + self.axes[0] * p.x + self.axes[1] * p.y + self.axes[2] * p.z
    }

    /// The axis-aligned box of the oriented box in its own frame.
    pub fn local_aabb(&self) -> Aabb3 {
        let h = Point3::new(
            self.half_extents[0],
            self.half_extents[1],
            self.half_extents[2],
        );
        Aabb3::new(Point3::new(-h.x, -h.y, -h.z), h)
    }

    /// World-space axis-aligned bounds.
    ///
    /// Exact: the world extent along each axis is the sum of the projected
    /// half extents.
    pub fn aabb(&self) -> Aabb3 {
        let mut extent = Vec3::zeros();
        for i in 0..3 {
            extent += self.axes[i].abs() * self.half_extents[i];
        }
        Aabb3::new(self.center - extent, self.center + extent)
    }

    /// Whether the axes are unit length and mutually perpendicular
    /// within tolerance.
    pub fn axes_orthonormal(&self, tol: &Tolerance) -> bool {
        for i in 0..3 {
            if !tol.is_zero(self.axes[i].norm() - 1.0) {
                return false;
            }
        }
        tol.is_zero(self.axes[0].dot(&self.axes[1]))
            && tol.is_zero(self.axes[1].dot(&self.axes[2]))
            && tol.is_zero(self.axes[0].dot(&self.axes[2]))
    }
}

/// Closed union of element geometries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Finite cylinder (rods, pipes, conduits, sprinkler mains).
    Cylinder(Cylinder),
    /// Axis-aligned box (straight ducts, headers).
    Aabb(Aabb3),
    /// Oriented box (skewed duct and beam runs).
    Obb(Obb),
}

impl Shape {
    /// Axis-aligned bounds of the shape.
    pub fn aabb(&self) -> Aabb3 {
        match self {
            Shape::Cylinder(c) => c.aabb(),
            Shape::Aabb(b) => *b,
            Shape::Obb(o) => o.aabb(),
        }
    }

    /// Whether every coordinate and scalar in the shape is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Shape::Cylinder(c) => {
                c.p1.iter().all(|v| v.is_finite())
                    && c.p2.iter().all(|v| v.is_finite())
                    && c.radius.is_finite()
            }
            Shape::Aabb(b) => b.is_finite(),
            Shape::Obb(o) => {
                o.center.iter().all(|v| v.is_finite())
                    && o.axes.iter().all(|a| a.iter().all(|v| v.is_finite()))
                    && o.half_extents.iter().all(|v| v.is_finite())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rodclash_math::Point3;

    #[test]
    fn test_cylinder_aabb_includes_radius() {
        let c = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            0.5,
        );
        let aabb = c.aabb();
        assert_eq!(aabb.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(aabb.max, Point3::new(0.5, 0.5, 10.5));
    }

    #[test]
    fn test_degenerate_cylinder() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let c = Cylinder::new(p, p, 2.0);
        assert!(c.is_degenerate(&Tolerance::DEFAULT));
        let aabb = c.aabb();
        assert_eq!(aabb.min, Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(aabb.max, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_obb_local_world_round_trip() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let obb = Obb::new(
            Point3::new(10.0, 0.0, 0.0),
            [
                Vec3::new(s, s, 0.0),
                Vec3::new(-s, s, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            [2.0, 1.0, 3.0],
        );
        assert!(obb.axes_orthonormal(&Tolerance::DEFAULT));

        let p = Point3::new(11.0, 2.0, -1.5);
        let local = obb.to_local(&p);
        let back = obb.to_world(&local);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn test_obb_aabb_axis_aligned_case() {
        let obb = Obb::new(
            Point3::new(5.0, 5.0, 5.0),
            [Vec3::x(), Vec3::y(), Vec3::z()],
            [1.0, 2.0, 3.0],
        );
        let aabb = obb.aabb();
        assert_eq!(aabb.min, Point3::new(4.0, 3.0, 2.0));
        assert_eq!(aabb.max, Point3::new(6.0, 7.0, 8.0));
    }

    #[test]
    fn test_obb_rejects_skewed_axes() {
        let obb = Obb::new(
            Point3::origin(),
            [Vec3::x(), Vec3::new(1.0, 1.0, 0.0), Vec3::z()],
            [1.0, 1.0, 1.0],
        );
        assert!(!obb.axes_orthonormal(&Tolerance::DEFAULT));
    }

    #[test]
    fn test_shape_is_finite() {
        let good = Shape::Cylinder(Cylinder::new(
            Point3::origin(),
            Point3::new(0.0, 0.0, 1.0),
            0.5,
        ));
        assert!(good.is_finite());

        let bad = Shape::Cylinder(Cylinder::new(
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            0.5,
        ));
        assert!(!bad.is_finite());
    }
}
