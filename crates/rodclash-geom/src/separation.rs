//! Narrow-phase separation tests.
//!
//! Every test reports a [`Separation`] with signed penetration:
//! `penetration = contact_radius - distance`, positive when the surfaces
//! overlap, negative when they are clear by that margin. Parallel,
//! coincident and zero-length configurations are valid inputs, not
//! errors.

use rodclash_math::{Point3, Tolerance};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb3;
use crate::shapes::{Cylinder, Obb, Shape};

/// Result of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Signed depth: positive = overlap, negative = clearance margin.
    pub penetration: f64,
    /// Representative contact point (midpoint of the closest pair, or the
    /// nearest box-surface point for box tests).
    pub point: Point3,
}

/// Sampling resolution for the cylinder-box test.
///
/// The axis is sampled at `max(min_samples, ceil(length / radius))`
/// intervals, so the worst-case undetected protrusion is bounded by one
/// radius of axis length per interval. Raising `min_samples` tightens the
/// bound for short, fat cylinders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Lower bound on the number of axis intervals.
    pub min_samples: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self { min_samples: 10 }
    }
}

impl SamplingPolicy {
    /// Number of axis intervals for a cylinder of the given dimensions.
    pub fn intervals(&self, length: f64, radius: f64) -> usize {
        let by_shape = if radius > 0.0 {
            (length / radius).ceil() as usize
        } else {
            0
        };
        by_shape.max(self.min_samples)
    }
}

/// Closest point on the finite segment `(p1, p2)` to a query point.
///
/// Returns the closest point and the clamped parameter `t` in `[0, 1]`.
/// A zero-length segment reduces to point-to-point distance.
pub fn closest_point_on_segment(q: &Point3, p1: &Point3, p2: &Point3) -> (Point3, f64) {
    let v = p2 - p1;
    let vv = v.dot(&v);
    if vv == 0.0 {
        return (*p1, 0.0);
    }
    let t = ((q - p1).dot(&v) / vv).clamp(0.0, 1.0);
    (p1 + v * t, t)
}

/// Closest points between two finite segments `(a1, a2)` and `(b1, b2)`.
///
/// Solves the standard 2x2 system for the infinite lines, falls back to a
/// direct projection when the lines are parallel (near-zero determinant),
/// clamps both parameters to the segments, then reprojects each clamped
/// point onto the other segment. The reprojection pass makes the clamped
/// skew case exact: if the unclamped optimum was interior it is a no-op,
/// otherwise it recovers the true boundary minimum.
pub fn segment_closest_points(
    a1: &Point3,
    a2: &Point3,
    b1: &Point3,
    b2: &Point3,
) -> (Point3, Point3) {
    let tol = Tolerance::DEFAULT;
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let len1 = d1.norm();
    let len2 = d2.norm();

    // Degenerate segments reduce to point-segment or point-point cases.
    if tol.is_zero(len1) && tol.is_zero(len2) {
        return (*a1, *b1);
    }
    if tol.is_zero(len1) {
        let (q, _) = closest_point_on_segment(a1, b1, b2);
        return (*a1, q);
    }
    if tol.is_zero(len2) {
        let (p, _) = closest_point_on_segment(b1, a1, a2);
        return (p, *b1);
    }

    let u1 = d1 / len1;
    let u2 = d2 / len2;
    let w = a1 - b1;

    // Line parameters of closest approach: with unit directions the
    // system is s - (u1.u2) t = -u1.w, (u1.u2) s - t = -u2.w.
    let b = u1.dot(&u2);
    let d = u1.dot(&w);
    let e = u2.dot(&w);
    let denom = 1.0 - b * b;

    let (mut s, mut t) = if tol.is_parallel(denom) {
        // Parallel lines: fix s = 0 and project a1 onto the other line.
        (0.0, e)
    } else {
        ((b * e - d) / denom, (e - b * d) / denom)
    };

    s = s.clamp(0.0, len1);
    t = t.clamp(0.0, len2);

    // Reproject after clamping.
    t = u2.dot(&(a1 + u1 * s - b1)).clamp(0.0, len2);
    s = u1.dot(&(b1 + u2 * t - a1)).clamp(0.0, len1);

    (a1 + u1 * s, b1 + u2 * t)
}

/// Cylinder-cylinder separation.
///
/// Exact for skew, parallel, coincident and zero-length centerlines.
/// `penetration = r_a + r_b - distance` between the closest centerline
/// points; the contact point is the midpoint of the closest pair.
pub fn cylinder_cylinder(a: &Cylinder, b: &Cylinder) -> Separation {
    let (pa, pb) = segment_closest_points(&a.p1, &a.p2, &b.p1, &b.p2);
    let distance = (pa - pb).norm();
    Separation {
        penetration: a.radius + b.radius - distance,
        point: Point3::from((pa.coords + pb.coords) / 2.0),
    }
}

/// Cylinder vs axis-aligned box separation.
///
/// Samples the centerline per `sampling` and clamps each sample into the
/// box; `penetration = radius - min distance`. A documented approximation:
/// the undetected-protrusion bound is one radius of axis length per
/// sample interval. A degenerate cylinder is tested as a single point.
pub fn cylinder_aabb(cyl: &Cylinder, aabb: &Aabb3, sampling: &SamplingPolicy) -> Separation {
    let axis = cyl.axis();
    let length = axis.norm();

    if Tolerance::DEFAULT.is_zero(length) {
        let nearest = aabb.clamp_point(&cyl.p1);
        return Separation {
            penetration: cyl.radius - (cyl.p1 - nearest).norm(),
            point: nearest,
        };
    }

    let intervals = sampling.intervals(length, cyl.radius);
    let mut best_dist = f64::INFINITY;
    let mut best_point = cyl.p1;

    for i in 0..=intervals {
        let t = i as f64 / intervals as f64;
        let p = cyl.p1 + axis * t;
        let nearest = aabb.clamp_point(&p);
        let dist = (p - nearest).norm();
        if dist < best_dist {
            best_dist = dist;
            best_point = nearest;
        }
    }

    Separation {
        penetration: cyl.radius - best_dist,
        point: best_point,
    }
}

/// Cylinder vs oriented box separation.
///
/// Transforms the centerline into the box's orthonormal local frame and
/// runs the axis-aligned test there; the contact point is mapped back to
/// world space.
pub fn cylinder_obb(cyl: &Cylinder, obb: &Obb, sampling: &SamplingPolicy) -> Separation {
    let local = Cylinder::new(obb.to_local(&cyl.p1), obb.to_local(&cyl.p2), cyl.radius);
    let sep = cylinder_aabb(&local, &obb.local_aabb(), sampling);
    Separation {
        penetration: sep.penetration,
        point: obb.to_world(&sep.point),
    }
}

/// Dispatch a rod cylinder against any element shape.
pub fn cylinder_shape(cyl: &Cylinder, shape: &Shape, sampling: &SamplingPolicy) -> Separation {
    match shape {
        Shape::Cylinder(other) => cylinder_cylinder(cyl, other),
        Shape::Aabb(aabb) => cylinder_aabb(cyl, aabb, sampling),
        Shape::Obb(obb) => cylinder_obb(cyl, obb, sampling),
    }
}
