#![warn(missing_docs)]

//! Math types for the rodclash clash detection engine.
//!
//! Thin wrappers around nalgebra providing the shared scalar and vector
//! types for 3D building geometry: points, vectors, directions, and
//! tolerance constants. All coordinates are in inches, in a single
//! project-wide frame supplied by the geometry provider.

use nalgebra::{Unit, Vector3};

/// A point in 3D space (inches).
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space (inches).
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in inches.
    pub linear: f64,
    /// Tolerance for near-zero determinants and dot products.
    pub parallel: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 in linear, 1e-10 parallel determinant).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        parallel: 1e-10,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if a determinant or dot product indicates parallel lines.
    pub fn is_parallel(&self, det: f64) -> bool {
        det.abs() < self.parallel
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
