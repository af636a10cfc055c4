//! Engine and per-element error types.

use thiserror::Error;

use rodclash_rules::ConfigError;

/// Why a single element was rejected during model intake.
///
/// Rejection is per-element: one bad element never aborts the run, it is
/// reported alongside the clash results instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    /// A coordinate, radius or extent is NaN or infinite.
    #[error("geometry contains a non-finite value")]
    NonFinite,
    /// Cylinder radius below zero.
    #[error("negative radius: {0}")]
    NegativeRadius(f64),
    /// Axis-aligned box with min above max on some axis.
    #[error("bounding box corners are inverted")]
    InvertedBounds,
    /// Oriented box whose axes are not unit length and perpendicular.
    #[error("oriented box axes are not orthonormal")]
    NonOrthonormalAxes,
    /// Oriented box half extent below zero.
    #[error("negative half extent: {0}")]
    NegativeHalfExtent(f64),
    /// A rod element must carry cylinder geometry.
    #[error("rod element is not a cylinder")]
    RodNotCylinder,
    /// Per-element clearance override is NaN, infinite or negative.
    #[error("invalid clearance override: {0}")]
    InvalidClearanceOverride(f64),
    /// Another element with the same id was already accepted.
    #[error("duplicate element id")]
    DuplicateId,
}

/// A run-level failure: nothing was detected.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input exceeds the configured element ceiling.
    #[error("model has {requested} elements, configured limit is {limit}")]
    Capacity {
        /// Number of elements submitted.
        requested: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// The detection configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
