#![warn(missing_docs)]

//! Clash detection for threaded hanger rods in coordinated building
//! models.
//!
//! Rods drop from structure through a ceiling space crowded with ducts,
//! pipes, conduit, beams and sprinkler mains. This crate finds every
//! rod that interferes with, or runs too close to, another element:
//! a broad phase over a bounding-volume tree produces candidate pairs,
//! exact and sampled narrow-phase tests measure signed penetration, and
//! a policy layer grades each finding and attaches mitigation options.
//! All distances are in inches.
//!
//! Results are deterministic: the same model and configuration
//! reproduce the same records in the same order, independent of thread
//! count.
//!
//! ```
//! use rodclash::{
//!     run_detection, Aabb3, Cylinder, DetectConfig, Element, ElementKind, Point3, Severity,
//!     Shape,
//! };
//!
//! let rod = Element::new(
//!     "rod-1",
//!     ElementKind::Rod,
//!     Shape::Cylinder(Cylinder::new(
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(0.0, 0.0, 120.0),
//!         0.4375,
//!     )),
//! );
//! let duct = Element::new(
//!     "duct-1",
//!     ElementKind::Duct,
//!     Shape::Aabb(Aabb3::new(
//!         Point3::new(-12.0, 0.6, 40.0),
//!         Point3::new(12.0, 18.0, 52.0),
//!     )),
//! );
//!
//! let outcome = run_detection(vec![rod, duct], DetectConfig::default()).unwrap();
//! assert_eq!(outcome.clashes.len(), 1);
//! assert_eq!(outcome.clashes[0].severity, Severity::Major);
//! ```

mod config;
mod detect;
mod element;
mod error;
mod record;

pub use config::DetectConfig;
pub use detect::{ClashDetector, DetectionOutcome, RejectedElement};
pub use element::{Element, ElementId};
pub use error::{ElementError, EngineError};
pub use record::{ClashRecord, ClashSummary};

pub use rodclash_geom::{Aabb3, Cylinder, Obb, SamplingPolicy, Separation, Shape};
pub use rodclash_math::{Point3, Tolerance, Vec3};
pub use rodclash_rules::{
    ClearanceTable, ConfigError, CostImpact, ElementKind, Feasibility, RecommendationOption,
    Severity, SeverityPolicy, Trade,
};

/// Build a detector, run a full detection pass and tally the results.
///
/// One-shot convenience over [`ClashDetector`]; use the detector
/// directly to reuse the index across level-scoped passes.
pub fn run_detection(
    elements: Vec<Element>,
    config: DetectConfig,
) -> Result<DetectionOutcome, EngineError> {
    let detector = ClashDetector::build(elements, config)?;
    let clashes = detector.detect();
    let summary = ClashSummary::from_records(&clashes);
    Ok(DetectionOutcome {
        rejected: detector.rejected().to_vec(),
        clashes,
        summary,
    })
}
