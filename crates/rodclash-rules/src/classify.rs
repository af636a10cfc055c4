//! Severity grading of narrow-phase results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clearance::ConfigError;

/// Clash severity grades, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Hard interference: the surfaces physically overlap.
    Critical,
    /// Clearance shortfall greater than the major-shortfall fraction of
    /// the requirement.
    Major,
    /// Any other clearance shortfall.
    Minor,
    /// Clearance met but within the warning margin above the
    /// requirement. Informational, not a hard clash.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Warning => "WARNING",
        };
        f.write_str(name)
    }
}

/// Grading thresholds.
///
/// These are policy, not physics: the defaults reproduce the table the
/// engine has always shipped with, and projects adjust them per their
/// coordination standards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    /// A shortfall of at least this fraction of the required clearance
    /// grades as Major instead of Minor.
    pub major_shortfall_fraction: f64,
    /// Pairs whose actual clearance is within this fraction *above* the
    /// requirement grade as Warning.
    pub warning_margin_fraction: f64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            major_shortfall_fraction: 0.5,
            warning_margin_fraction: 0.10,
        }
    }
}

impl SeverityPolicy {
    /// Validate the thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.major_shortfall_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.major_shortfall_fraction)
        {
            return Err(ConfigError::InvalidPolicy(format!(
                "major_shortfall_fraction must be in [0, 1], got {}",
                self.major_shortfall_fraction
            )));
        }
        if !self.warning_margin_fraction.is_finite() || self.warning_margin_fraction < 0.0 {
            return Err(ConfigError::InvalidPolicy(format!(
                "warning_margin_fraction must be non-negative, got {}",
                self.warning_margin_fraction
            )));
        }
        Ok(())
    }
}

/// A graded pair: severity plus the reviewable one-line summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Grade of the pair.
    pub severity: Severity,
    /// Human-readable description of the finding, in inches.
    pub summary: String,
}

/// Grade a narrow-phase result against a required clearance.
///
/// `penetration` is signed (positive = overlap, negative = clearance
/// margin); `required` is the clearance for the other element's kind.
/// Returns `None` when the pair is clear by more than the warning
/// margin — no record is emitted for it.
///
/// Pure function of its arguments: grading a pair does not depend on any
/// other pair, which is what makes the parallel detection pass
/// order-independent.
pub fn classify(penetration: f64, required: f64, policy: &SeverityPolicy) -> Option<Classification> {
    if penetration > 0.0 {
        return Some(Classification {
            severity: Severity::Critical,
            summary: format!("hard interference: {penetration:.2}\" overlap"),
        });
    }

    let actual = -penetration;

    if actual < required {
        let shortfall = required - actual;
        let severity = if shortfall >= required * policy.major_shortfall_fraction {
            Severity::Major
        } else {
            Severity::Minor
        };
        return Some(Classification {
            severity,
            summary: format!(
                "clearance violation: {actual:.2}\" actual vs {required:.2}\" required"
            ),
        });
    }

    if actual <= required * (1.0 + policy.warning_margin_fraction) {
        return Some(Classification {
            severity: Severity::Warning,
            summary: format!("near clearance limit: {actual:.2}\" (min {required:.2}\")"),
        });
    }

    None
}
