//! Clash records and run summaries.

use serde::{Deserialize, Serialize};

use rodclash_rules::{ElementKind, RecommendationOption, Severity};

use crate::element::ElementId;

/// One graded finding between a rod and another element.
///
/// Records are plain data, serializable as-is into coordination reports.
/// All distances are in inches; `penetration` is signed (positive means
/// the surfaces overlap) and `actual_clearance` is its negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashRecord {
    /// The rod that drove the check.
    pub rod_id: ElementId,
    /// The element it was checked against.
    pub other_id: ElementId,
    /// Kind of the driving rod (always a rod; kept for report symmetry).
    pub rod_kind: ElementKind,
    /// Kind of the other element.
    pub other_kind: ElementKind,
    /// Severity grade.
    pub severity: Severity,
    /// Signed penetration depth.
    pub penetration: f64,
    /// Clearance the pair was required to keep.
    pub required_clearance: f64,
    /// Clearance the pair actually has (negative when overlapping).
    pub actual_clearance: f64,
    /// Representative contact point, present only for hard interference.
    pub point: Option<[f64; 3]>,
    /// Building level of the rod, when the model carries levels.
    pub level: Option<i32>,
    /// One-line human-readable description.
    pub summary: String,
    /// Ordered mitigation options.
    pub recommendations: Vec<RecommendationOption>,
}

/// Per-severity counts for a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClashSummary {
    /// Hard interference count.
    pub critical: usize,
    /// Major clearance violation count.
    pub major: usize,
    /// Minor clearance violation count.
    pub minor: usize,
    /// Informational warning count.
    pub warning: usize,
}

impl ClashSummary {
    /// Tally a record set.
    pub fn from_records(records: &[ClashRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Major => summary.major += 1,
                Severity::Minor => summary.minor += 1,
                Severity::Warning => summary.warning += 1,
            }
        }
        summary
    }

    /// Total number of records, warnings included.
    pub fn total(&self) -> usize {
        self.critical + self.major + self.minor + self.warning
    }
}
