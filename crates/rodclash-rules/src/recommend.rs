//! Resolution recommendation generator.
//!
//! A deterministic lookup from `(severity, element kind)` to an ordered
//! list of mitigation options. No geometry and no severity derivation
//! here — this layer only formats advice for the classifier's verdict.

use serde::{Deserialize, Serialize};

use crate::classify::Severity;
use crate::kind::{trade_for, ElementKind, Trade};

/// How hard a mitigation is to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feasibility {
    /// Field-resolvable without redesign.
    Easy,
    /// Requires re-routing or re-detailing by the responsible trade.
    Moderate,
    /// Requires external re-engineering before it can proceed.
    Difficult,
}

/// Rough cost impact of a mitigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostImpact {
    /// No expected cost.
    None,
    /// Minor rework.
    Low,
    /// Moderate rework or schedule impact.
    Medium,
    /// Major rework, re-engineering or resubmittal.
    High,
}

/// One advisory mitigation option attached to a clash record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOption {
    /// Stable identifier for downstream report templates.
    pub option_id: String,
    /// Human-readable instruction.
    pub description: String,
    /// How hard the option is.
    pub feasibility: Feasibility,
    /// Trade responsible for carrying it out.
    pub responsible_trade: Trade,
    /// Rough cost impact.
    pub cost_impact: CostImpact,
}

/// Ordered mitigation options for a graded clash.
///
/// Critical clashes always offer relocating the other element first and
/// relocating the rod run second; the rod option is Difficult and owned
/// by the structural trade because moving a rod re-opens the load-path
/// and rod-sizing calculations, which live outside this engine. Minor
/// findings get a field-verification note; warnings are informational
/// and carry no advice.
pub fn recommend(severity: Severity, other_kind: ElementKind) -> Vec<RecommendationOption> {
    let trade = trade_for(other_kind);

    match severity {
        Severity::Critical => vec![
            RecommendationOption {
                option_id: "RELOCATE_ELEMENT".to_string(),
                description: format!("relocate the {other_kind} to clear the rod path"),
                feasibility: Feasibility::Moderate,
                responsible_trade: trade,
                cost_impact: CostImpact::Medium,
            },
            RecommendationOption {
                option_id: "RELOCATE_ROD".to_string(),
                description: format!(
                    "relocate the rod run if the {other_kind} is fixed; requires \
                     structural review and re-run of rod sizing"
                ),
                feasibility: Feasibility::Difficult,
                responsible_trade: Trade::Structural,
                cost_impact: CostImpact::High,
            },
        ],
        Severity::Major => vec![RecommendationOption {
            option_id: "ADJUST_ROUTING".to_string(),
            description: format!("adjust the {other_kind} routing to restore clearance"),
            feasibility: Feasibility::Moderate,
            responsible_trade: trade,
            cost_impact: CostImpact::Low,
        }],
        Severity::Minor => vec![RecommendationOption {
            option_id: "VERIFY_FIELD".to_string(),
            description: "confirm the reduced clearance is acceptable in the field".to_string(),
            feasibility: Feasibility::Easy,
            responsible_trade: Trade::Coordination,
            cost_impact: CostImpact::None,
        }],
        Severity::Warning => Vec::new(),
    }
}
