//! Required-clearance table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::ElementKind;

/// Configuration validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A clearance, multiplier or threshold is out of range.
    #[error("invalid clearance config: {0}")]
    InvalidClearance(String),
    /// A severity policy threshold is out of range.
    #[error("invalid severity policy: {0}")]
    InvalidPolicy(String),
}

/// Minimum required separation between a rod and each element kind,
/// in inches.
///
/// Defaults follow common coordination practice; projects override them
/// by deserializing a table from their own config file. The global
/// `multiplier` scales every entry, which is how a project-wide safety
/// factor is applied without rewriting the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearanceTable {
    /// HVAC duct clearance.
    pub duct: f64,
    /// Plumbing pipe clearance.
    pub pipe: f64,
    /// Electrical conduit clearance.
    pub conduit: f64,
    /// Structural beam clearance.
    pub beam: f64,
    /// Fire sprinkler clearance.
    pub sprinkler: f64,
    /// Cable tray clearance.
    pub cable_tray: f64,
    /// Fallback for unclassified elements (and rods, when rod-rod
    /// checking is enabled).
    pub other: f64,
    /// Global multiplier applied to every entry.
    pub multiplier: f64,
}

impl Default for ClearanceTable {
    fn default() -> Self {
        Self {
            duct: 2.0,
            pipe: 1.5,
            conduit: 1.0,
            beam: 0.5,
            sprinkler: 2.0,
            cable_tray: 1.5,
            other: 1.0,
            multiplier: 1.0,
        }
    }
}

impl ClearanceTable {
    /// Required clearance for an element kind, multiplier applied.
    pub fn required_for(&self, kind: ElementKind) -> f64 {
        let base = match kind {
            ElementKind::Duct => self.duct,
            ElementKind::Pipe => self.pipe,
            ElementKind::Conduit => self.conduit,
            ElementKind::Beam => self.beam,
            ElementKind::Sprinkler => self.sprinkler,
            ElementKind::CableTray => self.cable_tray,
            ElementKind::Rod | ElementKind::Other => self.other,
        };
        base * self.multiplier
    }

    /// Largest clearance in the table, multiplier applied.
    ///
    /// Used to pad broad-phase query boxes so no clearance-qualifying
    /// candidate is filtered out before the narrow phase sees it.
    pub fn max_required(&self) -> f64 {
        [
            self.duct,
            self.pipe,
            self.conduit,
            self.beam,
            self.sprinkler,
            self.cable_tray,
            self.other,
        ]
        .into_iter()
        .fold(0.0_f64, f64::max)
            * self.multiplier
    }

    /// Validate the table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            ("duct", self.duct),
            ("pipe", self.pipe),
            ("conduit", self.conduit),
            ("beam", self.beam),
            ("sprinkler", self.sprinkler),
            ("cable_tray", self.cable_tray),
            ("other", self.other),
        ];
        for (name, value) in entries {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidClearance(format!(
                    "{name} must be a non-negative finite value, got {value}"
                )));
            }
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ConfigError::InvalidClearance(format!(
                "multiplier must be positive, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}
