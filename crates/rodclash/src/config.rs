//! Detection run configuration.

use serde::{Deserialize, Serialize};

use rodclash_geom::SamplingPolicy;
use rodclash_rules::{ClearanceTable, ConfigError, SeverityPolicy};

/// Everything a detection run can be tuned with.
///
/// The whole struct deserializes from a project config file with every
/// field optional; absent fields take the documented defaults. Call
/// [`DetectConfig::validate`] before use — the engine does so on build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Required clearance per element kind.
    pub clearances: ClearanceTable,
    /// Severity grading thresholds.
    pub policy: SeverityPolicy,
    /// Axis sampling resolution for cylinder-box tests.
    pub sampling: SamplingPolicy,
    /// Also check rod-rod pairs. Off by default: rod layouts come from a
    /// single sizing pass and do not self-intersect.
    pub include_rod_pairs: bool,
    /// Optional ceiling on the number of input elements. Exceeding it
    /// fails the whole run rather than silently truncating the model.
    pub max_elements: Option<usize>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            clearances: ClearanceTable::default(),
            policy: SeverityPolicy::default(),
            sampling: SamplingPolicy::default(),
            include_rod_pairs: false,
            max_elements: None,
        }
    }
}

impl DetectConfig {
    /// Validate every tunable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clearances.validate()?;
        self.policy.validate()?;
        if self.sampling.min_samples == 0 {
            return Err(ConfigError::InvalidPolicy(
                "sampling min_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
