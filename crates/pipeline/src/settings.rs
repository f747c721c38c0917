//! Tunable behaviour of the stages.
//!
//! Settings are plain data; the CLI fills them from its TOML configuration and
//! calls [`PipelineSettings::validate`] before any stage runs.

use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// How places are matched to CBSAs in the spatial join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPredicate {
    /// The place polygon intersects the CBSA polygon (touching counts).
    #[default]
    Intersects,
    /// The place centroid, computed in Web Mercator, lies inside the CBSA.
    ///
    /// Misses places whose centroid falls in water outside the CBSA outline.
    Centroid,
}

/// Settings shared by all stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Minimum number of distinct state codes the crosswalk must cover.
    pub expected_state_count: usize,
    /// Spatial predicate for the place → CBSA join.
    pub join_predicate: JoinPredicate,
    /// Text removed from every CBSA name in the map output (e.g. `", CA"`
    /// for a single-state map).
    pub strip_cbsa_suffix: Option<String>,
    /// Attach a `home_inc_color` property to map features.
    pub include_category_color: bool,
}

impl PipelineSettings {
    /// 50 states, the District of Columbia, and Puerto Rico.
    pub const NATIONAL_STATE_COUNT: usize = 52;

    /// Rejects settings no stage can run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.expected_state_count == 0 {
            return Err(PipelineError::ConfigurationError {
                message: "expected_state_count must be at least 1".into(),
            });
        }
        if self.expected_state_count > 99 {
            return Err(PipelineError::ConfigurationError {
                message: format!(
                    "expected_state_count {} exceeds the number of two-digit state codes",
                    self.expected_state_count
                ),
            });
        }
        if matches!(&self.strip_cbsa_suffix, Some(s) if s.is_empty()) {
            return Err(PipelineError::ConfigurationError {
                message: "strip_cbsa_suffix must not be empty; omit it instead".into(),
            });
        }
        Ok(())
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            expected_state_count: Self::NATIONAL_STATE_COUNT,
            join_predicate: JoinPredicate::default(),
            strip_cbsa_suffix: None,
            include_category_color: false,
        }
    }
}
