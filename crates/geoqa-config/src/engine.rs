//! QA engine tuning: scope window, sample caps, and field-name conventions.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_lookback_hours() -> u32 {
    24
}

const fn default_sample_limit() -> usize {
    5
}

const fn default_example_cap() -> usize {
    50
}

const fn default_null_failure_cap() -> usize {
    5000
}

const fn default_error_sample_cap() -> usize {
    20
}

const fn default_true() -> bool {
    true
}

fn default_non_blocking_fields() -> Vec<String> {
    vec!["shape".into()]
}

fn default_created_date_candidates() -> Vec<String> {
    vec!["created_date".into(), "createdate".into()]
}

fn default_identifier_field() -> String {
    "NGUID".into()
}

fn default_group_field() -> String {
    "Agency".into()
}

fn default_dataset_type() -> String {
    "esriDTFeatureClass".into()
}

fn default_workspace_markers() -> Vec<String> {
    vec![
        ".sde".into(),
        ".gdb".into(),
        ".geodatabase".into(),
        ".sqlite".into(),
        ".db".into(),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Records created within this many hours are always in scope.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,

    /// Representative samples kept per section (null failures, duplicate groups).
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Identifier duplicate examples kept in the report.
    #[serde(default = "default_example_cap")]
    pub duplicate_example_cap: usize,

    /// Invalid-format identifier examples kept in the report.
    #[serde(default = "default_example_cap")]
    pub invalid_example_cap: usize,

    /// Cap on collected null-failure rows (and run-log CSV rows).
    #[serde(default = "default_null_failure_cap")]
    pub null_failure_cap: usize,

    /// Per-record write error samples kept in the status update section.
    #[serde(default = "default_error_sample_cap")]
    pub error_sample_cap: usize,

    /// Distinct raw status values kept in the scope diagnostics.
    #[serde(default = "default_example_cap")]
    pub status_frequency_cap: usize,

    /// Fields whose absence is a warning rather than a QA failure.
    #[serde(default = "default_non_blocking_fields")]
    pub non_blocking_fields: Vec<String>,

    /// Candidate names of the creation-timestamp field, in priority order.
    #[serde(default = "default_created_date_candidates")]
    pub created_date_candidates: Vec<String>,

    /// Primary uniqueness key of the dataset.
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,

    /// Attribute the issue summary is grouped by.
    #[serde(default = "default_group_field")]
    pub group_field: String,

    /// Schema datasets considered as targets. Empty accepts every dataset.
    #[serde(default = "default_dataset_type")]
    pub dataset_type: String,

    /// Path suffixes that mark the enclosing workspace of a target.
    #[serde(default = "default_workspace_markers")]
    pub workspace_markers: Vec<String>,

    /// Narrow each run to not-passed and recently created records.
    #[serde(default = "default_true")]
    pub scope_enabled: bool,

    /// Leave records whose stored status already matches untouched.
    #[serde(default = "default_true")]
    pub skip_unchanged: bool,

    /// Directory for JSON/CSV run logs. Empty disables run logs.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            sample_limit: default_sample_limit(),
            duplicate_example_cap: default_example_cap(),
            invalid_example_cap: default_example_cap(),
            null_failure_cap: default_null_failure_cap(),
            error_sample_cap: default_error_sample_cap(),
            status_frequency_cap: default_example_cap(),
            non_blocking_fields: default_non_blocking_fields(),
            created_date_candidates: default_created_date_candidates(),
            identifier_field: default_identifier_field(),
            group_field: default_group_field(),
            dataset_type: default_dataset_type(),
            workspace_markers: default_workspace_markers(),
            scope_enabled: true,
            skip_unchanged: true,
            log_dir: String::new(),
        }
    }
}

impl EngineConfig {
    /// Whether a missing field is designated non-blocking.
    #[must_use]
    pub fn is_non_blocking(&self, field: &str) -> bool {
        self.non_blocking_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(field))
    }

    /// Returns `true` if run logs should be written.
    #[must_use]
    pub fn writes_run_logs(&self) -> bool {
        !self.log_dir.is_empty()
    }

    /// Reject settings that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero lookback window, a zero
    /// cap, or a blank identifier field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_hours == 0 {
            return Err(invalid("engine.lookback_hours", "must be at least 1"));
        }
        for (field, value) in [
            ("engine.duplicate_example_cap", self.duplicate_example_cap),
            ("engine.invalid_example_cap", self.invalid_example_cap),
            ("engine.null_failure_cap", self.null_failure_cap),
            ("engine.error_sample_cap", self.error_sample_cap),
            ("engine.status_frequency_cap", self.status_frequency_cap),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
        }
        if self.identifier_field.trim().is_empty() {
            return Err(invalid("engine.identifier_field", "must not be blank"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = EngineConfig::default();
        assert_eq!(config.lookback_hours, 24);
        assert_eq!(config.sample_limit, 5);
        assert_eq!(config.duplicate_example_cap, 50);
        assert_eq!(config.null_failure_cap, 5000);
        assert_eq!(config.error_sample_cap, 20);
        assert!(config.scope_enabled);
        assert!(!config.writes_run_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shape_is_non_blocking_in_any_case() {
        let config = EngineConfig::default();
        assert!(config.is_non_blocking("SHAPE"));
        assert!(!config.is_non_blocking("NGUID"));
    }

    #[test]
    fn zero_cap_is_rejected() {
        let config = EngineConfig {
            null_failure_cap: 0,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine.null_failure_cap"));
    }
}
