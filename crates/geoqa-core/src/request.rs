//! The request the stage orchestrator hands to the engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::InclusionMode;

/// Default name of the status field.
pub const DEFAULT_STATUS_FIELD: &str = "QAStatus";

/// Per-check toggles. Every check is independent; any subset may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckToggles {
    /// Compare canonical field types.
    pub check_types: bool,
    /// Compare field lengths when both sides declare one.
    pub check_lengths: bool,
    /// Run the identifier uniqueness checker.
    pub identifier: bool,
    /// Validate identifier format (8-4-4-4-12 hex groups).
    pub identifier_format: bool,
    /// Upper-case identifiers before comparing them.
    pub normalize_identifier: bool,
    /// Count nulls per mandatory field.
    pub mandatory_nulls: bool,
    /// Collect records failing one or more mandatory fields.
    pub null_failures: bool,
    /// Group records by the secondary business field.
    pub secondary_duplicates: bool,
}

impl Default for CheckToggles {
    fn default() -> Self {
        Self {
            check_types: true,
            check_lengths: true,
            identifier: true,
            identifier_format: true,
            normalize_identifier: true,
            mandatory_nulls: true,
            null_failures: true,
            secondary_duplicates: true,
        }
    }
}

/// One engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QaRequest {
    /// Qualified target identifier, e.g. `data/ng911.db/SiteStructureAddressPoint`.
    pub target: String,
    /// Path of the schema document.
    pub schema_path: String,
    /// Dataset to validate against; the first candidate dataset when absent.
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub mode: InclusionMode,
    #[serde(default)]
    pub checks: CheckToggles,
    /// Fields whose emptiness is a blocking error.
    #[serde(default)]
    pub mandatory_fields: Vec<String>,
    /// Business field whose duplication is reported as a warning.
    #[serde(default)]
    pub secondary_duplicate_field: Option<String>,
    #[serde(default = "default_status_field")]
    pub status_field: String,
    /// Write synthesized statuses back to the store.
    #[serde(default)]
    pub apply_updates: bool,
    /// Cap on collected null-failure rows; the configured cap when absent.
    #[serde(default)]
    pub max_failure_rows: Option<usize>,
}

fn default_status_field() -> String {
    DEFAULT_STATUS_FIELD.to_string()
}

impl QaRequest {
    /// A request with default toggles and no mandatory fields.
    #[must_use]
    pub fn new(target: impl Into<String>, schema_path: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            schema_path: schema_path.into(),
            dataset_name: None,
            mode: InclusionMode::All,
            checks: CheckToggles::default(),
            mandatory_fields: Vec::new(),
            secondary_duplicate_field: None,
            status_field: default_status_field(),
            apply_updates: false,
            max_failure_rows: None,
        }
    }

    /// Split a semicolon-delimited field list, dropping blanks.
    #[must_use]
    pub fn parse_field_list(raw: &str) -> Vec<String> {
        raw.split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_with_defaults() {
        let req: QaRequest = serde_json::from_str(
            r#"{"target": "a.db/points", "schemaPath": "schema.json", "mode": "required-only"}"#,
        )
        .unwrap();
        assert_eq!(req.status_field, "QAStatus");
        assert_eq!(req.mode, InclusionMode::RequiredOnly);
        assert!(req.checks.identifier_format);
        assert!(!req.apply_updates);
    }

    #[test]
    fn parses_semicolon_field_list() {
        assert_eq!(
            QaRequest::parse_field_list(" NGUID; ;AddNum_Pre;Agency ;"),
            vec!["NGUID", "AddNum_Pre", "Agency"]
        );
        assert!(QaRequest::parse_field_list("").is_empty());
    }
}
