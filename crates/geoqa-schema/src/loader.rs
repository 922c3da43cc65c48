//! Schema Loader: expected field definitions for one dataset.
//!
//! Pure functions over a schema document; no state is kept between calls.

use std::collections::BTreeMap;
use std::path::Path;

use geoqa_core::enums::InclusionMode;
use geoqa_core::field::{FieldDefinition, FieldType};
use schemars::schema_for;

use crate::document::{DatasetDef, SchemaDocument};
use crate::error::SchemaError;

/// Expected fields of one dataset, keyed by lowercase field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFields {
    /// Dataset name as spelled in the document.
    pub dataset_name: String,
    pub fields: BTreeMap<String, FieldDefinition>,
}

impl ExpectedFields {
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(&name.to_lowercase())
    }
}

/// Which dataset to pick from a document and how to filter its fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions<'a> {
    /// Dataset name (case-insensitive). `None` or blank picks the first candidate.
    pub dataset_name: Option<&'a str>,
    pub mode: InclusionMode,
    /// Only datasets with this `datasetType` are candidates. `None` or blank
    /// accepts every dataset.
    pub dataset_type: Option<&'a str>,
}

/// Read and parse a schema document from disk.
///
/// # Errors
///
/// Returns `SchemaError::Io` if the file cannot be read, plus every error of
/// [`parse_expected_fields`].
pub fn load_expected_fields(
    path: &Path,
    options: LoadOptions<'_>,
) -> Result<ExpectedFields, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_expected_fields(&text, options)
}

/// Parse a schema document held in memory.
///
/// # Errors
///
/// Returns `SchemaError::Parse` for invalid JSON, `SchemaError::Invalid` when
/// the JSON is not shaped like a schema document, `SchemaError::NoDatasets`
/// when no candidate dataset exists, and `SchemaError::DatasetNotFound` when
/// the named dataset is absent.
pub fn parse_expected_fields(
    text: &str,
    options: LoadOptions<'_>,
) -> Result<ExpectedFields, SchemaError> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    validate_document(&raw)?;
    let document: SchemaDocument = serde_json::from_value(raw)?;

    let dataset = select_dataset(&document, options)?;
    let fields = dataset
        .fields
        .field_array
        .iter()
        .filter_map(|field| {
            let name = field.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
            let required = field.required.unwrap_or(false);
            let nullable = field.is_nullable.unwrap_or(true);
            if !options.mode.includes(required, nullable) {
                return None;
            }
            let definition = FieldDefinition {
                name: name.to_string(),
                field_type: FieldType::normalize(field.field_type.as_deref().unwrap_or_default()),
                length: field.length,
                required,
                nullable,
            };
            Some((definition.key(), definition))
        })
        .collect();

    Ok(ExpectedFields {
        dataset_name: dataset.name.clone(),
        fields,
    })
}

fn validate_document(raw: &serde_json::Value) -> Result<(), SchemaError> {
    let schema = serde_json::to_value(schema_for!(SchemaDocument))?;
    let validator = jsonschema::validator_for(&schema).map_err(|e| SchemaError::Invalid {
        errors: vec![e.to_string()],
    })?;
    let errors: Vec<String> = validator.iter_errors(raw).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Invalid { errors })
    }
}

fn select_dataset<'d>(
    document: &'d SchemaDocument,
    options: LoadOptions<'_>,
) -> Result<&'d DatasetDef, SchemaError> {
    let type_filter = options.dataset_type.map(str::trim).filter(|t| !t.is_empty());
    let candidates: Vec<&DatasetDef> = document
        .datasets
        .iter()
        .filter(|d| type_filter.is_none_or(|t| d.dataset_type.as_deref() == Some(t)))
        .collect();
    if candidates.is_empty() {
        return Err(SchemaError::NoDatasets);
    }

    let wanted = options.dataset_name.map(str::trim).filter(|n| !n.is_empty());
    let Some(wanted) = wanted else {
        return Ok(candidates[0]);
    };

    candidates
        .iter()
        .copied()
        .find(|d| d.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| SchemaError::DatasetNotFound {
            name: wanted.to_string(),
            available: candidates
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
      "datasets": [
        {"name": "RoadCenterline", "datasetType": "esriDTFeatureClass",
         "fields": {"fieldArray": [{"name": "RCL_NGUID", "type": "esriFieldTypeString"}]}},
        {"name": "Lookup", "datasetType": "esriDTTable", "fields": {"fieldArray": []}},
        {"name": "SiteStructureAddressPoint", "datasetType": "esriDTFeatureClass",
         "fields": {"fieldArray": [
           {"name": "NGUID", "type": "esriFieldTypeString", "length": 254, "required": true, "isNullable": false},
           {"name": "AddNum", "type": "esriFieldTypeInteger", "isNullable": false},
           {"name": "Comments", "type": "esriFieldTypeString", "length": 254},
           {"type": "esriFieldTypeString"},
           {"name": "Shape", "type": "esriFieldTypeGeometry", "required": true}
         ]}}
      ]
    }"#;

    fn options(name: Option<&'static str>, mode: InclusionMode) -> LoadOptions<'static> {
        LoadOptions {
            dataset_name: name,
            mode,
            dataset_type: Some("esriDTFeatureClass"),
        }
    }

    #[test]
    fn defaults_to_first_feature_class() {
        let expected = parse_expected_fields(DOC, options(None, InclusionMode::All)).unwrap();
        assert_eq!(expected.dataset_name, "RoadCenterline");
        assert_eq!(expected.len(), 1);
    }

    #[test]
    fn all_mode_keeps_every_named_field() {
        let expected = parse_expected_fields(
            DOC,
            options(Some("sitestructureaddresspoint"), InclusionMode::All),
        )
        .unwrap();
        let keys: Vec<&str> = expected.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["addnum", "comments", "nguid", "shape"]);
        let nguid = expected.get("NGUID").unwrap();
        assert_eq!(nguid.field_type, FieldType::String);
        assert_eq!(nguid.length, Some(254));
        assert!(nguid.required);
        assert!(!nguid.nullable);
    }

    #[test]
    fn required_mode_keeps_required_only() {
        let expected = parse_expected_fields(
            DOC,
            options(Some("SiteStructureAddressPoint"), InclusionMode::RequiredOnly),
        )
        .unwrap();
        let keys: Vec<&str> = expected.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nguid", "shape"]);
    }

    #[test]
    fn nonnullable_mode_adds_non_nullable_fields() {
        let expected = parse_expected_fields(
            DOC,
            options(
                Some("SiteStructureAddressPoint"),
                InclusionMode::RequiredOrNonNullable,
            ),
        )
        .unwrap();
        let keys: Vec<&str> = expected.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["addnum", "nguid", "shape"]);
    }

    #[test]
    fn missing_dataset_lists_available_names() {
        let err = parse_expected_fields(DOC, options(Some("Lookup"), InclusionMode::All))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dataset 'Lookup' not found. Available: RoadCenterline, SiteStructureAddressPoint"
        );
    }

    #[test]
    fn no_type_filter_accepts_tables() {
        let expected = parse_expected_fields(
            DOC,
            LoadOptions {
                dataset_name: Some("Lookup"),
                mode: InclusionMode::All,
                dataset_type: None,
            },
        )
        .unwrap();
        assert!(expected.is_empty());
    }

    #[test]
    fn empty_dataset_list_is_an_error() {
        let err = parse_expected_fields(r#"{"datasets": []}"#, options(None, InclusionMode::All))
            .unwrap_err();
        assert!(matches!(err, SchemaError::NoDatasets));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_expected_fields("{not json", options(None, InclusionMode::All))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn wrongly_shaped_document_is_invalid() {
        let err = parse_expected_fields(
            r#"{"datasets": [{"name": "X", "fields": {"fieldArray": "nope"}}]}"#,
            options(None, InclusionMode::All),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }), "{err}");
    }
}
