//! Field Comparator: expected definitions vs. the fields a store reports.

use std::collections::BTreeMap;

use geoqa_core::field::ActualField;
use geoqa_core::report::{FieldDetail, FieldPresence};

use crate::loader::ExpectedFields;

/// Which dimensions are compared for fields present on both sides.
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    pub check_types: bool,
    pub check_lengths: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            check_types: true,
            check_lengths: true,
        }
    }
}

/// Result of comparing expected and actual fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldComparison {
    /// Expected fields absent from the store (schema casing), excluding
    /// non-blocking ones.
    pub missing_fields: Vec<String>,
    /// Non-blocking expected fields absent from the store.
    pub missing_warnings: Vec<String>,
    /// Store fields the schema does not expect (store casing).
    pub extra_fields: Vec<String>,
    /// One entry per expected field, ordered by lowercase name.
    pub details: Vec<FieldDetail>,
}

impl FieldComparison {
    /// Expected fields with a type mismatch.
    #[must_use]
    pub fn type_mismatches(&self) -> Vec<&str> {
        self.details
            .iter()
            .filter(|d| d.type_match == Some(false))
            .map(|d| d.field.as_str())
            .collect()
    }

    /// Expected fields with a length mismatch.
    #[must_use]
    pub fn length_mismatches(&self) -> Vec<&str> {
        self.details
            .iter()
            .filter(|d| d.length_match == Some(false))
            .map(|d| d.field.as_str())
            .collect()
    }
}

/// Compare expected and actual fields by case-insensitive name.
///
/// Type and length mismatches are evaluated independently. A length is only
/// compared when both sides declare one. Missing fields for which
/// `is_non_blocking` holds land in `missing_warnings` instead of
/// `missing_fields`.
#[must_use]
pub fn compare_fields(
    expected: &ExpectedFields,
    actual: &[ActualField],
    options: CompareOptions,
    is_non_blocking: impl Fn(&str) -> bool,
) -> FieldComparison {
    let actual_map: BTreeMap<String, &ActualField> =
        actual.iter().map(|f| (f.key(), f)).collect();

    let mut comparison = FieldComparison::default();

    for (key, exp) in &expected.fields {
        let Some(act) = actual_map.get(key) else {
            if is_non_blocking(&exp.name) {
                comparison.missing_warnings.push(exp.name.clone());
            } else {
                comparison.missing_fields.push(exp.name.clone());
            }
            comparison.details.push(FieldDetail {
                field: exp.name.clone(),
                status: FieldPresence::Missing,
                expected_type: exp.field_type.to_string(),
                actual_type: None,
                type_match: None,
                expected_length: exp.length,
                actual_length: None,
                length_match: None,
                required: exp.required,
                nullable: exp.nullable,
            });
            continue;
        };

        let type_match = options
            .check_types
            .then(|| exp.field_type == act.field_type);
        let length_match = match (options.check_lengths, exp.length, act.length) {
            (true, Some(e), Some(a)) => Some(e == a),
            _ => None,
        };

        comparison.details.push(FieldDetail {
            field: exp.name.clone(),
            status: FieldPresence::Ok,
            expected_type: exp.field_type.to_string(),
            actual_type: Some(act.field_type.to_string()),
            type_match,
            expected_length: exp.length,
            actual_length: act.length,
            length_match,
            required: exp.required,
            nullable: exp.nullable,
        });
    }

    comparison.extra_fields = actual_map
        .iter()
        .filter(|(key, _)| !expected.fields.contains_key(*key))
        .map(|(_, f)| f.name.clone())
        .collect();

    comparison
}

/// Mandatory fields split by presence on the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MandatoryResolution {
    /// Present mandatory fields, in store casing, in configured order.
    pub present: Vec<String>,
    /// Configured mandatory fields the store lacks, in configured casing.
    pub missing: Vec<String>,
}

/// Resolve configured mandatory field names against the store's fields.
#[must_use]
pub fn resolve_mandatory(mandatory: &[String], actual: &[ActualField]) -> MandatoryResolution {
    let mut resolution = MandatoryResolution::default();
    for wanted in mandatory {
        match geoqa_core::field::resolve_field_name(actual, wanted) {
            Some(name) => {
                if !resolution.present.iter().any(|p| p == name) {
                    resolution.present.push(name.to_string());
                }
            }
            None => resolution.missing.push(wanted.trim().to_string()),
        }
    }
    resolution
}
