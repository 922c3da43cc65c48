//! # geoqa-schema
//!
//! Expected-field specification loading and comparison for geoqa.
//!
//! This crate provides:
//! - The schema document model, validated against its own generated JSON
//!   Schema before it is deserialized
//! - `load_expected_fields` / `parse_expected_fields`: expected field
//!   definitions for one dataset, filtered by inclusion mode
//! - `compare_fields`: missing / extra / per-field type and length findings
//! - `resolve_mandatory`: mandatory field names resolved against the store

pub mod compare;
pub mod document;
pub mod error;
pub mod loader;

pub use compare::{
    CompareOptions, FieldComparison, MandatoryResolution, compare_fields, resolve_mandatory,
};
pub use error::SchemaError;
pub use loader::{ExpectedFields, LoadOptions, load_expected_fields, parse_expected_fields};
