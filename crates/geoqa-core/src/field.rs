//! Field definitions and canonical field types.
//!
//! Schema documents and row stores spell field types differently
//! (`esriFieldTypeString`, `String`, `TEXT`, `varchar`, ...). Every spelling is
//! normalized onto [`FieldType`] before comparison; two types are equal iff
//! their canonical forms are equal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor prefix carried by schema-document type names.
const VENDOR_PREFIX: &str = "esrifieldtype";

/// Canonical field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FieldType {
    String,
    Integer,
    SmallInteger,
    Double,
    Single,
    Date,
    Oid,
    Geometry,
    Guid,
    GlobalId,
    Blob,
    Raster,
    /// A spelling with no canonical mapping; compared verbatim.
    Other(String),
}

impl FieldType {
    /// Normalize a platform-specific type spelling.
    ///
    /// Matching is case-insensitive and ignores the `esriFieldType` prefix.
    /// Unknown spellings are kept verbatim (trimmed) as [`FieldType::Other`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        let bare = lower.strip_prefix(VENDOR_PREFIX).unwrap_or(&lower);
        match bare {
            "string" | "text" | "str" | "varchar" | "nvarchar" | "char" | "nchar"
            | "character varying" => Self::String,
            "integer" | "int" | "long" | "bigint" | "int32" | "int64" => Self::Integer,
            "smallinteger" | "smallint" | "short" | "int16" => Self::SmallInteger,
            "double" | "real" | "float8" | "double precision" | "numeric" | "decimal" => {
                Self::Double
            }
            "single" | "float" | "float4" => Self::Single,
            "date" | "datetime" | "timestamp" | "timestamptz" => Self::Date,
            "oid" | "objectid" => Self::Oid,
            "geometry" | "shape" => Self::Geometry,
            "guid" | "uuid" | "uniqueidentifier" => Self::Guid,
            "globalid" => Self::GlobalId,
            "blob" | "binary" | "bytea" => Self::Blob,
            "raster" => Self::Raster,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Canonical spelling used in reports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::SmallInteger => "SmallInteger",
            Self::Double => "Double",
            Self::Single => "Single",
            Self::Date => "Date",
            Self::Oid => "OID",
            Self::Geometry => "Geometry",
            Self::Guid => "GUID",
            Self::GlobalId => "GlobalID",
            Self::Blob => "Blob",
            Self::Raster => "Raster",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

/// A field as the schema expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Name with the schema's original casing.
    pub name: String,
    pub field_type: FieldType,
    pub length: Option<u32>,
    pub required: bool,
    pub nullable: bool,
}

impl FieldDefinition {
    /// Case-insensitive comparison key.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A field as the row store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualField {
    /// Name with the store's original casing.
    pub name: String,
    pub field_type: FieldType,
    pub length: Option<u32>,
}

impl ActualField {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: &str, length: Option<u32>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::normalize(field_type),
            length,
        }
    }

    /// Case-insensitive comparison key.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Find the store's spelling of `wanted` among `fields`, ignoring case.
#[must_use]
pub fn resolve_field_name<'a>(fields: &'a [ActualField], wanted: &str) -> Option<&'a str> {
    let wanted = wanted.trim();
    if wanted.is_empty() {
        return None;
    }
    fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(wanted))
        .map(|f| f.name.as_str())
}
