//! Shape of the schema document.
//!
//! ```json
//! {"datasets": [{"name": "...", "datasetType": "esriDTFeatureClass",
//!   "fields": {"fieldArray": [{"name": "NGUID", "type": "esriFieldTypeString",
//!     "length": 254, "required": true, "isNullable": false}]}}]}
//! ```
//!
//! Unknown keys are ignored; exported geodatabase schemas carry many.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDocument {
    #[serde(default)]
    pub datasets: Vec<DatasetDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dataset_type: Option<String>,
    #[serde(default)]
    pub fields: FieldsDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldsDef {
    #[serde(default)]
    pub field_array: Vec<SchemaField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub required: Option<bool>,
    /// Absent means nullable.
    #[serde(default)]
    pub is_nullable: Option<bool>,
}
