//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use geoqa_core::field::ActualField;
use geoqa_core::record::FieldValue;
use geoqa_core::request::QaRequest;
use geoqa_store::MemoryRowStore;
use tempfile::TempDir;

pub const WORKSPACE: &str = "data/county.gdb";
pub const TABLE: &str = "AddressPoints";
pub const TARGET: &str = "data/county.gdb/AddressPoints";

pub const ID_1: &str = "{8E3B7C0A-1111-4A2B-9C3D-000000000001}";
pub const ID_1_LOWER: &str = "{8e3b7c0a-1111-4a2b-9c3d-000000000001}";
pub const ID_3: &str = "{8E3B7C0A-1111-4A2B-9C3D-000000000003}";
pub const ID_5: &str = "{8E3B7C0A-1111-4A2B-9C3D-000000000005}";

pub const SCHEMA: &str = r#"{
  "datasets": [
    {
      "name": "SiteStructureAddressPoint",
      "datasetType": "esriDTFeatureClass",
      "fields": {
        "fieldArray": [
          {"name": "OBJECTID", "type": "esriFieldTypeOID", "required": true, "isNullable": false},
          {"name": "NGUID", "type": "esriFieldTypeString", "length": 254, "required": true, "isNullable": false},
          {"name": "Agency", "type": "esriFieldTypeString", "length": 100},
          {"name": "Add_Number", "type": "esriFieldTypeInteger"},
          {"name": "FullAddress", "type": "esriFieldTypeString", "length": 254},
          {"name": "Shape", "type": "esriFieldTypeGeometry", "required": true}
        ]
      }
    }
  ]
}"#;

/// Install a subscriber filtered by `GEOQA_LOG` (e.g. `GEOQA_LOG=geoqa_engine=debug`).
/// Repeated calls are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("GEOQA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// 2026-10-18 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> FieldValue {
    FieldValue::from(now() - Duration::hours(hours))
}

/// Writes the schema document into a fresh directory.
pub fn schema_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ng911_schema.json");
    std::fs::write(&path, SCHEMA).unwrap();
    (dir, path)
}

pub fn fields(with_identifier: bool) -> Vec<ActualField> {
    let mut fields = vec![
        ActualField::new("OBJECTID", "OID", None),
        ActualField::new("Agency", "String", Some(100)),
        ActualField::new("QAStatus", "String", Some(255)),
        ActualField::new("Add_Number", "Integer", None),
        ActualField::new("FullAddress", "String", Some(254)),
        ActualField::new("created_date", "Date", None),
    ];
    if with_identifier {
        fields.insert(1, ActualField::new("NGUID", "String", Some(254)));
    }
    fields
}

/// Five address points:
///
/// | id | NGUID        | Agency | QAStatus          | Add_Number | FullAddress  | created |
/// |----|--------------|--------|-------------------|------------|--------------|---------|
/// | 1  | ID_1         | north  | null              | 10         | 1 MAIN ST    | old     |
/// | 2  | ID_1 (lower) | north  | Failed            | 12         | ` 1 main st` | old     |
/// | 3  | ID_3         | south  | Passed            | 5          | 3 OAK AVE    | old     |
/// | 4  | not-a-guid   | south  | Passed            | 0          | 9 ELM ST     | 1h ago  |
/// | 5  | ID_5         | null   | Warning: ...      | null       | 10 PINE RD   | old     |
pub fn address_points() -> MemoryRowStore {
    let old = hours_ago(24 * 40);
    MemoryRowStore::new(WORKSPACE, TABLE, fields(true))
        .with_row(
            1,
            [
                ("NGUID", FieldValue::from(ID_1)),
                ("Agency", FieldValue::from("north")),
                ("QAStatus", FieldValue::Null),
                ("Add_Number", FieldValue::Integer(10)),
                ("FullAddress", FieldValue::from("1 MAIN ST")),
                ("created_date", old.clone()),
            ],
        )
        .with_row(
            2,
            [
                ("NGUID", FieldValue::from(ID_1_LOWER)),
                ("Agency", FieldValue::from("north")),
                ("QAStatus", FieldValue::from("Failed")),
                ("Add_Number", FieldValue::Integer(12)),
                ("FullAddress", FieldValue::from(" 1 main st")),
                ("created_date", old.clone()),
            ],
        )
        .with_row(
            3,
            [
                ("NGUID", FieldValue::from(ID_3)),
                ("Agency", FieldValue::from("south")),
                ("QAStatus", FieldValue::from("Passed")),
                ("Add_Number", FieldValue::Integer(5)),
                ("FullAddress", FieldValue::from("3 OAK AVE")),
                ("created_date", old.clone()),
            ],
        )
        .with_row(
            4,
            [
                ("NGUID", FieldValue::from("not-a-guid")),
                ("Agency", FieldValue::from("south")),
                ("QAStatus", FieldValue::from("Passed")),
                ("Add_Number", FieldValue::Integer(0)),
                ("FullAddress", FieldValue::from("9 ELM ST")),
                ("created_date", hours_ago(1)),
            ],
        )
        .with_row(
            5,
            [
                ("NGUID", FieldValue::from(ID_5)),
                ("Agency", FieldValue::Null),
                ("QAStatus", FieldValue::from("Warning: Duplicate address")),
                ("Add_Number", FieldValue::Null),
                ("FullAddress", FieldValue::from("10 PINE RD")),
                ("created_date", old),
            ],
        )
}

pub fn request(schema: &std::path::Path) -> QaRequest {
    init_tracing();
    let mut request = QaRequest::new(TARGET, schema.display().to_string());
    request.dataset_name = Some("SiteStructureAddressPoint".into());
    request.mandatory_fields = vec!["NGUID".into(), "Add_Number".into()];
    request.secondary_duplicate_field = Some("FullAddress".into());
    request.apply_updates = true;
    request
}

pub fn status_of(store: &MemoryRowStore, id: i64) -> Option<String> {
    store
        .value(id, "QAStatus")
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}
