//! # geoqa-engine
//!
//! QA run orchestration for geoqa.
//!
//! A run resolves its scope, compares the target's fields with the schema,
//! runs the integrity checks over in-scope records, synthesizes one status
//! per record, optionally writes statuses back, and composes the report:
//!
//! - [`scope`]: which records are (re)checked
//! - [`checks`]: identifier uniqueness, mandatory nulls, null-failure rows,
//!   secondary duplicates
//! - [`synth`]: findings to one status string per record
//! - [`apply`]: write-back with the edit-session fallback
//! - [`aggregate`]: status counts by a grouping attribute
//! - [`compose`]: verdict, digest, and result assembly
//! - [`run_log`]: JSON and CSV run logs
//!
//! [`QaEngine`] ties them together.

pub mod aggregate;
pub mod apply;
pub mod checks;
pub mod compose;
mod engine;
pub mod error;
pub mod run_log;
pub mod scope;
pub mod synth;

pub use engine::QaEngine;
pub use error::{EngineError, ErrorKind, RunLogError};
pub use run_log::{RunLogFiles, RunLogWriter};
