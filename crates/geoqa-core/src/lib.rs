//! # geoqa-core
//!
//! Core types shared across the geoqa crates.
//!
//! This crate provides the foundational vocabulary of a QA run:
//! - Field definitions and the canonical field-type enum
//! - Record identifiers and typed field values
//! - Findings, severities, and the per-record status string
//! - Scope decisions
//! - Report sections and the run result handed back to the orchestrator
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod field;
pub mod finding;
pub mod record;
pub mod request;
pub mod report;
pub mod scope;

pub use errors::CoreError;
