//! Severities, check kinds, schema inclusion modes, and run statuses.
//!
//! Enums serialize as `snake_case` strings except where the orchestrator
//! contract fixes a spelling (`RunStatus`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a finding. Errors always win over warnings when a record's
/// status is synthesized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CheckKind
// ---------------------------------------------------------------------------

/// The check that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Expected field absent from the target (dataset-global).
    MissingField,
    /// Configured mandatory field absent from the target (dataset-global).
    MandatoryMissing,
    /// Mandatory field null or empty on a record.
    MandatoryNull,
    /// Identifier null or empty on a record.
    IdentifierEmpty,
    /// Identifier shared with another scoped record.
    IdentifierDuplicate,
    /// Secondary business field shared with another scoped record.
    SecondaryDuplicate,
}

impl CheckKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::MandatoryMissing => "mandatory_missing",
            Self::MandatoryNull => "mandatory_null",
            Self::IdentifierEmpty => "identifier_empty",
            Self::IdentifierDuplicate => "identifier_duplicate",
            Self::SecondaryDuplicate => "secondary_duplicate",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InclusionMode
// ---------------------------------------------------------------------------

/// Which schema fields are expected on the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionMode {
    /// Every field the schema declares.
    #[default]
    All,
    /// Only fields flagged `required`.
    RequiredOnly,
    /// Fields flagged `required` or declared non-nullable.
    RequiredOrNonNullable,
}

impl InclusionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::RequiredOnly => "required-only",
            Self::RequiredOrNonNullable => "required-or-nonnullable",
        }
    }

    /// Whether a schema field with these flags is expected under this mode.
    #[must_use]
    pub const fn includes(self, required: bool, nullable: bool) -> bool {
        match self {
            Self::All => true,
            Self::RequiredOnly => required,
            Self::RequiredOrNonNullable => required || !nullable,
        }
    }
}

impl fmt::Display for InclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InclusionMode {
    type Err = CoreError;

    /// Accepts both the short spellings used by the nightly job parameters
    /// (`required`, `nonnullable`) and the long ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "required" | "required-only" | "required_only" => Ok(Self::RequiredOnly),
            "nonnullable" | "required-or-nonnullable" | "required_or_nonnullable" => {
                Ok(Self::RequiredOrNonNullable)
            }
            other => Err(CoreError::Validation(format!(
                "unknown inclusion mode '{other}' (expected all, required, or nonnullable)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Overall outcome of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    QaPassed,
    QaFailed,
    Error,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QaPassed => "qa_passed",
            Self::QaFailed => "qa_failed",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn from_passed(qa_passed: bool) -> Self {
        if qa_passed { Self::QaPassed } else { Self::QaFailed }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
