//! Target identifiers: `<workspace>/<table>` paths.
//!
//! A target such as `C:/conn/prod.sde/NG911.DBO.SSAP` names a table inside a
//! workspace. The workspace is the path up to and including the first segment
//! that ends in a workspace marker (`.sde`, `.gdb`, ...). Edit sessions are
//! opened on the workspace, never on the table.

use crate::error::StoreError;

/// A parsed target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    /// The identifier as given.
    pub raw: String,
    /// Enclosing workspace, when one of the markers matched.
    pub workspace: Option<String>,
    /// Final path segment.
    pub table: String,
}

impl TargetPath {
    /// Split `raw` into workspace and table.
    ///
    /// Both `/` and `\` separate segments. Markers compare case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidTarget` for a blank identifier or one that
    /// ends in a separator.
    pub fn parse(raw: &str, markers: &[String]) -> Result<Self, StoreError> {
        let trimmed = raw.trim();
        let table = trimmed
            .rsplit(['/', '\\'])
            .next()
            .map(str::trim)
            .unwrap_or_default();
        if table.is_empty() {
            return Err(StoreError::InvalidTarget(raw.to_string()));
        }

        let mut workspace = None;
        let mut offset = 0;
        for segment in trimmed.split(['/', '\\']) {
            let end = offset + segment.len();
            if end >= trimmed.len() {
                break;
            }
            let lower = segment.to_ascii_lowercase();
            if markers
                .iter()
                .any(|m| !m.is_empty() && lower.ends_with(&m.to_ascii_lowercase()))
            {
                workspace = Some(trimmed[..end].to_string());
                break;
            }
            offset = end + 1;
        }

        Ok(Self {
            raw: trimmed.to_string(),
            workspace,
            table: table.to_string(),
        })
    }

    /// The workspace, or `StoreError::NoWorkspace` when none was found.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoWorkspace` if no segment matched a marker.
    pub fn require_workspace(&self) -> Result<&str, StoreError> {
        self.workspace
            .as_deref()
            .ok_or_else(|| StoreError::NoWorkspace(self.raw.clone()))
    }
}
