//! Row-store connection settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file backing the target table.
    #[serde(default)]
    pub path: String,

    /// The store is versioned: status writes need an explicit edit session.
    #[serde(default)]
    pub versioned: bool,
}

impl StoreConfig {
    /// Returns `true` if a database path is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.path.is_empty()
    }
}
