//! Error types for schema mapping
//!
//! Covers the two ways a mapping can fail:
//! - lookups (an id with no destination counterpart)
//! - loading (unreadable or inconsistent mapping files)

use crate::ids::{ColumnId, TableId};
use std::path::PathBuf;

/// Errors raised while building or querying a schema mapping
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Table is referenced at source but no replacement is specified
    #[error("table {0} is referenced at source, but no replacement is specified")]
    UnresolvedTable(TableId),

    /// Column is referenced at source but no replacement is specified
    #[error("column {0} is referenced at source, but no replacement is specified")]
    UnresolvedColumn(ColumnId),

    /// Same source table mapped twice
    #[error("source table {0} is mapped more than once")]
    DuplicateTable(TableId),

    /// Same source column mapped twice
    #[error("source column {0} is mapped more than once")]
    DuplicateColumn(ColumnId),

    /// IO error reading a mapping file
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML document
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON document
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a lookup failure (as opposed to a loading failure)
    #[inline]
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedTable(_) | Self::UnresolvedColumn(_))
    }
}
