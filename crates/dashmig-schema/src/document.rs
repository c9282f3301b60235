//! Reading mapping and configuration documents
//!
//! YAML is a superset of JSON, but `.json` files go through serde_json so
//! error messages point at the right syntax.

use crate::error::SchemaError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from the file extension (anything not `.json` is YAML)
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parse a document from text
///
/// # Errors
/// `Json` / `Yaml` on malformed input.
pub fn parse_document<T: DeserializeOwned>(text: &str, format: DocumentFormat) -> Result<T, SchemaError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

/// Read and parse a document from disk
///
/// # Errors
/// `Io` if the file cannot be read, `Json` / `Yaml` on malformed input.
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SchemaError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io_error(path, e))?;
    tracing::debug!(path = %path.display(), "read document");
    parse_document(&text, DocumentFormat::from_path(path))
}
