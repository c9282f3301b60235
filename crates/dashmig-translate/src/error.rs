//! Error types for translation

use crate::language::Language;
use std::path::PathBuf;

/// Errors raised while translating
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// No translation and the policy is to fail
    #[error("no translation found for '{0}'")]
    Miss(String),

    /// Text is neither English nor the target language
    #[error("sentence '{text}' does not seem to be in English nor the target language ({target}); detected '{detected}'")]
    UnexpectedLanguage {
        text: String,
        detected: String,
        target: Language,
    },

    /// Machine translation requested but no provider configured
    #[error("machine translation requested but no provider is configured")]
    NoProvider,

    /// Provider answered with something unusable
    #[error("translation provider error: {0}")]
    Provider(String),

    /// Transport error talking to the provider
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed term dictionary
    #[error("term dictionary error: {0}")]
    Terms(#[from] serde_yaml::Error),

    /// IO error reading a term dictionary
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranslationError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if retrying the provider call could help
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Provider(_))
    }
}
