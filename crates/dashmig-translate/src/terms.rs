//! User-defined term dictionary
//!
//! YAML document keyed by the English term, one entry per target language:
//!
//! ```yaml
//! Sales:
//!   FR: Ventes
//! Revenue per month:
//!   FR: Chiffre d'affaires par mois
//! ```

use crate::casing::case_variants;
use crate::error::TranslationError;
use crate::language::Language;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Terms for every language, as read from disk
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl TermDictionary {
    /// Empty dictionary
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML term document
    ///
    /// # Errors
    /// `Terms` on malformed YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, TranslationError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let entries: BTreeMap<String, BTreeMap<String, String>> = serde_yaml::from_str(text)?;
        Ok(Self { entries })
    }

    /// Read a YAML term document from disk
    ///
    /// # Errors
    /// `Io` if unreadable, `Terms` on malformed YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslationError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| TranslationError::io_error(path, e))?;
        let dictionary = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), terms = dictionary.len(), "loaded term dictionary");
        Ok(dictionary)
    }

    /// Add a term
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>, language: Language, translation: impl Into<String>) -> Self {
        self.entries
            .entry(term.into())
            .or_default()
            .insert(language.name().to_string(), translation.into());
        self
    }

    /// Number of English terms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terms for one language: English term → translation
    ///
    /// Language keys are matched case-insensitively. With `case_expand`,
    /// case variants of every term are added too; a term written explicitly
    /// always wins over a generated variant; clashing variants go to the
    /// term that sorts first.
    #[must_use]
    pub fn for_language(&self, language: Language, case_expand: bool) -> HashMap<String, String> {
        let flat: BTreeMap<String, String> = self
            .entries
            .iter()
            .filter_map(|(term, translations)| {
                translations
                    .iter()
                    .find(|(lang, _)| lang.eq_ignore_ascii_case(language.name()))
                    .map(|(_, t)| (term.clone(), t.clone()))
            })
            .collect();

        if !case_expand {
            return flat.into_iter().collect();
        }

        let mut expanded: HashMap<String, String> = flat.clone().into_iter().collect();
        for (term, translation) in &flat {
            for variant in case_variants(term) {
                expanded.entry(variant).or_insert_with(|| translation.clone());
            }
        }
        expanded
    }
}
