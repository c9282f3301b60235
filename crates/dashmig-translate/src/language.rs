//! Target languages and miss policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language a dashboard is translated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (source language; translation is the identity)
    En,
    /// French
    Fr,
}

impl Language {
    /// ISO 639-1 code, as used by translation providers
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Upper-case name, as used in term dictionaries
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Fr => "FR",
        }
    }

    /// Only the first word of a sentence is capitalized
    #[inline]
    #[must_use]
    pub fn uses_sentence_case(&self) -> bool {
        matches!(self, Language::Fr)
    }

    /// Does `code` (as returned by a provider) denote this language?
    #[inline]
    #[must_use]
    pub fn matches_code(&self, code: &str) -> bool {
        code.trim().eq_ignore_ascii_case(self.code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(format!("unsupported language: '{other}'")),
        }
    }
}

/// What to do when a sentence has no known translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnMiss {
    /// Fail the translation
    Fail,
    /// Return the sentence unchanged
    #[default]
    Mirror,
    /// Ask the machine translation provider
    MachineTranslate,
}
