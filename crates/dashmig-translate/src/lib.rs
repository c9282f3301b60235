//! dashmig translation
//!
//! Translates the user-visible text of migrated cards and dashboards.
//! Dashboards are assumed to be authored in English.
//!
//! Lookup order for a sentence:
//! 1. already a known translation → returned unchanged
//! 2. user-defined term (optionally case-expanded) → its translation
//! 3. miss → [`OnMiss`] policy: fail, mirror, or ask a [`MachineTranslator`]
//!
//! Leading and trailing whitespace of the input is always preserved.
//!
//! # Example
//!
//! ```rust
//! use dashmig_translate::{Language, OnMiss, TermDictionary, Translator};
//!
//! let terms = TermDictionary::from_yaml_str("Sales:\n  FR: Ventes\n").unwrap();
//! let mut translator = Translator::new(Language::Fr, OnMiss::Mirror)
//!     .with_terms(&terms, false);
//!
//! assert_eq!(translator.translate(" Sales ").unwrap(), " Ventes ");
//! assert_eq!(translator.translate("Revenue").unwrap(), "Revenue");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod casing;
pub mod error;
pub mod language;
pub mod machine;
pub mod terms;
pub mod translator;

// Re-exports
pub use error::TranslationError;
pub use language::{Language, OnMiss};
pub use machine::{with_retry, LibreTranslateClient, MachineTranslator};
pub use terms::TermDictionary;
pub use translator::{Translator, DEFAULT_RETRY_DELAY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
