//! Sentence translator

use crate::casing::{lowercase_tail, sentence_case};
use crate::error::TranslationError;
use crate::language::{Language, OnMiss};
use crate::machine::{with_retry, MachineTranslator};
use crate::terms::TermDictionary;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

/// Default pause before retrying the machine translation provider
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Translates English sentences to one target language
///
/// Machine translations are cached for the lifetime of the translator.
pub struct Translator {
    language: Language,
    on_miss: OnMiss,
    dictionary: HashMap<String, String>,
    known_translations: HashSet<String>,
    machine: Option<Box<dyn MachineTranslator>>,
    retry_delay: Duration,
}

impl Translator {
    /// Create translator with an empty dictionary
    #[must_use]
    pub fn new(language: Language, on_miss: OnMiss) -> Self {
        Self {
            language,
            on_miss,
            dictionary: HashMap::new(),
            known_translations: HashSet::new(),
            machine: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// With the terms of `dictionary` for this translator's language
    #[must_use]
    pub fn with_terms(mut self, dictionary: &TermDictionary, case_expand: bool) -> Self {
        for (term, translation) in dictionary.for_language(self.language, case_expand) {
            self.known_translations.insert(translation.clone());
            self.dictionary.insert(term, translation);
        }
        self
    }

    /// With machine translation provider
    #[must_use]
    pub fn with_machine(mut self, machine: Box<dyn MachineTranslator>) -> Self {
        self.machine = Some(machine);
        self
    }

    /// With pause before the single provider retry
    #[inline]
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Target language
    #[inline]
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Miss policy
    #[inline]
    #[must_use]
    pub fn on_miss(&self) -> OnMiss {
        self.on_miss
    }

    /// Number of known sentences (dictionary terms and cached translations)
    #[inline]
    #[must_use]
    pub fn known_sentences(&self) -> usize {
        self.dictionary.len()
    }

    /// Translate one sentence
    ///
    /// English is the identity. Surrounding whitespace is preserved exactly.
    ///
    /// # Errors
    /// `Miss` under [`OnMiss::Fail`], `UnexpectedLanguage` when the provider
    /// detects a third language, or any provider error after the retry.
    pub fn translate(&mut self, text: &str) -> Result<String, TranslationError> {
        if self.language == Language::En {
            return Ok(text.to_string());
        }

        let core = text.trim();
        if core.is_empty() {
            return Ok(text.to_string());
        }
        let start = text.len() - text.trim_start().len();
        let (leading, trailing) = (&text[..start], &text[start + core.len()..]);

        let translated = if self.known_translations.contains(core) {
            core.to_string()
        } else if let Some(hit) = self.dictionary.get(core) {
            hit.clone()
        } else {
            self.handle_miss(core)?
        };

        let translated = if self.language.uses_sentence_case() {
            lowercase_tail(&translated)
        } else {
            translated
        };
        Ok(format!("{leading}{translated}{trailing}"))
    }

    fn handle_miss(&mut self, core: &str) -> Result<String, TranslationError> {
        match self.on_miss {
            OnMiss::Fail => Err(TranslationError::Miss(core.to_string())),
            OnMiss::Mirror => {
                tracing::debug!(text = core, "no translation, mirroring");
                Ok(core.to_string())
            }
            OnMiss::MachineTranslate => self.machine_translate(core),
        }
    }

    fn machine_translate(&mut self, core: &str) -> Result<String, TranslationError> {
        let machine = self.machine.as_deref().ok_or(TranslationError::NoProvider)?;
        let target = self.language;

        let detected = with_retry(self.retry_delay, || machine.detect(core))?;
        if target.matches_code(&detected) {
            tracing::warn!(text = core, language = %target, "sentence already seems to be in the target language");
            return Ok(core.to_string());
        }
        if !Language::En.matches_code(&detected) {
            return Err(TranslationError::UnexpectedLanguage {
                text: core.to_string(),
                detected,
                target,
            });
        }

        let raw = with_retry(self.retry_delay, || machine.translate(core, Language::En, target))?;
        let translated = if target.uses_sentence_case() {
            sentence_case(&raw)
        } else {
            raw
        };
        tracing::info!(text = core, translation = %translated, "machine translated");

        self.known_translations.insert(translated.clone());
        self.dictionary.insert(core.to_string(), translated.clone());
        Ok(translated)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.language)
            .field("on_miss", &self.on_miss)
            .field("known_sentences", &self.dictionary.len())
            .field("has_machine", &self.machine.is_some())
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Stub {
        detected: &'static str,
        answer: &'static str,
        failures_left: Cell<u32>,
        calls: Rc<Cell<u32>>,
    }

    impl Stub {
        fn new(detected: &'static str, answer: &'static str) -> Self {
            Self {
                detected,
                answer,
                failures_left: Cell::new(0),
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl MachineTranslator for Stub {
        fn detect(&self, _text: &str) -> Result<String, TranslationError> {
            Ok(self.detected.to_string())
        }

        fn translate(&self, _text: &str, _source: Language, _target: Language) -> Result<String, TranslationError> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(TranslationError::Provider("busy".to_string()));
            }
            Ok(self.answer.to_string())
        }
    }

    fn machine(stub: Stub) -> Translator {
        Translator::new(Language::Fr, OnMiss::MachineTranslate)
            .with_machine(Box::new(stub))
            .with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn english_is_identity() {
        let mut t = Translator::new(Language::En, OnMiss::Fail);
        assert_eq!(t.translate(" Whatever  ").unwrap(), " Whatever  ");
    }

    #[test]
    fn machine_translation_keeps_whitespace_and_sentence_case() {
        let mut t = machine(Stub::new("en", "bonjour Le Monde"));
        assert_eq!(t.translate("  hello world\n").unwrap(), "  Bonjour le monde\n");
    }

    #[test]
    fn machine_translations_are_cached() {
        let stub = Stub::new("en", "ventes totales");
        let calls = Rc::clone(&stub.calls);
        let mut t = machine(stub);
        t.translate("Total sales").unwrap();
        t.translate("Total sales").unwrap();
        assert_eq!(calls.get(), 1);
        // a previous output is recognized as already translated
        assert_eq!(t.translate("Ventes totales").unwrap(), "Ventes totales");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn provider_is_retried_once() {
        let stub = Stub::new("en", "ventes");
        stub.failures_left.set(1);
        let calls = Rc::clone(&stub.calls);
        let mut t = machine(stub);
        assert_eq!(t.translate("Sales").unwrap(), "Ventes");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn third_language_is_an_error() {
        let mut t = machine(Stub::new("es", "x"));
        assert!(matches!(
            t.translate("Hola"),
            Err(TranslationError::UnexpectedLanguage { .. })
        ));
    }

    #[test]
    fn target_language_text_is_kept() {
        let mut t = machine(Stub::new("fr", "unused"));
        assert_eq!(t.translate("Ventes").unwrap(), "Ventes");
    }

    #[test]
    fn fail_policy() {
        let mut t = Translator::new(Language::Fr, OnMiss::Fail);
        assert!(matches!(t.translate("Revenue"), Err(TranslationError::Miss(s)) if s == "Revenue"));
    }

    #[test]
    fn machine_policy_without_provider() {
        let mut t = Translator::new(Language::Fr, OnMiss::MachineTranslate);
        assert!(matches!(t.translate("Revenue"), Err(TranslationError::NoProvider)));
    }

    #[test]
    fn dictionary_hit_lowercases_tail() {
        let terms = TermDictionary::new().with_term("Monthly revenue", Language::Fr, "Revenu Mensuel");
        let mut t = Translator::new(Language::Fr, OnMiss::Fail).with_terms(&terms, false);
        assert_eq!(t.translate("Monthly revenue ").unwrap(), "Revenu mensuel ");
    }

    #[test]
    fn blank_text_is_untouched() {
        let mut t = Translator::new(Language::Fr, OnMiss::Fail);
        assert_eq!(t.translate("   ").unwrap(), "   ");
    }
}
