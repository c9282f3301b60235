//! Machine translation fallback
//!
//! Provider calls are retried exactly once after a fixed pause; the second
//! failure is returned to the caller.

use crate::error::TranslationError;
use crate::language::Language;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A machine translation provider
pub trait MachineTranslator {
    /// Detect the language of `text`, as an ISO 639-1 code
    fn detect(&self, text: &str) -> Result<String, TranslationError>;

    /// Translate `text` from `source` to `target`
    fn translate(&self, text: &str, source: Language, target: Language) -> Result<String, TranslationError>;
}

/// Run `op`; on failure sleep for `delay` and run it one more time
///
/// # Errors
/// The error of the second attempt.
pub fn with_retry<T>(
    delay: Duration,
    mut op: impl FnMut() -> Result<T, TranslationError>,
) -> Result<T, TranslationError> {
    match op() {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(error = %e, delay_ms = delay.as_millis(), "translation provider needs to re-try, sleeping");
            std::thread::sleep(delay);
            tracing::warn!("back, re-trying translation provider");
            op()
        }
    }
}

/// Client for a LibreTranslate-compatible HTTP API
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct Detection {
    language: String,
    confidence: f64,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl LibreTranslateClient {
    /// Create client for the API rooted at `base_url`
    ///
    /// # Errors
    /// `Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// With API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl MachineTranslator for LibreTranslateClient {
    fn detect(&self, text: &str) -> Result<String, TranslationError> {
        let detections: Vec<Detection> = self
            .client
            .post(self.endpoint("detect"))
            .json(&DetectRequest {
                q: text,
                api_key: self.api_key.as_deref(),
            })
            .send()?
            .error_for_status()?
            .json()?;

        detections
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|d| d.language)
            .ok_or_else(|| TranslationError::Provider(format!("no language detected for '{text}'")))
    }

    fn translate(&self, text: &str, source: Language, target: Language) -> Result<String, TranslationError> {
        let response: TranslateResponse = self
            .client
            .post(self.endpoint("translate"))
            .json(&TranslateRequest {
                q: text,
                source: source.code(),
                target: target.code(),
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.translated_text)
    }
}
