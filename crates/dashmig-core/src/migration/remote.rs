//! Remote installation holding the cards and dashboards

use crate::entity::EntityRef;
use crate::error::RemoteError;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Header carrying a pre-issued session token
pub const SESSION_HEADER: &str = "X-Metabase-Session";

/// Fetches and pushes entity documents
pub trait RemoteEntities {
    /// Current document of `entity`
    ///
    /// # Errors
    /// Transport errors and non-success statuses.
    fn fetch(&self, entity: EntityRef) -> Result<Value, RemoteError>;

    /// Replace the document of `entity`; returns the HTTP status
    ///
    /// # Errors
    /// Transport errors only; a refused push is a status, not an error.
    fn push(&self, entity: EntityRef, document: &Value) -> Result<u16, RemoteError>;
}

impl<R: RemoteEntities + ?Sized> RemoteEntities for &R {
    fn fetch(&self, entity: EntityRef) -> Result<Value, RemoteError> {
        (**self).fetch(entity)
    }

    fn push(&self, entity: EntityRef, document: &Value) -> Result<u16, RemoteError> {
        (**self).push(entity, document)
    }
}

/// REST client for `{base}/api/{card|dashboard}/{id}`
#[derive(Debug, Clone)]
pub struct MetabaseClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl MetabaseClient {
    /// Create client for the installation at `base_url`
    ///
    /// # Errors
    /// `Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
        })
    }

    /// With session token sent on every request
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Base URL, without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of `entity`
    #[must_use]
    pub fn url(&self, entity: EntityRef) -> String {
        format!("{}/api/{}/{}", self.base_url, entity.kind.api_path(), entity.id)
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.session_token {
            Some(token) => request.header(SESSION_HEADER, token),
            None => request,
        }
    }
}

impl RemoteEntities for MetabaseClient {
    fn fetch(&self, entity: EntityRef) -> Result<Value, RemoteError> {
        tracing::debug!(%entity, "fetching");
        let response = self.authorize(self.client.get(self.url(entity))).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                entity,
                status: status.as_u16(),
            });
        }
        Ok(response.json()?)
    }

    fn push(&self, entity: EntityRef, document: &Value) -> Result<u16, RemoteError> {
        tracing::info!(%entity, "using API to update");
        let response = self.authorize(self.client.put(self.url(entity)).json(document)).send()?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmig_schema::{CardId, DashboardId};

    #[test]
    fn entity_urls() {
        let client = MetabaseClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url(EntityRef::card(CardId(12))), "http://localhost:3000/api/card/12");
        assert_eq!(
            client.url(EntityRef::dashboard(DashboardId(4))),
            "http://localhost:3000/api/dashboard/4"
        );
    }
}
