//! Error types for migration
//!
//! Every error that aborts an entity names the entity it aborted, so a
//! failing dashboard points at the card (or table, or column) responsible.

use crate::entity::EntityRef;
use dashmig_schema::{CardId, DashboardId, SchemaError};
use dashmig_translate::TranslationError;

/// Errors raised while migrating cards and dashboards
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A table or column has no destination counterpart
    #[error("[re-writing references on {owner}] {source}")]
    UnresolvedReference {
        /// Entity being migrated
        owner: EntityRef,
        /// Failed lookup
        #[source]
        source: SchemaError,
    },

    /// A query or settings fragment has a shape the rewriter does not know
    #[error("[re-writing references on {owner}] malformed query: {detail}")]
    MalformedQueryShape {
        /// Entity being migrated
        owner: EntityRef,
        /// What was found
        detail: String,
    },

    /// A card is referenced but has no transformation
    #[error("[re-writing references on {owner}] card {card} is referenced, but no replacement is specified")]
    UnknownCardReference {
        /// Entity being migrated
        owner: EntityRef,
        /// Referenced card
        card: CardId,
    },

    /// A dashboard is referenced but has no transformation
    #[error("[re-writing references on {owner}] dashboard {dashboard} is referenced, but no replacement is specified")]
    UnknownDashboardReference {
        /// Entity being migrated
        owner: EntityRef,
        /// Referenced dashboard
        dashboard: DashboardId,
    },

    /// Cards reference each other in a loop
    #[error("cyclic card reference: {}", format_chain(chain))]
    CyclicCardReference {
        /// Cards being migrated, outermost first, ending with the re-entered card
        chain: Vec<CardId>,
    },

    /// The remote refused the rewritten document
    #[error("problems updating {entity}; code {status}")]
    PushFailure {
        /// Entity pushed
        entity: EntityRef,
        /// HTTP status returned
        status: u16,
    },

    /// The fetched document is not usable
    #[error("invalid document for {entity}: {detail}")]
    InvalidDocument {
        /// Entity fetched
        entity: EntityRef,
        /// What is wrong with it
        detail: String,
    },

    /// Fetching or pushing failed
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Translating a label failed
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),
}

fn format_chain(chain: &[CardId]) -> String {
    chain
        .iter()
        .map(|c| format!("card {c}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl MigrationError {
    /// Create malformed-shape error
    pub fn malformed(owner: EntityRef, detail: impl Into<String>) -> Self {
        Self::MalformedQueryShape {
            owner,
            detail: detail.into(),
        }
    }

    /// Check if running the same migration again could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PushFailure { .. } | Self::Remote(RemoteError::Http(_) | RemoteError::Status { .. })
        )
    }

    /// Check if this is an unresolved table/column reference
    #[inline]
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }
}

/// Errors talking to the remote installation
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport or decoding failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected status while fetching
    #[error("fetching {entity} returned status {status}")]
    Status {
        /// Entity requested
        entity: EntityRef,
        /// HTTP status returned
        status: u16,
    },

    /// Entity does not exist (in-memory remotes)
    #[error("{0} not found")]
    NotFound(EntityRef),
}
