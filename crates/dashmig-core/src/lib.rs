//! dashmig core
//!
//! Migrates saved questions ("cards") and dashboards of an analytics
//! installation from one database schema to another: every table, column,
//! card and dashboard reference inside the stored JSON documents is
//! rewritten to its destination counterpart, then the document is pushed
//! back.
//!
//! - [`traverse`]: depth-first walk over a card or dashboard document with
//!   a context stack of the enclosing structure
//! - [`rewrite`]: per-fragment reference rewriting
//! - [`labels`]: extraction and replacement of user-visible text
//! - [`migration`]: memoized, dependency-first migration session over a
//!   remote installation
//! - [`config`]: run configuration
//!
//! # Example
//!
//! ```rust
//! use dashmig_core::{Card, ContextStack, Visitor};
//! use dashmig_schema::CardId;
//! use serde_json::{json, Value};
//!
//! /// Counts the nodes a walk visits
//! struct Count;
//!
//! impl Visitor for Count {
//!     type Output = usize;
//!     type Error = std::convert::Infallible;
//!
//!     fn visit(&mut self, _: &mut Value, _: &ContextStack) -> Result<usize, Self::Error> {
//!         Ok(1)
//!     }
//! }
//!
//! let mut card = Card::new(
//!     CardId(12),
//!     json!({"name": "Orders", "dataset_query": {"query": {"source-table": 10}}}),
//! )
//! .unwrap();
//! // query part, then the card itself
//! assert_eq!(card.traverse(&mut Count).unwrap(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod entity;
pub mod error;
pub mod labels;
pub mod migration;
pub mod query;
pub mod rewrite;
pub mod traverse;

// Re-exports
pub use config::{ConfigError, MigrationConfig, ServerConfig, TranslationConfig};
pub use entity::{Card, Dashboard, EntityKind, EntityRef};
pub use error::{MigrationError, RemoteError};
pub use labels::{LabelCollector, LabelReplacer};
pub use migration::{MetabaseClient, MigrationSession, MigrationVisitor, RemoteEntities};
pub use rewrite::{CardDependencies, Rewriter};
pub use traverse::{Accumulate, ContextStack, Frame, StackGuard, Visitor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
