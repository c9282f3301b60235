//! dashmig schema mapping
//!
//! Everything the rewriter needs to know about the destination installation:
//!
//! - [`EquivalenceTable`]: source table/column id → destination table/column id
//! - [`Personalization`]: business-specific column substitutions applied
//!   *after* base resolution
//! - [`Transformations`]: source card/dashboard id → destination id
//! - [`MigrationSchema`]: the bundle of the above plus the target database,
//!   with the two-stage column resolution used by every rewrite site
//!
//! # Example
//!
//! ```rust
//! use dashmig_schema::{ColumnId, EquivalenceTable, TableId};
//!
//! let mut table = EquivalenceTable::new();
//! table.insert_table(TableId(10), TableId(110)).unwrap();
//! table
//!     .insert_column(TableId(10), ColumnId(100), ColumnId(1100))
//!     .unwrap();
//!
//! assert_eq!(table.resolve_table(TableId(10)).unwrap(), TableId(110));
//! // destination ids resolve to themselves
//! assert_eq!(table.resolve_table(TableId(110)).unwrap(), TableId(110));
//! assert_eq!(table.resolve_column(ColumnId(100)).unwrap().column, ColumnId(1100));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod equivalence;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod personalization;
pub mod transformations;

// Re-exports
pub use document::{parse_document, read_document, DocumentFormat};
pub use equivalence::{ColumnMapping, EquivalenceTable, ResolvedColumn, TableMapping, TablesSpec};
pub use error::SchemaError;
pub use ids::{CardId, ColumnId, DashboardId, DatabaseId, TableId};
pub use mapping::MigrationSchema;
pub use personalization::{ColumnReplacement, Personalization, PersonalizationOptions};
pub use transformations::Transformations;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
