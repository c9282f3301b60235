//! Everything the rewriter reads while migrating one run

use crate::equivalence::{EquivalenceTable, ResolvedColumn};
use crate::error::SchemaError;
use crate::ids::{ColumnId, DatabaseId, TableId};
use crate::personalization::Personalization;
use crate::transformations::Transformations;

/// Read-only schema mapping for a migration run
#[derive(Debug, Clone)]
pub struct MigrationSchema {
    /// Database all migrated queries point to
    pub db_target: DatabaseId,
    /// Table and column equivalences
    pub tables: EquivalenceTable,
    /// Column overrides
    pub personalization: Personalization,
    /// Card and dashboard id transformations
    pub transformations: Transformations,
}

impl MigrationSchema {
    /// Create schema with no personalization and no transformations
    #[inline]
    #[must_use]
    pub fn new(db_target: DatabaseId, tables: EquivalenceTable) -> Self {
        Self {
            db_target,
            tables,
            personalization: Personalization::none(),
            transformations: Transformations::new(),
        }
    }

    /// With personalization overrides
    #[inline]
    #[must_use]
    pub fn with_personalization(mut self, personalization: Personalization) -> Self {
        self.personalization = personalization;
        self
    }

    /// With card/dashboard transformations
    #[inline]
    #[must_use]
    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = transformations;
        self
    }

    /// Destination table for `table_id`
    ///
    /// # Errors
    /// `UnresolvedTable` if the table has no mapping.
    #[inline]
    pub fn resolve_table(&self, table_id: TableId) -> Result<TableId, SchemaError> {
        self.tables.resolve_table(table_id)
    }

    /// Two-stage column resolution: equivalence first, then personalization
    ///
    /// The override is looked up with the *resolved* destination column and
    /// table. An override's replacement that the equivalence table does not
    /// know resolves to itself, so a migrated document migrates unchanged.
    ///
    /// # Errors
    /// `UnresolvedColumn` if the column has no mapping.
    pub fn replace_column_id(&self, column_id: ColumnId) -> Result<ColumnId, SchemaError> {
        match self.tables.resolve_column(column_id) {
            Ok(ResolvedColumn { column, table, .. }) => Ok(self
                .personalization
                .replacement_column_id_for(column, table)
                .unwrap_or(column)),
            Err(_) if self.personalization.is_replacement(column_id) => Ok(column_id),
            Err(err) => Err(err),
        }
    }

    /// Replacement for a column referenced by name, if any
    #[inline]
    #[must_use]
    pub fn replace_column_name(&self, name: &str) -> Option<&str> {
        self.personalization.field_name_replacement(name)
    }
}
