//! Table and column equivalences between source and destination schemas
//!
//! The table is built once per run and only read afterwards. Lookups accept
//! both source ids (mapped) and destination ids (returned unchanged), which
//! makes rewriting an already-migrated document a no-op.

use crate::error::SchemaError;
use crate::ids::{ColumnId, TableId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-disk form of the equivalence table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesSpec {
    /// One entry per source table
    #[serde(default)]
    pub tables: Vec<TableMapping>,
}

/// Mapping of one source table and its columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMapping {
    /// Table id at source
    pub source: TableId,
    /// Unique table id at destination
    pub destination: TableId,
    /// Column mappings for this table
    #[serde(default)]
    pub columns: Vec<ColumnMapping>,
}

/// Mapping of one source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column id at source
    pub source: ColumnId,
    /// Column id at destination
    pub destination: ColumnId,
}

/// Result of resolving a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Destination column id
    pub column: ColumnId,
    /// Table owning the column at source
    pub source_table: TableId,
    /// Table owning the column at destination
    pub table: TableId,
}

/// Bidirectional lookup from source ids to destination ids
#[derive(Debug, Clone, Default)]
pub struct EquivalenceTable {
    /// source table -> destination table
    tables: HashMap<TableId, TableId>,
    /// destination table -> source table
    destination_tables: HashMap<TableId, TableId>,
    /// source column -> resolution
    columns: HashMap<ColumnId, ResolvedColumn>,
    /// destination column -> resolution (identity on the column)
    destination_columns: HashMap<ColumnId, ResolvedColumn>,
}

impl EquivalenceTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the on-disk form
    ///
    /// # Errors
    /// `DuplicateTable` / `DuplicateColumn` if a source id appears twice.
    pub fn from_spec(spec: &TablesSpec) -> Result<Self, SchemaError> {
        let mut table = Self::new();
        for mapping in &spec.tables {
            table.insert_table(mapping.source, mapping.destination)?;
            for column in &mapping.columns {
                table.insert_column(mapping.source, column.source, column.destination)?;
            }
        }
        tracing::debug!(
            tables = table.table_count(),
            columns = table.column_count(),
            "equivalence table built"
        );
        Ok(table)
    }

    /// Register a table equivalence
    ///
    /// # Errors
    /// `DuplicateTable` if `source` is already mapped.
    pub fn insert_table(&mut self, source: TableId, destination: TableId) -> Result<(), SchemaError> {
        if self.tables.contains_key(&source) {
            return Err(SchemaError::DuplicateTable(source));
        }
        self.tables.insert(source, destination);
        self.destination_tables.entry(destination).or_insert(source);
        Ok(())
    }

    /// Register a column equivalence; its table must already be registered
    ///
    /// # Errors
    /// - `UnresolvedTable` if `source_table` was never inserted
    /// - `DuplicateColumn` if `source` is already mapped
    pub fn insert_column(
        &mut self,
        source_table: TableId,
        source: ColumnId,
        destination: ColumnId,
    ) -> Result<(), SchemaError> {
        let table = *self
            .tables
            .get(&source_table)
            .ok_or(SchemaError::UnresolvedTable(source_table))?;
        if self.columns.contains_key(&source) {
            return Err(SchemaError::DuplicateColumn(source));
        }
        let resolved = ResolvedColumn {
            column: destination,
            source_table,
            table,
        };
        self.columns.insert(source, resolved);
        self.destination_columns.entry(destination).or_insert(resolved);
        Ok(())
    }

    /// Destination table for `table_id`
    ///
    /// Source ids take precedence; an id that is not a source id but is a
    /// known destination id resolves to itself.
    ///
    /// # Errors
    /// `UnresolvedTable` if the id is neither.
    pub fn resolve_table(&self, table_id: TableId) -> Result<TableId, SchemaError> {
        if let Some(destination) = self.tables.get(&table_id) {
            return Ok(*destination);
        }
        if self.is_destination_table(table_id) {
            return Ok(table_id);
        }
        Err(SchemaError::UnresolvedTable(table_id))
    }

    /// Destination column (and its tables) for `column_id`
    ///
    /// Same precedence rules as [`resolve_table`](Self::resolve_table).
    ///
    /// # Errors
    /// `UnresolvedColumn` if the id is neither a source nor a destination id.
    pub fn resolve_column(&self, column_id: ColumnId) -> Result<ResolvedColumn, SchemaError> {
        self.columns
            .get(&column_id)
            .or_else(|| self.destination_columns.get(&column_id))
            .copied()
            .ok_or(SchemaError::UnresolvedColumn(column_id))
    }

    /// Is `table_id` a destination table?
    #[inline]
    #[must_use]
    pub fn is_destination_table(&self, table_id: TableId) -> bool {
        self.destination_tables.contains_key(&table_id)
    }

    /// Is `column_id` a destination column?
    #[inline]
    #[must_use]
    pub fn is_destination_column(&self, column_id: ColumnId) -> bool {
        self.destination_columns.contains_key(&column_id)
    }

    /// Destination table owning a destination column
    #[inline]
    #[must_use]
    pub fn destination_table_of(&self, column_id: ColumnId) -> Option<TableId> {
        self.destination_columns.get(&column_id).map(|r| r.table)
    }

    /// Number of mapped source tables
    #[inline]
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of mapped source columns
    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> EquivalenceTable {
        let spec = TablesSpec {
            tables: vec![
                TableMapping {
                    source: TableId(10),
                    destination: TableId(110),
                    columns: vec![
                        ColumnMapping {
                            source: ColumnId(100),
                            destination: ColumnId(1100),
                        },
                        ColumnMapping {
                            source: ColumnId(101),
                            destination: ColumnId(1101),
                        },
                    ],
                },
                TableMapping {
                    source: TableId(20),
                    destination: TableId(120),
                    columns: vec![],
                },
            ],
        };
        EquivalenceTable::from_spec(&spec).unwrap()
    }

    #[test]
    fn resolves_source_tables() {
        let table = sample();
        assert_eq!(table.resolve_table(TableId(10)).unwrap(), TableId(110));
        assert_eq!(table.resolve_table(TableId(20)).unwrap(), TableId(120));
    }

    #[test]
    fn destination_table_resolves_to_itself() {
        let table = sample();
        assert_eq!(table.resolve_table(TableId(110)).unwrap(), TableId(110));
    }

    #[test]
    fn unknown_table_is_unresolved() {
        let err = sample().resolve_table(TableId(99)).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedTable(TableId(99))));
    }

    #[test]
    fn resolves_columns_with_tables() {
        let resolved = sample().resolve_column(ColumnId(101)).unwrap();
        assert_eq!(
            resolved,
            ResolvedColumn {
                column: ColumnId(1101),
                source_table: TableId(10),
                table: TableId(110),
            }
        );
    }

    #[test]
    fn destination_column_resolves_to_itself() {
        let table = sample();
        let resolved = table.resolve_column(ColumnId(1100)).unwrap();
        assert_eq!(resolved.column, ColumnId(1100));
        assert_eq!(resolved.table, TableId(110));
        assert_eq!(table.destination_table_of(ColumnId(1100)), Some(TableId(110)));
    }

    #[test]
    fn unknown_column_is_unresolved() {
        let err = sample().resolve_column(ColumnId(5)).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedColumn(ColumnId(5))));
    }

    #[test]
    fn rejects_duplicates() {
        let mut table = sample();
        assert!(matches!(
            table.insert_table(TableId(10), TableId(111)),
            Err(SchemaError::DuplicateTable(TableId(10)))
        ));
        assert!(matches!(
            table.insert_column(TableId(10), ColumnId(100), ColumnId(1)),
            Err(SchemaError::DuplicateColumn(ColumnId(100)))
        ));
    }

    #[test]
    fn column_requires_known_table() {
        let mut table = EquivalenceTable::new();
        assert!(matches!(
            table.insert_column(TableId(1), ColumnId(2), ColumnId(3)),
            Err(SchemaError::UnresolvedTable(TableId(1)))
        ));
    }

    proptest! {
        #[test]
        fn prop_every_mapped_column_resolves_to_its_destination(
            pairs in proptest::collection::btree_map(0u64..10_000, 10_000u64..20_000, 0..50)
        ) {
            let mut table = EquivalenceTable::new();
            table.insert_table(TableId(1), TableId(2)).unwrap();
            for (src, dst) in &pairs {
                table.insert_column(TableId(1), ColumnId(*src), ColumnId(*dst)).unwrap();
            }
            for (src, dst) in &pairs {
                let resolved = table.resolve_column(ColumnId(*src)).unwrap();
                prop_assert_eq!(resolved.column, ColumnId(*dst));
                prop_assert_eq!(resolved.table, TableId(2));
                // and resolving the destination again is a fixed point
                let again = table.resolve_column(resolved.column).unwrap();
                prop_assert_eq!(again.column, resolved.column);
            }
        }
    }
}
