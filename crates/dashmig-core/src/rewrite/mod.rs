//! Reference rewriter
//!
//! Rewrites, in place, every table, column, card and dashboard reference a
//! fragment holds. Table and column ids go through the equivalence table and
//! then the personalization overrides; card and dashboard ids go through the
//! transformations. A card referenced as a data source is migrated first,
//! through [`CardDependencies`].

mod card;
mod query;
mod settings;

pub(crate) use settings::is_text_setting;

use crate::entity::EntityRef;
use crate::error::MigrationError;
use crate::query::{Clause, FieldTarget};
use dashmig_schema::{CardId, ColumnId, DashboardId, MigrationSchema, TableId};
use serde_json::Value;

/// Resolves cards a fragment depends on
pub trait CardDependencies {
    /// Make sure `card` (a destination id) is migrated before returning
    ///
    /// # Errors
    /// Whatever migrating `card` fails with.
    fn require_card(&mut self, card: CardId) -> Result<(), MigrationError>;
}

/// Records requested cards without migrating them
impl CardDependencies for Vec<CardId> {
    fn require_card(&mut self, card: CardId) -> Result<(), MigrationError> {
        self.push(card);
        Ok(())
    }
}

/// Rewrites fragments of one entity
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    schema: &'a MigrationSchema,
    owner: EntityRef,
}

impl<'a> Rewriter<'a> {
    /// Create rewriter for fragments of `owner`
    #[inline]
    #[must_use]
    pub fn new(schema: &'a MigrationSchema, owner: EntityRef) -> Self {
        Self { schema, owner }
    }

    /// Entity whose fragments are rewritten
    #[inline]
    #[must_use]
    pub fn owner(&self) -> EntityRef {
        self.owner
    }

    /// Destination table
    ///
    /// # Errors
    /// `UnresolvedReference` if the table has no mapping.
    pub fn table(&self, table: TableId) -> Result<TableId, MigrationError> {
        self.schema
            .resolve_table(table)
            .map_err(|source| MigrationError::UnresolvedReference {
                owner: self.owner,
                source,
            })
    }

    /// Destination column, personalization applied
    ///
    /// # Errors
    /// `UnresolvedReference` if the column has no mapping.
    pub fn column(&self, column: ColumnId) -> Result<ColumnId, MigrationError> {
        self.schema
            .replace_column_id(column)
            .map_err(|source| MigrationError::UnresolvedReference {
                owner: self.owner,
                source,
            })
    }

    /// Destination card
    ///
    /// # Errors
    /// `UnknownCardReference` if the card has no transformation.
    pub fn card(&self, card: CardId) -> Result<CardId, MigrationError> {
        self.schema
            .transformations
            .card(card)
            .ok_or(MigrationError::UnknownCardReference {
                owner: self.owner,
                card,
            })
    }

    /// Destination dashboard
    ///
    /// # Errors
    /// `UnknownDashboardReference` if the dashboard has no transformation.
    pub fn dashboard(&self, dashboard: DashboardId) -> Result<DashboardId, MigrationError> {
        self.schema
            .transformations
            .dashboard(dashboard)
            .ok_or(MigrationError::UnknownDashboardReference {
                owner: self.owner,
                dashboard,
            })
    }

    /// Rewrite `node` if it is a field reference
    ///
    /// Returns whether it was one. References by name are replaced only when
    /// a name override exists.
    ///
    /// # Errors
    /// `UnresolvedReference` for an unmapped column id.
    pub fn field_ref(&self, node: &mut Value) -> Result<bool, MigrationError> {
        let Clause::FieldRef(target) = Clause::decode(node) else {
            return Ok(false);
        };
        match target {
            FieldTarget::Id(column) => {
                let column = self.column(column)?;
                if let Some(slot) = node.get_mut(1) {
                    *slot = column.into();
                }
            }
            FieldTarget::Name(name) => match self.schema.replace_column_name(&name) {
                Some(replacement) => {
                    if let Some(slot) = node.get_mut(1) {
                        *slot = Value::String(replacement.to_string());
                    }
                }
                None => tracing::debug!(owner = %self.owner, field = %name, "field referenced by name, no replacement"),
            },
            FieldTarget::Unknown => tracing::debug!(owner = %self.owner, node = %node, "field reference left alone"),
        }
        Ok(true)
    }

    fn card_id(&self, value: &Value) -> Result<CardId, MigrationError> {
        CardId::from_json(value).ok_or_else(|| MigrationError::malformed(self.owner, format!("card id {value}")))
    }

    fn table_id(&self, value: &Value) -> Result<TableId, MigrationError> {
        TableId::from_json(value).ok_or_else(|| MigrationError::malformed(self.owner, format!("table id {value}")))
    }

    fn malformed(&self, detail: impl Into<String>) -> MigrationError {
        MigrationError::malformed(self.owner, detail)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use dashmig_schema::{
        CardId, ColumnId, DashboardId, DatabaseId, EquivalenceTable, MigrationSchema, Personalization, TableId,
        Transformations,
    };

    /// Tables 10 → 110 and 20 → 120; column 1101 personalized to 1105
    pub(crate) fn schema() -> MigrationSchema {
        let mut tables = EquivalenceTable::new();
        tables.insert_table(TableId(10), TableId(110)).unwrap();
        tables.insert_table(TableId(20), TableId(120)).unwrap();
        tables.insert_column(TableId(10), ColumnId(100), ColumnId(1100)).unwrap();
        tables.insert_column(TableId(10), ColumnId(101), ColumnId(1101)).unwrap();
        tables.insert_column(TableId(20), ColumnId(200), ColumnId(1200)).unwrap();
        MigrationSchema::new(DatabaseId(3), tables)
            .with_personalization(
                Personalization::none()
                    .with_column(ColumnId(1101), Some(TableId(110)), ColumnId(1105))
                    .with_field_name("TOTAL", "TOTAL_EUR"),
            )
            .with_transformations(
                Transformations::new()
                    .with_card(CardId(12), CardId(112))
                    .with_card(CardId(13), CardId(113))
                    .with_dashboard(DashboardId(4), DashboardId(104)),
            )
    }
}
