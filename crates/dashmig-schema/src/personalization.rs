//! Business-specific column substitutions
//!
//! Overrides are keyed by *destination* ids: they are looked up after the
//! equivalence table has resolved a column, never before.

use crate::ids::{ColumnId, TableId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// On-disk form of the personalization options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationOptions {
    /// Column id overrides
    #[serde(default)]
    pub columns: Vec<ColumnReplacement>,
    /// Column name overrides (for references by name)
    #[serde(default)]
    pub field_names: BTreeMap<String, String>,
}

/// One column id override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReplacement {
    /// Destination column being replaced
    pub column: ColumnId,
    /// Restrict the override to this destination table
    #[serde(default)]
    pub table: Option<TableId>,
    /// Replacement column
    pub replacement: ColumnId,
}

/// Indexed personalization overrides
#[derive(Debug, Clone, Default)]
pub struct Personalization {
    by_column: HashMap<(Option<TableId>, ColumnId), ColumnId>,
    by_name: HashMap<String, String>,
}

impl Personalization {
    /// No overrides at all
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Index the on-disk options
    #[must_use]
    pub fn from_options(options: &PersonalizationOptions) -> Self {
        let mut by_column = HashMap::with_capacity(options.columns.len());
        for r in &options.columns {
            if by_column.insert((r.table, r.column), r.replacement).is_some() {
                tracing::warn!(column = %r.column, "column override given twice, keeping the last one");
            }
        }
        Self {
            by_column,
            by_name: options
                .field_names
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Add a column override
    #[must_use]
    pub fn with_column(mut self, column: ColumnId, table: Option<TableId>, replacement: ColumnId) -> Self {
        self.by_column.insert((table, column), replacement);
        self
    }

    /// Add a name override
    #[must_use]
    pub fn with_field_name(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.by_name.insert(name.into(), replacement.into());
        self
    }

    /// Replacement for a resolved destination column
    ///
    /// A table-qualified override wins over an unqualified one.
    #[must_use]
    pub fn replacement_column_id_for(&self, column: ColumnId, table: TableId) -> Option<ColumnId> {
        self.by_column
            .get(&(Some(table), column))
            .or_else(|| self.by_column.get(&(None, column)))
            .copied()
    }

    /// Is `column` the replacement of some override?
    ///
    /// Replacements are destination columns a migrated document may already
    /// reference.
    #[must_use]
    pub fn is_replacement(&self, column: ColumnId) -> bool {
        self.by_column.values().any(|r| *r == column)
    }

    /// Replacement for a column referenced by name
    #[inline]
    #[must_use]
    pub fn field_name_replacement(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Check if there are no overrides
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty() && self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_override_wins() {
        let p = Personalization::none()
            .with_column(ColumnId(5), None, ColumnId(50))
            .with_column(ColumnId(5), Some(TableId(1)), ColumnId(51));

        assert_eq!(p.replacement_column_id_for(ColumnId(5), TableId(1)), Some(ColumnId(51)));
        assert_eq!(p.replacement_column_id_for(ColumnId(5), TableId(2)), Some(ColumnId(50)));
        assert_eq!(p.replacement_column_id_for(ColumnId(6), TableId(1)), None);
        assert!(p.is_replacement(ColumnId(51)));
        assert!(!p.is_replacement(ColumnId(5)));
    }

    #[test]
    fn from_options_indexes_everything() {
        let yaml = r"
columns:
  - { column: 1100, table: 110, replacement: 1105 }
  - { column: 1101, replacement: 1106 }
field_names:
  TOTAL: TOTAL_EUR
";
        let options: PersonalizationOptions = serde_yaml::from_str(yaml).unwrap();
        let p = Personalization::from_options(&options);

        assert_eq!(
            p.replacement_column_id_for(ColumnId(1100), TableId(110)),
            Some(ColumnId(1105))
        );
        assert_eq!(p.replacement_column_id_for(ColumnId(1100), TableId(111)), None);
        assert_eq!(
            p.replacement_column_id_for(ColumnId(1101), TableId(999)),
            Some(ColumnId(1106))
        );
        assert_eq!(p.field_name_replacement("TOTAL"), Some("TOTAL_EUR"));
        assert_eq!(p.field_name_replacement("COUNT"), None);
        assert!(!p.is_empty());
    }
}
