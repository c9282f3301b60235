//! Visualization settings
//!
//! Settings refer to columns in three ways: field references
//! (`table.columns[].fieldRef`), field references serialized as JSON strings
//! (`table.columns[].key` and the keys of `column_settings`), and plain
//! column names (`graph.dimensions`, `graph.metrics`, `pie.dimension`).

use super::Rewriter;
use crate::error::MigrationError;
use crate::query::Clause;
use dashmig_schema::DashboardId;
use serde_json::Value;

impl Rewriter<'_> {
    /// Rewrite the column names held directly by the settings node
    ///
    /// `table.columns`, `column_settings`, `click_behavior` and
    /// `series_settings` are visited as their own frames.
    pub fn visualization_settings(&self, settings: &mut Value) {
        let Some(settings) = settings.as_object_mut() else {
            return;
        };
        for (key, value) in settings.iter_mut() {
            match key.as_str() {
                "graph.dimensions" | "graph.metrics" | "pie.dimension" => self.column_names(value),
                "table.columns" | "column_settings" | "click_behavior" | "series_settings" => {}
                other => tracing::trace!(owner = %self.owner, key = other, "visualization setting left alone"),
            }
        }
    }

    fn column_names(&self, value: &mut Value) {
        match value {
            Value::String(name) => {
                if let Some(replacement) = self.schema.replace_column_name(name) {
                    *name = replacement.to_string();
                }
            }
            Value::Array(names) => names.iter_mut().for_each(|n| self.column_names(n)),
            _ => {}
        }
    }

    /// Rewrite `table.columns` entries
    ///
    /// # Errors
    /// `UnresolvedReference` for an unmapped column.
    pub fn table_columns(&self, columns: &mut Value) -> Result<(), MigrationError> {
        let Some(columns) = columns.as_array_mut() else {
            return Ok(());
        };
        for column in columns.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(field_ref) = column.get_mut("fieldRef") {
                self.field_ref(field_ref)?;
            }
            if let Some(Value::String(key)) = column.get_mut("key") {
                if let Some(rewritten) = self.serialized_ref(key)? {
                    *key = rewritten;
                }
            }
        }
        Ok(())
    }

    /// Re-key `column_settings`; values are kept as they are
    ///
    /// # Errors
    /// `UnresolvedReference` for an unmapped column.
    pub fn column_settings(&self, settings: &mut Value) -> Result<(), MigrationError> {
        let Some(settings) = settings.as_object_mut() else {
            return Ok(());
        };
        let mut keys = Vec::with_capacity(settings.len());
        for key in settings.keys() {
            keys.push(self.serialized_ref(key)?);
        }
        let old = std::mem::take(settings);
        for ((key, value), rewritten) in old.into_iter().zip(keys) {
            let key = rewritten.unwrap_or(key);
            if settings.contains_key(&key) {
                tracing::warn!(owner = %self.owner, key = %key, "two column settings now refer to the same column; keeping the last one");
            }
            settings.insert(key, value);
        }
        Ok(())
    }

    /// Rewrite a JSON-serialized `["ref", <field reference>]`
    ///
    /// Returns the new serialization, or `None` when `key` is something else.
    fn serialized_ref(&self, key: &str) -> Result<Option<String>, MigrationError> {
        let Ok(mut parsed) = serde_json::from_str::<Value>(key) else {
            return Ok(None);
        };
        if parsed.get(0).and_then(Value::as_str) != Some("ref") {
            return Ok(None);
        }
        let Some(field) = parsed.get_mut(1) else {
            return Ok(None);
        };
        if self.field_ref(field)? {
            Ok(Some(parsed.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Rewrite a click behavior: its target and its parameter mappings
    ///
    /// # Errors
    /// Unknown card/dashboard targets, unresolved columns.
    pub fn click_behavior(&self, click: &mut Value) -> Result<(), MigrationError> {
        let Some(click) = click.as_object_mut() else {
            return Ok(());
        };
        let to_dashboard = click.get("linkType").and_then(Value::as_str) == Some("dashboard");

        if let Some(target) = click.get_mut("targetId").filter(|t| !t.is_null()) {
            *target = if to_dashboard {
                let dashboard = DashboardId::from_json(target)
                    .ok_or_else(|| self.malformed(format!("dashboard id {target}")))?;
                self.dashboard(dashboard)?.into()
            } else {
                let card = self.card_id(target)?;
                self.card(card)?.into()
            };
        }

        if let Some(Value::Object(mappings)) = click.get_mut("parameterMapping") {
            let old = std::mem::take(mappings);
            for (key, mut mapping) in old {
                let key = self.click_mapping(&mut mapping)?.unwrap_or(key);
                mappings.insert(key, mapping);
            }
        }
        Ok(())
    }

    /// Rewrite a dimension target; returns the id the mapping is now keyed by
    fn click_mapping(&self, mapping: &mut Value) -> Result<Option<String>, MigrationError> {
        let Some(target) = mapping.get_mut("target").and_then(Value::as_object_mut) else {
            return Ok(None);
        };
        if target.get("type").and_then(Value::as_str) != Some("dimension") {
            return Ok(None);
        }
        let Some(dimension) = target.get_mut("dimension") else {
            return Ok(None);
        };
        match dimension.get_mut(1) {
            Some(field) if Clause::decode(field).is_field_ref() => {
                self.field_ref(field)?;
            }
            _ => return Ok(None),
        }
        let id = dimension.to_string();
        target.insert("id".to_string(), Value::String(id.clone()));
        if let Some(mapping) = mapping.as_object_mut() {
            mapping.insert("id".to_string(), Value::String(id.clone()));
        }
        Ok(Some(id))
    }
}

/// Settings keys holding translatable text
pub(crate) fn is_text_setting(key: &str) -> bool {
    key == "text" || key.ends_with("title_text") || key == "card.title" || key == "card.description"
}
