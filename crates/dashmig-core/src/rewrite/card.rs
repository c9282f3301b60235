//! Card nodes, dashcards, parameter mappings and dashboard parameters

use super::{CardDependencies, Rewriter};
use crate::error::MigrationError;
use crate::query::{Clause, FieldTarget};
use serde_json::Value;

impl Rewriter<'_> {
    /// Rewrite the references a card node holds directly
    ///
    /// Database ids point to the target database; `table_id` and
    /// `result_metadata` are resolved. A null `database_id` stays null.
    ///
    /// # Errors
    /// `UnresolvedReference` for an unmapped table or column.
    pub fn card_node(&self, card: &mut Value) -> Result<(), MigrationError> {
        let Some(card) = card.as_object_mut() else {
            return Ok(());
        };
        let database = self.schema.db_target;

        if let Some(database_id) = card.get_mut("database_id").filter(|d| !d.is_null()) {
            *database_id = database.into();
        }
        if let Some(query) = card.get_mut("dataset_query").and_then(Value::as_object_mut) {
            query.insert("database".to_string(), database.into());
        }
        if let Some(table) = card.get_mut("table_id").filter(|t| !t.is_null()) {
            *table = self.table(self.table_id(table)?)?.into();
        }

        match card.get_mut("result_metadata") {
            Some(Value::Array(metadata)) => {
                for column in metadata.iter_mut() {
                    self.result_metadata(column)?;
                }
            }
            _ => tracing::debug!(owner = %self.owner, "there is no 'result_metadata'"),
        }
        Ok(())
    }

    fn result_metadata(&self, column: &mut Value) -> Result<(), MigrationError> {
        let Some(column) = column.as_object_mut() else {
            return Ok(());
        };
        let mut resolved = None;
        if let Some(field_ref) = column.get_mut("field_ref") {
            if let Clause::FieldRef(FieldTarget::Id(id)) = Clause::decode(field_ref) {
                let id = self.column(id)?;
                if let Some(slot) = field_ref.get_mut(1) {
                    *slot = id.into();
                }
                resolved = Some(id);
            }
        }
        if let Some(id) = resolved {
            column.insert("id".to_string(), id.into());
        }
        if let Some(table) = column.get_mut("table_id").filter(|t| !t.is_null()) {
            *table = self.table(self.table_id(table)?)?.into();
        }
        Ok(())
    }

    /// Rewrite a dashcard node: its card, and the embedded card summary
    ///
    /// The referenced card is migrated before its id is rewritten. Text and
    /// heading dashcards have no card and are left alone.
    ///
    /// # Errors
    /// Unknown card, failure migrating it, unresolved table.
    pub fn dashcard_node(&self, dashcard: &mut Value, deps: &mut dyn CardDependencies) -> Result<(), MigrationError> {
        let Some(dashcard) = dashcard.as_object_mut() else {
            return Ok(());
        };

        if let Some(card_id) = dashcard.get_mut("card_id").filter(|c| !c.is_null()) {
            let destination = self.card(self.card_id(card_id)?)?;
            deps.require_card(destination)?;
            *card_id = destination.into();
        }

        if let Some(card) = dashcard.get_mut("card").and_then(Value::as_object_mut) {
            if let Some(table) = card.get_mut("table_id").filter(|t| !t.is_null()) {
                *table = self.table(self.table_id(table)?)?.into();
            }
            if let Some(database_id) = card.get_mut("database_id").filter(|d| !d.is_null()) {
                *database_id = self.schema.db_target.into();
            }
        }
        Ok(())
    }

    /// Rewrite a parameter mapping: `card_id` and the dimension target
    ///
    /// # Errors
    /// Unknown card, unresolved column.
    pub fn parameter_mapping(&self, mapping: &mut Value) -> Result<(), MigrationError> {
        let Some(mapping) = mapping.as_object_mut() else {
            return Ok(());
        };
        if let Some(card_id) = mapping.get_mut("card_id").filter(|c| !c.is_null()) {
            *card_id = self.card(self.card_id(card_id)?)?.into();
        }
        if let Some(target) = mapping.get_mut("target") {
            if target.get(0).and_then(Value::as_str) == Some("dimension") {
                if let Some(field) = target.get_mut(1) {
                    self.field_ref(field)?;
                }
            }
        }
        Ok(())
    }

    /// Rewrite a dashboard parameter whose values come from a card
    ///
    /// # Errors
    /// Unknown card, failure migrating it, unresolved column.
    pub fn dashboard_parameter(&self, parameter: &mut Value, deps: &mut dyn CardDependencies) -> Result<(), MigrationError> {
        let Some(config) = parameter
            .get_mut("values_source_config")
            .and_then(Value::as_object_mut)
        else {
            return Ok(());
        };
        if let Some(card_id) = config.get_mut("card_id").filter(|c| !c.is_null()) {
            let destination = self.card(self.card_id(card_id)?)?;
            deps.require_card(destination)?;
            *card_id = destination.into();
        }
        if let Some(field) = config.get_mut("value_field") {
            self.field_ref(field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::entity::EntityRef;
    use dashmig_schema::{CardId, DashboardId, SchemaError, TableId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn card_node() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::card(CardId(112)));
        let mut card = json!({
            "id": 112,
            "database_id": 1,
            "table_id": 10,
            "dataset_query": {"database": 1, "type": "query", "query": {}},
            "result_metadata": [
                {"name": "COUNTRY", "id": 100, "table_id": 10, "field_ref": ["field", 100, null]},
                {"name": "count", "field_ref": ["aggregation", 0]}
            ]
        });
        rw.card_node(&mut card).unwrap();
        assert_eq!(
            card,
            json!({
                "id": 112,
                "database_id": 3,
                "table_id": 110,
                "dataset_query": {"database": 3, "type": "query", "query": {}},
                "result_metadata": [
                    {"name": "COUNTRY", "id": 1100, "table_id": 110, "field_ref": ["field", 1100, null]},
                    {"name": "count", "field_ref": ["aggregation", 0]}
                ]
            })
        );
    }

    #[test]
    fn null_database_stays_null() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::card(CardId(112)));
        let mut card = json!({"database_id": null, "table_id": null, "result_metadata": null});
        rw.card_node(&mut card).unwrap();
        assert_eq!(card, json!({"database_id": null, "table_id": null, "result_metadata": null}));
    }

    #[test]
    fn unresolved_table_names_card() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::card(CardId(112)));
        let err = rw.card_node(&mut json!({"table_id": 45})).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::UnresolvedReference { owner, source: SchemaError::UnresolvedTable(TableId(45)) }
                if owner == EntityRef::card(CardId(112))
        ));
    }

    #[test]
    fn dashcard_migrates_its_card_first() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::dashboard(DashboardId(104)));
        let mut deps = Vec::new();
        let mut dashcard = json!({
            "id": 1,
            "card_id": 12,
            "card": {"id": 12, "table_id": 10, "database_id": 1}
        });
        rw.dashcard_node(&mut dashcard, &mut deps).unwrap();
        assert_eq!(deps, vec![CardId(112)]);
        assert_eq!(
            dashcard,
            json!({"id": 1, "card_id": 112, "card": {"id": 12, "table_id": 110, "database_id": 3}})
        );

        let mut text_card = json!({"id": 2, "card_id": null, "card": null});
        rw.dashcard_node(&mut text_card, &mut deps).unwrap();
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn parameter_mapping() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::dashboard(DashboardId(104)));
        let mut mapping = json!({
            "parameter_id": "abc",
            "card_id": 13,
            "target": ["dimension", ["field", 200, null]]
        });
        rw.parameter_mapping(&mut mapping).unwrap();
        assert_eq!(
            mapping,
            json!({"parameter_id": "abc", "card_id": 113, "target": ["dimension", ["field", 1200, null]]})
        );

        let mut variable = json!({"card_id": 113, "target": ["variable", ["template-tag", "country"]]});
        rw.parameter_mapping(&mut variable).unwrap();
        assert_eq!(variable["target"], json!(["variable", ["template-tag", "country"]]));
    }

    #[test]
    fn dashboard_parameter_values_from_card() {
        let schema = fixtures::schema();
        let rw = Rewriter::new(&schema, EntityRef::dashboard(DashboardId(104)));
        let mut deps = Vec::new();
        let mut parameter = json!({
            "id": "abc",
            "name": "Country",
            "values_source_type": "card",
            "values_source_config": {"card_id": 13, "value_field": ["field", 100, null]}
        });
        rw.dashboard_parameter(&mut parameter, &mut deps).unwrap();
        assert_eq!(deps, vec![CardId(113)]);
        assert_eq!(
            parameter["values_source_config"],
            json!({"card_id": 113, "value_field": ["field", 1100, null]})
        );
    }
}
