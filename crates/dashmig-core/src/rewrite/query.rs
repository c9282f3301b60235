//! Query IR fragments: query parts and joins

use super::{CardDependencies, Rewriter};
use crate::error::MigrationError;
use crate::query::{Clause, SourceTable};
use serde_json::Value;

impl Rewriter<'_> {
    /// Rewrite one query part
    ///
    /// `source-query` and `joins` are not touched: the traversal visits
    /// them as their own frames.
    ///
    /// # Errors
    /// Unresolved references, malformed clauses, and failures migrating a
    /// card used as data source.
    pub fn query_part(&self, query: &mut Value, deps: &mut dyn CardDependencies) -> Result<(), MigrationError> {
        let Some(query) = query.as_object_mut() else {
            return Ok(());
        };
        for (key, value) in query.iter_mut() {
            match key.as_str() {
                "source-table" => self.source_table(value, deps)?,
                "filter" => self.filter(value)?,
                "aggregation" | "fields" => self.descend(value)?,
                "expressions" => self.expressions(value)?,
                "breakout" => self.breakout(value)?,
                "order-by" => self.order_by(value)?,
                "source-query" | "joins" => {}
                other => tracing::trace!(owner = %self.owner, key = other, "query key left alone"),
            }
        }
        Ok(())
    }

    /// Rewrite one join: its source and its condition and fields
    ///
    /// # Errors
    /// As [`Rewriter::query_part`].
    pub fn join(&self, join: &mut Value, deps: &mut dyn CardDependencies) -> Result<(), MigrationError> {
        let Some(join) = join.as_object_mut() else {
            return Ok(());
        };
        for (key, value) in join.iter_mut() {
            match key.as_str() {
                "source-table" => self.source_table(value, deps)?,
                "condition" | "fields" => self.descend(value)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn source_table(&self, value: &mut Value, deps: &mut dyn CardDependencies) -> Result<(), MigrationError> {
        match SourceTable::decode(value) {
            SourceTable::Table(table) => *value = self.table(table)?.into(),
            SourceTable::Card(card) => {
                let destination = self.card(card)?;
                tracing::debug!(owner = %self.owner, card = %destination, "migrating referenced card");
                deps.require_card(destination)?;
                *value = SourceTable::Card(destination).encode();
            }
            SourceTable::Unknown(raw) => {
                return Err(self.malformed(format!("unknown source-table reference {raw}")));
            }
        }
        Ok(())
    }

    /// Filters: field references, comparisons, logical connectives, literals
    fn filter(&self, node: &mut Value) -> Result<(), MigrationError> {
        match Clause::decode(node) {
            Clause::Constant => Ok(()),
            Clause::FieldRef(_) => self.field_ref(node).map(|_| ()),
            Clause::Comparison { operator, arity } => {
                if arity != 2 {
                    return Err(self.malformed(format!("'{operator}' expects 2 operands, got {arity}")));
                }
                self.filter_operands(node)
            }
            Clause::Logical { operator, arity } => {
                if arity < 2 {
                    return Err(self.malformed(format!("'{operator}' expects at least 2 operands, got {arity}")));
                }
                self.filter_operands(node)
            }
            Clause::AggregationRef(_) => Err(self.malformed("aggregation reference in filter")),
            Clause::Other(operator) => Err(self.malformed(format!("unsupported filter operator '{operator}'"))),
        }
    }

    fn filter_operands(&self, node: &mut Value) -> Result<(), MigrationError> {
        if let Some(items) = node.as_array_mut() {
            for operand in items.iter_mut().skip(1) {
                self.filter(operand)?;
            }
        }
        Ok(())
    }

    /// Generic descent: rewrite field references at any depth of nested lists
    fn descend(&self, node: &mut Value) -> Result<(), MigrationError> {
        if self.field_ref(node)? {
            return Ok(());
        }
        if let Some(items) = node.as_array_mut() {
            for item in items.iter_mut().filter(|i| i.is_array()) {
                self.descend(item)?;
            }
        }
        Ok(())
    }

    fn expressions(&self, node: &mut Value) -> Result<(), MigrationError> {
        let Some(expressions) = node.as_object_mut() else {
            return Err(self.malformed(format!("expressions must be a map, got {node}")));
        };
        for expression in expressions.values_mut() {
            self.descend(expression)?;
        }
        Ok(())
    }

    fn breakout(&self, node: &mut Value) -> Result<(), MigrationError> {
        let Some(breakouts) = node.as_array_mut() else {
            return Err(self.malformed(format!("breakout must be a list, got {node}")));
        };
        for breakout in breakouts {
            self.field_ref(breakout)?;
        }
        Ok(())
    }

    /// `[direction, reference]` pairs; aggregation references are skipped
    fn order_by(&self, node: &mut Value) -> Result<(), MigrationError> {
        let Some(orderings) = node.as_array_mut() else {
            return Err(self.malformed(format!("order-by must be a list, got {node}")));
        };
        for ordering in orderings {
            let Some(reference) = ordering.get_mut(1) else {
                return Err(self.malformed(format!("order-by entry {ordering}")));
            };
            if !matches!(Clause::decode(reference), Clause::AggregationRef(_)) {
                self.field_ref(reference)?;
            }
        }
        Ok(())
    }
}
