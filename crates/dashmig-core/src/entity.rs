//! Migratable entities: cards and dashboards

use crate::error::MigrationError;
use crate::traverse::{walk_card, walk_dashboard, ContextStack, Visitor};
use dashmig_schema::{CardId, DashboardId};
use serde_json::Value;
use std::fmt;

/// Kind of a remote entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Saved question
    Card,
    /// Collection of cards
    Dashboard,
}

impl EntityKind {
    /// Path segment of the entity in the platform API
    #[inline]
    #[must_use]
    pub fn api_path(&self) -> &'static str {
        match self {
            EntityKind::Card => "card",
            EntityKind::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_path())
    }
}

/// Typed reference to one remote entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    /// Entity kind
    pub kind: EntityKind,
    /// Raw id
    pub id: u64,
}

impl EntityRef {
    /// Reference to a card
    #[inline]
    #[must_use]
    pub fn card(id: CardId) -> Self {
        Self {
            kind: EntityKind::Card,
            id: id.get(),
        }
    }

    /// Reference to a dashboard
    #[inline]
    #[must_use]
    pub fn dashboard(id: DashboardId) -> Self {
        Self {
            kind: EntityKind::Dashboard,
            id: id.get(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

fn object_document(entity: EntityRef, json: Value) -> Result<Value, MigrationError> {
    if json.is_object() {
        Ok(json)
    } else {
        Err(MigrationError::InvalidDocument {
            entity,
            detail: format!("expected a JSON object, got {}", json_type(&json)),
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A card document being migrated
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    id: CardId,
    json: Value,
}

impl Card {
    /// Wrap the document of card `id`
    ///
    /// # Errors
    /// `InvalidDocument` if `json` is not an object.
    pub fn new(id: CardId, json: Value) -> Result<Self, MigrationError> {
        let json = object_document(EntityRef::card(id), json)?;
        Ok(Self { id, json })
    }

    /// Card id
    #[inline]
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Reference to this card
    #[inline]
    #[must_use]
    pub fn entity(&self) -> EntityRef {
        EntityRef::card(self.id)
    }

    /// Current document
    #[inline]
    #[must_use]
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Take the document
    #[inline]
    #[must_use]
    pub fn into_json(self) -> Value {
        self.json
    }

    /// Traverse with a fresh context stack
    ///
    /// # Errors
    /// The first error returned by `visitor`.
    pub fn traverse<V: Visitor>(&mut self, visitor: &mut V) -> Result<V::Output, V::Error> {
        let mut stack = ContextStack::new();
        self.traverse_with(visitor, &mut stack)
    }

    /// Traverse on top of an existing context stack
    ///
    /// The stack is left exactly as it was, on success and on error.
    ///
    /// # Errors
    /// The first error returned by `visitor`.
    pub fn traverse_with<V: Visitor>(
        &mut self,
        visitor: &mut V,
        stack: &mut ContextStack,
    ) -> Result<V::Output, V::Error> {
        walk_card(&mut self.json, visitor, stack)
    }
}

/// A dashboard document being migrated
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    id: DashboardId,
    json: Value,
}

impl Dashboard {
    /// Wrap the document of dashboard `id`
    ///
    /// # Errors
    /// `InvalidDocument` if `json` is not an object.
    pub fn new(id: DashboardId, json: Value) -> Result<Self, MigrationError> {
        let json = object_document(EntityRef::dashboard(id), json)?;
        Ok(Self { id, json })
    }

    /// Dashboard id
    #[inline]
    #[must_use]
    pub fn id(&self) -> DashboardId {
        self.id
    }

    /// Reference to this dashboard
    #[inline]
    #[must_use]
    pub fn entity(&self) -> EntityRef {
        EntityRef::dashboard(self.id)
    }

    /// Current document
    #[inline]
    #[must_use]
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Take the document
    #[inline]
    #[must_use]
    pub fn into_json(self) -> Value {
        self.json
    }

    /// Traverse with a fresh context stack
    ///
    /// # Errors
    /// The first error returned by `visitor`.
    pub fn traverse<V: Visitor>(&mut self, visitor: &mut V) -> Result<V::Output, V::Error> {
        let mut stack = ContextStack::new();
        self.traverse_with(visitor, &mut stack)
    }

    /// Traverse on top of an existing context stack
    ///
    /// # Errors
    /// The first error returned by `visitor`.
    pub fn traverse_with<V: Visitor>(
        &mut self,
        visitor: &mut V,
        stack: &mut ContextStack,
    ) -> Result<V::Output, V::Error> {
        walk_dashboard(&mut self.json, visitor, stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_display() {
        assert_eq!(EntityRef::card(CardId(12)).to_string(), "card 12");
        assert_eq!(EntityRef::dashboard(DashboardId(4)).to_string(), "dashboard 4");
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = Card::new(CardId(1), json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "invalid document for card 1: expected a JSON object, got an array");
        assert!(Dashboard::new(DashboardId(1), json!({"dashcards": []})).is_ok());
    }
}
