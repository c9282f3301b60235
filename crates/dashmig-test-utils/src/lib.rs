//! Testing utilities for dashmig workspace
//!
//! In-memory remote installation, scripted machine translator, and sample
//! schema and documents.

#![allow(missing_docs)]

use dashmig_core::{EntityRef, RemoteEntities, RemoteError};
use dashmig_schema::{
    CardId, ColumnId, DashboardId, DatabaseId, EquivalenceTable, MigrationSchema, Personalization, TableId,
    Transformations,
};
use dashmig_translate::{Language, MachineTranslator, TranslationError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Default)]
struct RemoteState {
    documents: BTreeMap<EntityRef, Value>,
    statuses: BTreeMap<EntityRef, VecDeque<u16>>,
    fetches: Vec<EntityRef>,
    pushes: Vec<(EntityRef, Value)>,
}

/// Remote installation held in memory
///
/// Clones share state, so a test can keep a handle on a remote it gave to a
/// session. Pushes answer 200 unless a status was scripted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(self, id: u64, document: Value) -> Self {
        self.insert(EntityRef::card(CardId(id)), document);
        self
    }

    pub fn with_dashboard(self, id: u64, document: Value) -> Self {
        self.insert(EntityRef::dashboard(DashboardId(id)), document);
        self
    }

    pub fn insert(&self, entity: EntityRef, document: Value) {
        self.state.lock().documents.insert(entity, document);
    }

    /// Answer the next push of `entity` with `status`
    pub fn script_push_status(&self, entity: EntityRef, status: u16) {
        self.state.lock().statuses.entry(entity).or_default().push_back(status);
    }

    pub fn document(&self, entity: EntityRef) -> Option<Value> {
        self.state.lock().documents.get(&entity).cloned()
    }

    /// Every push attempt, in order, refused ones included
    pub fn pushes(&self) -> Vec<EntityRef> {
        self.state.lock().pushes.iter().map(|(entity, _)| *entity).collect()
    }

    pub fn push_count(&self, entity: EntityRef) -> usize {
        self.state.lock().pushes.iter().filter(|(e, _)| *e == entity).count()
    }

    /// Document sent by the last push of `entity`
    pub fn last_pushed(&self, entity: EntityRef) -> Option<Value> {
        self.state
            .lock()
            .pushes
            .iter()
            .rev()
            .find(|(e, _)| *e == entity)
            .map(|(_, document)| document.clone())
    }

    pub fn fetches(&self) -> Vec<EntityRef> {
        self.state.lock().fetches.clone()
    }
}

impl RemoteEntities for InMemoryRemote {
    fn fetch(&self, entity: EntityRef) -> Result<Value, RemoteError> {
        let mut state = self.state.lock();
        state.fetches.push(entity);
        state.documents.get(&entity).cloned().ok_or(RemoteError::NotFound(entity))
    }

    fn push(&self, entity: EntityRef, document: &Value) -> Result<u16, RemoteError> {
        let mut state = self.state.lock();
        let status = state
            .statuses
            .get_mut(&entity)
            .and_then(VecDeque::pop_front)
            .unwrap_or(200);
        state.pushes.push((entity, document.clone()));
        if status == 200 {
            state.documents.insert(entity, document.clone());
        }
        Ok(status)
    }
}

/// Machine translator answering from a fixed table
///
/// Detection always answers the configured language. Sentences missing
/// from the table fail with a provider error. The first `failures` calls
/// to `translate` fail too.
#[derive(Debug, Clone)]
pub struct StubMachineTranslator {
    detected: String,
    translations: BTreeMap<String, String>,
    failures: Arc<Mutex<usize>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubMachineTranslator {
    pub fn new(detected: &str) -> Self {
        Self {
            detected: detected.to_string(),
            translations: BTreeMap::new(),
            failures: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_translation(mut self, text: &str, translation: &str) -> Self {
        self.translations.insert(text.to_string(), translation.to_string());
        self
    }

    pub fn failing_first(self, failures: usize) -> Self {
        *self.failures.lock() = failures;
        self
    }

    /// Sentences sent to `translate`, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl MachineTranslator for StubMachineTranslator {
    fn detect(&self, _text: &str) -> Result<String, TranslationError> {
        Ok(self.detected.clone())
    }

    fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String, TranslationError> {
        self.calls.lock().push(text.to_string());
        let mut failures = self.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(TranslationError::Provider("scripted failure".to_string()));
        }
        self.translations
            .get(text)
            .cloned()
            .ok_or_else(|| TranslationError::Provider(format!("no stub translation for '{text}'")))
    }
}

/// Tables 10 → 110 and 20 → 120, database 3
///
/// Columns 100 → 1100, 101 → 1101 (personalized to 1105), 200 → 1200.
/// Cards 12 → 112, 13 → 113, 14 → 114; dashboard 4 → 104. Field name
/// `TOTAL` becomes `TOTAL_EUR`.
pub fn sample_schema() -> MigrationSchema {
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
                .with_card(CardId(14), CardId(114))
                .with_dashboard(DashboardId(4), DashboardId(104)),
        )
}

/// Saved question over a table, grouped by column `breakout`
pub fn question(id: u64, name: &str, table: u64, breakout: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "database_id": 1,
        "table_id": table,
        "dataset_query": {
            "database": 1,
            "type": "query",
            "query": {
                "source-table": table,
                "aggregation": [["count"]],
                "breakout": [["field", breakout, null]]
            }
        },
        "result_metadata": [
            {"name": "GROUP", "id": breakout, "table_id": table, "field_ref": ["field", breakout, null]},
            {"name": "count", "field_ref": ["aggregation", 0]}
        ],
        "visualization_settings": {
            "column_settings": {
                format!("[\"ref\",[\"field\",{breakout},null]]"): {"column_title": "Group"}
            }
        }
    })
}

/// Saved question built on another card
pub fn question_on_card(id: u64, name: &str, source_card: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "database_id": 1,
        "table_id": null,
        "dataset_query": {
            "database": 1,
            "type": "query",
            "query": {"source-table": format!("card__{source_card}")}
        },
        "result_metadata": [],
        "visualization_settings": {}
    })
}

/// Dashboard placing `cards`, with one parameter filtering on column 100
pub fn dashboard(id: u64, name: &str, cards: &[u64]) -> Value {
    let dashcards: Vec<Value> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            json!({
                "id": i + 1,
                "card_id": card,
                "card": {"id": card, "table_id": 10, "database_id": 1},
                "parameter_mappings": [
                    {"parameter_id": "country", "card_id": card, "target": ["dimension", ["field", 100, null]]}
                ],
                "visualization_settings": {}
            })
        })
        .collect();
    json!({
        "id": id,
        "name": name,
        "description": "Overview",
        "dashcards": dashcards,
        "tabs": [],
        "parameters": [{"id": "country", "name": "Country", "type": "string/="}],
        "param_values": null,
        "param_fields": null
    })
}
