//! Label translation during migration, label collection and replacement

use dashmig_core::{EntityRef, MigrationError, MigrationSession};
use dashmig_schema::{CardId, DashboardId};
use dashmig_test_utils::{dashboard, question, sample_schema, InMemoryRemote, StubMachineTranslator};
use dashmig_translate::{Language, OnMiss, TermDictionary, TranslationError, Translator};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

fn french(on_miss: OnMiss) -> Translator {
    let terms = TermDictionary::new()
        .with_term("Orders per country", Language::Fr, "Commandes par Pays")
        .with_term("Group", Language::Fr, "Groupe");
    Translator::new(Language::Fr, on_miss)
        .with_terms(&terms, false)
        .with_retry_delay(Duration::ZERO)
}

#[test]
fn labels_are_translated_keeping_whitespace() {
    let remote = InMemoryRemote::new().with_card(112, question(112, "  Orders per country ", 10, 100));
    let mut session = MigrationSession::new(sample_schema(), remote.clone()).with_translator(french(OnMiss::Fail));

    session.migrate_card(CardId(112)).unwrap();

    let pushed = remote.last_pushed(EntityRef::card(CardId(112))).unwrap();
    assert_eq!(pushed["name"], json!("  Commandes par pays "));
    assert_eq!(
        pushed["visualization_settings"]["column_settings"]["[\"ref\",[\"field\",1100,null]]"]["column_title"],
        json!("Groupe")
    );
}

#[test]
fn missing_translation_aborts_the_card() {
    let remote = InMemoryRemote::new().with_card(112, question(112, "Revenue", 10, 100));
    let mut session = MigrationSession::new(sample_schema(), remote.clone()).with_translator(french(OnMiss::Fail));

    let err = session.migrate_card(CardId(112)).unwrap_err();

    assert!(matches!(err, MigrationError::Translation(TranslationError::Miss(ref text)) if text == "Revenue"));
    assert!(remote.pushes().is_empty());
}

#[test]
fn machine_translation_is_sentence_cased_and_cached() {
    let machine = StubMachineTranslator::new("en")
        .with_translation("Overview", "Vue d'Ensemble")
        .with_translation("Country", "Pays")
        .failing_first(1);
    let translator = french(OnMiss::MachineTranslate).with_machine(Box::new(machine.clone()));
    let mut document = dashboard(104, "Sales", &[]);
    document["tabs"] = json!([{"id": 1, "name": "Overview"}]);
    let remote = InMemoryRemote::new().with_dashboard(104, document);
    let mut session = MigrationSession::new(sample_schema(), remote.clone()).with_translator(translator);

    session.migrate_dashboard(DashboardId(104)).unwrap();

    let pushed = remote.last_pushed(EntityRef::dashboard(DashboardId(104))).unwrap();
    assert_eq!(pushed["description"], json!("Vue d'ensemble"));
    assert_eq!(pushed["tabs"][0]["name"], json!("Vue d'ensemble"));
    assert_eq!(pushed["parameters"][0]["name"], json!("Pays"));
    // one failure retried, then each sentence sent once
    assert_eq!(machine.calls(), vec!["Overview", "Overview", "Country"]);
}

#[test]
fn collects_and_replaces_labels() {
    let remote = InMemoryRemote::new().with_dashboard(104, dashboard(104, "Sales", &[12]));
    let mut session = MigrationSession::new(sample_schema(), remote.clone());
    let entity = EntityRef::dashboard(DashboardId(104));

    let labels = session.collect_labels(entity).unwrap();
    let expected: BTreeSet<String> = ["Overview", "Country"].into_iter().map(str::to_string).collect();
    assert_eq!(labels, expected);

    let replacements: BTreeMap<String, String> = [("Country".to_string(), "Pays".to_string())].into_iter().collect();
    assert_eq!(session.relabel(entity, &replacements).unwrap(), 1);
    assert_eq!(remote.last_pushed(entity).unwrap()["parameters"][0]["name"], json!("Pays"));

    // nothing left to replace, nothing pushed
    assert_eq!(session.relabel(entity, &replacements).unwrap(), 0);
    assert_eq!(remote.push_count(entity), 1);
}
