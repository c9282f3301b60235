//! Migration session: memoized, dependency-first migration of entities

use super::remote::RemoteEntities;
use super::visitor::MigrationVisitor;
use crate::entity::{Card, Dashboard, EntityKind, EntityRef};
use crate::error::MigrationError;
use crate::labels::{text_slots, LabelCollector, LabelReplacer};
use crate::rewrite::CardDependencies;
use crate::traverse::ContextStack;
use dashmig_schema::{CardId, DashboardId, MigrationSchema};
use dashmig_translate::Translator;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One migration run against a remote installation
///
/// A card is pushed at most once per session, and only after every card it
/// depends on has been pushed. Dashboards are not memoized.
#[derive(Debug)]
pub struct MigrationSession<R> {
    schema: Arc<MigrationSchema>,
    remote: R,
    translator: Option<Translator>,
    dry_run: bool,
    migrated: BTreeSet<CardId>,
    in_progress: Vec<CardId>,
    rewritten: BTreeMap<EntityRef, Value>,
}

impl<R: RemoteEntities> MigrationSession<R> {
    /// Create session
    #[must_use]
    pub fn new(schema: MigrationSchema, remote: R) -> Self {
        Self {
            schema: Arc::new(schema),
            remote,
            translator: None,
            dry_run: false,
            migrated: BTreeSet::new(),
            in_progress: Vec::new(),
            rewritten: BTreeMap::new(),
        }
    }

    /// With labels translated while migrating
    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// With pushes skipped; rewritten documents are only recorded
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &MigrationSchema {
        &self.schema
    }

    pub(crate) fn schema_handle(&self) -> &Arc<MigrationSchema> {
        &self.schema
    }

    /// Remote installation
    #[inline]
    #[must_use]
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Translator, if labels are translated
    #[inline]
    #[must_use]
    pub fn translator(&self) -> Option<&Translator> {
        self.translator.as_ref()
    }

    /// Whether pushes are skipped
    #[inline]
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether `card` was migrated in this session
    #[must_use]
    pub fn is_migrated(&self, card: CardId) -> bool {
        self.migrated.contains(&card)
    }

    /// Cards migrated in this session, in id order
    pub fn migrated_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.migrated.iter().copied()
    }

    /// Last document pushed (or, in a dry run, produced) for `entity`
    #[must_use]
    pub fn rewritten(&self, entity: EntityRef) -> Option<&Value> {
        self.rewritten.get(&entity)
    }

    /// Migrate a card and, first, every card it depends on
    ///
    /// A card already migrated in this session is skipped. A card is only
    /// recorded as migrated once its push succeeded, so a failed card is
    /// attempted again on the next call.
    ///
    /// # Errors
    /// Fetch or push failures, unresolved references, reference cycles.
    pub fn migrate_card(&mut self, card: CardId) -> Result<(), MigrationError> {
        if self.migrated.contains(&card) {
            tracing::debug!(%card, "card already migrated");
            return Ok(());
        }
        if self.in_progress.contains(&card) {
            let mut chain = self.in_progress.clone();
            chain.push(card);
            return Err(MigrationError::CyclicCardReference { chain });
        }

        self.in_progress.push(card);
        let result = self.rewrite_card(card);
        self.in_progress.pop();

        if result.is_ok() {
            self.migrated.insert(card);
        }
        result
    }

    fn rewrite_card(&mut self, id: CardId) -> Result<(), MigrationError> {
        tracing::info!(card = %id, "visiting card");
        let entity = EntityRef::card(id);
        let mut card = Card::new(id, self.remote.fetch(entity)?)?;
        card.traverse(&mut MigrationVisitor::new(self, entity))?;
        self.push(entity, card.into_json())
    }

    /// Migrate a dashboard, after every card it uses
    ///
    /// # Errors
    /// Fetch or push failures, unresolved references; the dashboard is not
    /// pushed if any of its cards fails.
    pub fn migrate_dashboard(&mut self, id: DashboardId) -> Result<(), MigrationError> {
        tracing::info!(dashboard = %id, "visiting dashboard");
        let entity = EntityRef::dashboard(id);
        let mut dashboard = Dashboard::new(id, self.remote.fetch(entity)?)?;
        dashboard.traverse(&mut MigrationVisitor::new(self, entity))?;
        self.push(entity, dashboard.into_json())
    }

    /// Every label of `entity`, trimmed
    ///
    /// # Errors
    /// Fetch failures, documents that are not objects.
    pub fn collect_labels(&self, entity: EntityRef) -> Result<BTreeSet<String>, MigrationError> {
        let document = self.remote.fetch(entity)?;
        let labels = match entity.kind {
            EntityKind::Card => Card::new(CardId(entity.id), document)?.traverse(&mut LabelCollector),
            EntityKind::Dashboard => {
                Dashboard::new(DashboardId(entity.id), document)?.traverse(&mut LabelCollector)
            }
        };
        Ok(labels.unwrap_or_else(|never| match never {}))
    }

    /// Replace labels of `entity` and push it; returns the number replaced
    ///
    /// Nothing is pushed when no label matched.
    ///
    /// # Errors
    /// Fetch or push failures.
    pub fn relabel(&mut self, entity: EntityRef, replacements: &BTreeMap<String, String>) -> Result<usize, MigrationError> {
        let document = self.remote.fetch(entity)?;
        let mut replacer = LabelReplacer::new(replacements);
        let (count, document) = match entity.kind {
            EntityKind::Card => {
                let mut card = Card::new(CardId(entity.id), document)?;
                let count = card.traverse(&mut replacer);
                (count, card.into_json())
            }
            EntityKind::Dashboard => {
                let mut dashboard = Dashboard::new(DashboardId(entity.id), document)?;
                let count = dashboard.traverse(&mut replacer);
                (count, dashboard.into_json())
            }
        };
        let count = count.unwrap_or_else(|never| match never {});
        if count == 0 {
            tracing::debug!(%entity, "no label to replace");
            return Ok(0);
        }
        self.push(entity, document)?;
        Ok(count)
    }

    pub(crate) fn translate_labels(&mut self, node: &mut Value, stack: &ContextStack) -> Result<(), MigrationError> {
        let Some(translator) = self.translator.as_mut() else {
            return Ok(());
        };
        for text in text_slots(node, stack) {
            *text = translator.translate(text)?;
        }
        Ok(())
    }

    fn push(&mut self, entity: EntityRef, document: Value) -> Result<(), MigrationError> {
        if self.dry_run {
            tracing::info!(%entity, "dry run; not updating");
        } else {
            let status = self.remote.push(entity, &document)?;
            if status != 200 {
                tracing::error!(%entity, status, "problems updating");
                return Err(MigrationError::PushFailure { entity, status });
            }
            tracing::info!(%entity, "updated");
        }
        self.rewritten.insert(entity, document);
        Ok(())
    }
}

impl<R: RemoteEntities> CardDependencies for MigrationSession<R> {
    fn require_card(&mut self, card: CardId) -> Result<(), MigrationError> {
        self.migrate_card(card)
    }
}
