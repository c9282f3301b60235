//! Card and dashboard id transformations
//!
//! When a collection is duplicated on the destination, every card and
//! dashboard gets a new id. Cross-references (questions built on other
//! questions, click-through targets, dashcards) must follow.

use crate::ids::{CardId, DashboardId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source id → destination id tables for cards and dashboards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformations {
    /// Source card → destination card
    #[serde(default)]
    pub cards: BTreeMap<CardId, CardId>,
    /// Source dashboard → destination dashboard
    #[serde(default)]
    pub dashboards: BTreeMap<DashboardId, DashboardId>,
}

impl Transformations {
    /// Create empty transformations
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card transformation
    #[must_use]
    pub fn with_card(mut self, source: CardId, destination: CardId) -> Self {
        self.cards.insert(source, destination);
        self
    }

    /// Add a dashboard transformation
    #[must_use]
    pub fn with_dashboard(mut self, source: DashboardId, destination: DashboardId) -> Self {
        self.dashboards.insert(source, destination);
        self
    }

    /// Destination card for `card`
    ///
    /// An id that already is a destination id maps to itself.
    #[must_use]
    pub fn card(&self, card: CardId) -> Option<CardId> {
        self.cards
            .get(&card)
            .copied()
            .or_else(|| self.cards.values().any(|d| *d == card).then_some(card))
    }

    /// Destination dashboard for `dashboard`
    ///
    /// An id that already is a destination id maps to itself.
    #[must_use]
    pub fn dashboard(&self, dashboard: DashboardId) -> Option<DashboardId> {
        self.dashboards
            .get(&dashboard)
            .copied()
            .or_else(|| self.dashboards.values().any(|d| *d == dashboard).then_some(dashboard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_source_and_keeps_destination() {
        let t = Transformations::new().with_card(CardId(12), CardId(112));
        assert_eq!(t.card(CardId(12)), Some(CardId(112)));
        assert_eq!(t.card(CardId(112)), Some(CardId(112)));
        assert_eq!(t.card(CardId(13)), None);
    }

    #[test]
    fn dashboards_are_separate() {
        let t = Transformations::new()
            .with_card(CardId(4), CardId(40))
            .with_dashboard(DashboardId(4), DashboardId(104));
        assert_eq!(t.dashboard(DashboardId(4)), Some(DashboardId(104)));
        assert_eq!(t.dashboard(DashboardId(40)), None);
    }

    #[test]
    fn json_keys_are_parsed_as_ids() {
        let t: Transformations =
            serde_json::from_str(r#"{"cards": {"12": 112, "13": 113}}"#).unwrap();
        assert_eq!(t.card(CardId(13)), Some(CardId(113)));
        assert!(t.dashboards.is_empty());
    }
}
