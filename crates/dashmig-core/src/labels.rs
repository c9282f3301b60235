//! User-visible text of cards and dashboards
//!
//! Which fields of a node hold text depends on the frame the node is
//! visited under:
//!
//! | frame                    | text fields                                   |
//! |--------------------------|-----------------------------------------------|
//! | card                     | `name`, `description`                         |
//! | visualization settings   | `text`, `*title_text`, `card.title`, `card.description` |
//! | series settings          | `title` of every series                       |
//! | column settings (map)    | `column_title` of every column                |
//! | tabs                     | `name` of every tab                           |
//! | parameter                | `name`                                        |
//! | dashboard                | `description`                                 |

use crate::rewrite::is_text_setting;
use crate::traverse::{ContextStack, Frame, Visitor};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

fn string_fields<'a>(node: &'a mut Value, keys: &'static [&'static str]) -> Vec<&'a mut String> {
    let Value::Object(object) = node else {
        return Vec::new();
    };
    object
        .iter_mut()
        .filter_map(|(key, value)| match value {
            Value::String(text) if keys.contains(&key.as_str()) => Some(text),
            _ => None,
        })
        .collect()
}

fn entry_fields<'a>(entries: impl Iterator<Item = &'a mut Value>, key: &'static str) -> Vec<&'a mut String> {
    entries
        .filter_map(Value::as_object_mut)
        .filter_map(|entry| match entry.get_mut(key) {
            Some(Value::String(text)) => Some(text),
            _ => None,
        })
        .collect()
}

/// Mutable text fields of `node`, visited under `stack`
pub fn text_slots<'a>(node: &'a mut Value, stack: &ContextStack) -> Vec<&'a mut String> {
    match stack.top_frame() {
        Some(Frame::Card) => string_fields(node, &["name", "description"]),
        Some(Frame::Parameter) => string_fields(node, &["name"]),
        Some(Frame::Dashboard) => string_fields(node, &["description"]),
        Some(Frame::VisualizationSettings) => match node {
            Value::Object(settings) => settings
                .iter_mut()
                .filter_map(|(key, value)| match value {
                    Value::String(text) if is_text_setting(key) => Some(text),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
        Some(Frame::SeriesSettings) => match node {
            Value::Object(series) => entry_fields(series.values_mut(), "title"),
            _ => Vec::new(),
        },
        Some(Frame::ColumnSettings) => match node {
            Value::Object(columns) => entry_fields(columns.values_mut(), "column_title"),
            _ => Vec::new(),
        },
        Some(Frame::Tabs) => match node {
            Value::Array(tabs) => entry_fields(tabs.iter_mut(), "name"),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Collects every non-blank label, trimmed
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelCollector;

impl Visitor for LabelCollector {
    type Output = BTreeSet<String>;
    type Error = Infallible;

    fn visit(&mut self, node: &mut Value, stack: &ContextStack) -> Result<Self::Output, Self::Error> {
        Ok(text_slots(node, stack)
            .into_iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect())
    }
}

/// Replaces labels found in a replacement table; counts replacements
///
/// Labels are matched trimmed; surrounding whitespace is kept.
#[derive(Debug, Clone)]
pub struct LabelReplacer<'a> {
    replacements: &'a BTreeMap<String, String>,
}

impl<'a> LabelReplacer<'a> {
    /// Create replacer
    #[inline]
    #[must_use]
    pub fn new(replacements: &'a BTreeMap<String, String>) -> Self {
        Self { replacements }
    }
}

impl Visitor for LabelReplacer<'_> {
    type Output = usize;
    type Error = Infallible;

    fn visit(&mut self, node: &mut Value, stack: &ContextStack) -> Result<usize, Self::Error> {
        let mut replaced = 0;
        for text in text_slots(node, stack) {
            let core = text.trim();
            if let Some(replacement) = self.replacements.get(core) {
                let start = text.len() - text.trim_start().len();
                let end = start + core.len();
                *text = format!("{}{replacement}{}", &text[..start], &text[end..]);
                replaced += 1;
            }
        }
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Card, Dashboard};
    use dashmig_schema::{CardId, DashboardId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dashboard() -> Dashboard {
        Dashboard::new(
            DashboardId(104),
            json!({
                "name": "Sales overview",
                "description": "  Monthly sales ",
                "dashcards": [
                    {"card_id": 112, "visualization_settings": {"card.title": "Revenue", "text": "  "}},
                    {"card_id": null, "visualization_settings": {"text": "# Welcome"}}
                ],
                "tabs": [{"id": 1, "name": "Main"}, {"id": 2, "name": "Details"}],
                "parameters": [{"id": "a", "name": "Country", "values_source_config": {}}]
            }),
        )
        .unwrap()
    }

    #[test]
    fn collects_dashboard_labels() {
        let labels = dashboard()
            .traverse(&mut LabelCollector)
            .unwrap_or_else(|never| match never {});
        let expected: BTreeSet<String> = ["Monthly sales", "Revenue", "# Welcome", "Main", "Details", "Country"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn collects_card_labels() {
        let mut card = Card::new(
            CardId(112),
            json!({
                "name": "Orders per country",
                "description": null,
                "visualization_settings": {
                    "graph.x_axis.title_text": "Country",
                    "series_settings": {"count": {"title": "Orders"}, "sum": {"color": "#fff"}},
                    "column_settings": {
                        "[\"ref\",[\"field\",1100,null]]": {"column_title": "Pays", "click_behavior": {"type": "crossfilter"}}
                    }
                }
            }),
        )
        .unwrap();
        let labels = card.traverse(&mut LabelCollector).unwrap_or_else(|never| match never {});
        let expected: BTreeSet<String> = ["Orders per country", "Country", "Orders", "Pays"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn replaces_labels_keeping_whitespace() {
        let replacements: BTreeMap<String, String> = [
            ("Monthly sales", "Ventes mensuelles"),
            ("Main", "Principal"),
            ("Country", "Pays"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        let mut dashboard = dashboard();
        let count = dashboard
            .traverse(&mut LabelReplacer::new(&replacements))
            .unwrap_or_else(|never| match never {});
        assert_eq!(count, 3);
        let json = dashboard.json();
        assert_eq!(json["description"], json!("  Ventes mensuelles "));
        assert_eq!(json["tabs"][0]["name"], json!("Principal"));
        assert_eq!(json["tabs"][1]["name"], json!("Details"));
        assert_eq!(json["parameters"][0]["name"], json!("Pays"));
        // dashboard name is not a label
        assert_eq!(json["name"], json!("Sales overview"));
    }
}
