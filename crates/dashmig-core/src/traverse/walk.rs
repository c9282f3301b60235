//! Depth-first walks over card and dashboard documents
//!
//! Children are always visited before the node that holds them, so a
//! visitor working on a card node sees its settings and query already
//! processed.

use super::accumulate::Accumulate;
use super::stack::{ContextStack, Frame};
use super::visitor::Visitor;
use serde_json::Value;

fn title_of(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Walk a card (or dashcard) document
///
/// Order: visualization settings, query, parameter mappings, card node.
///
/// # Errors
/// The first error returned by `visitor`.
pub fn walk_card<V: Visitor>(
    card: &mut Value,
    visitor: &mut V,
    stack: &mut ContextStack,
) -> Result<V::Output, V::Error> {
    let title = title_of(card, "name").or_else(|| card.get("card").and_then(|c| title_of(c, "name")));
    let mut stack = stack.push(Frame::Card, title);
    let mut out = V::Output::default();

    if let Some(settings) = card.get_mut("visualization_settings").filter(|s| s.is_object()) {
        out.merge(walk_settings(settings, visitor, &mut stack)?);
    }

    if let Some(query) = card
        .get_mut("dataset_query")
        .and_then(|q| q.get_mut("query"))
        .filter(|q| q.is_object())
    {
        out.merge(walk_query(query, visitor, &mut stack)?);
    }

    if let Some(Value::Array(mappings)) = card.get_mut("parameter_mappings") {
        for mapping in mappings.iter_mut().filter(|m| m.is_object()) {
            let frame = stack.push(Frame::ParameterMapping, None);
            out.merge(visitor.visit(mapping, &frame)?);
        }
    }

    out.merge(visitor.visit(card, &stack)?);
    Ok(out)
}

fn walk_settings<V: Visitor>(
    settings: &mut Value,
    visitor: &mut V,
    stack: &mut ContextStack,
) -> Result<V::Output, V::Error> {
    let mut stack = stack.push(Frame::VisualizationSettings, None);
    let mut out = V::Output::default();

    if let Some(series) = settings.get_mut("series_settings").filter(|s| s.is_object()) {
        let frame = stack.push(Frame::SeriesSettings, None);
        out.merge(visitor.visit(series, &frame)?);
    }

    if let Some(columns) = settings.get_mut("table.columns").filter(|c| c.is_array()) {
        let frame = stack.push(Frame::TableColumns, None);
        out.merge(visitor.visit(columns, &frame)?);
    }

    if let Some(Value::Object(columns)) = settings.get_mut("column_settings") {
        for (key, column) in columns.iter_mut() {
            if let Some(click) = column.get_mut("click_behavior").filter(|c| c.is_object()) {
                let mut column_frame = stack.push(Frame::ColumnSettings, Some(key.clone()));
                let click_frame = column_frame.push(Frame::ClickBehavior, None);
                out.merge(visitor.visit(click, &click_frame)?);
            }
        }
    }

    if let Some(columns) = settings.get_mut("column_settings").filter(|c| c.is_object()) {
        let frame = stack.push(Frame::ColumnSettings, None);
        out.merge(visitor.visit(columns, &frame)?);
    }

    if let Some(click) = settings.get_mut("click_behavior").filter(|c| c.is_object()) {
        let frame = stack.push(Frame::ClickBehavior, None);
        out.merge(visitor.visit(click, &frame)?);
    }

    out.merge(visitor.visit(settings, &stack)?);
    Ok(out)
}

fn walk_query<V: Visitor>(
    query: &mut Value,
    visitor: &mut V,
    stack: &mut ContextStack,
) -> Result<V::Output, V::Error> {
    let mut stack = stack.push(Frame::QueryPart, None);
    let mut out = V::Output::default();

    if let Some(nested) = query.get_mut("source-query").filter(|q| q.is_object()) {
        out.merge(walk_query(nested, visitor, &mut stack)?);
    }

    if let Some(Value::Array(joins)) = query.get_mut("joins") {
        for join in joins.iter_mut().filter(|j| j.is_object()) {
            let mut frame = stack.push(Frame::Join, title_of(join, "alias"));
            if let Some(nested) = join.get_mut("source-query").filter(|q| q.is_object()) {
                out.merge(walk_query(nested, visitor, &mut frame)?);
            }
            out.merge(visitor.visit(join, &frame)?);
        }
    }

    out.merge(visitor.visit(query, &stack)?);
    Ok(out)
}

/// Walk a dashboard document
///
/// Order: dashcards (each as a card), tabs, parameters, `param_values`,
/// `param_fields`, dashboard node.
///
/// # Errors
/// The first error returned by `visitor`.
pub fn walk_dashboard<V: Visitor>(
    dashboard: &mut Value,
    visitor: &mut V,
    stack: &mut ContextStack,
) -> Result<V::Output, V::Error> {
    let title = title_of(dashboard, "name");
    let mut stack = stack.push(Frame::Dashboard, title);
    let mut out = V::Output::default();

    if let Some(Value::Array(dashcards)) = dashboard.get_mut("dashcards") {
        for dashcard in dashcards.iter_mut().filter(|d| d.is_object()) {
            out.merge(walk_card(dashcard, visitor, &mut stack)?);
        }
    }

    if let Some(tabs) = dashboard.get_mut("tabs").filter(|t| t.is_array()) {
        let frame = stack.push(Frame::Tabs, None);
        out.merge(visitor.visit(tabs, &frame)?);
    }

    if let Some(Value::Array(parameters)) = dashboard.get_mut("parameters") {
        for parameter in parameters.iter_mut().filter(|p| p.is_object()) {
            let frame = stack.push(Frame::Parameter, title_of(parameter, "name"));
            out.merge(visitor.visit(parameter, &frame)?);
        }
    }

    for (key, frame) in [("param_values", Frame::ParamValues), ("param_fields", Frame::ParamFields)] {
        if let Some(node) = dashboard.get_mut(key).filter(|v| !v.is_null()) {
            let frame = stack.push(frame, None);
            out.merge(visitor.visit(node, &frame)?);
        }
    }

    out.merge(visitor.visit(dashboard, &stack)?);
    Ok(out)
}
