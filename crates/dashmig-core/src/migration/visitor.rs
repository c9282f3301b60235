//! Visitor rewriting references (and translating labels) during migration

use super::remote::RemoteEntities;
use super::session::MigrationSession;
use crate::entity::EntityRef;
use crate::error::MigrationError;
use crate::rewrite::{CardDependencies, Rewriter};
use crate::traverse::{ContextStack, Frame, Visitor};
use serde_json::Value;
use std::sync::Arc;

/// Rewrites every node of one entity; referenced cards are migrated through
/// the session as they are found
#[derive(Debug)]
pub struct MigrationVisitor<'s, R> {
    session: &'s mut MigrationSession<R>,
    owner: EntityRef,
}

impl<'s, R: RemoteEntities> MigrationVisitor<'s, R> {
    /// Create visitor for `owner`
    #[inline]
    #[must_use]
    pub fn new(session: &'s mut MigrationSession<R>, owner: EntityRef) -> Self {
        Self { session, owner }
    }
}

impl<R: RemoteEntities> Visitor for MigrationVisitor<'_, R> {
    type Output = ();
    type Error = MigrationError;

    fn visit(&mut self, node: &mut Value, stack: &ContextStack) -> Result<(), MigrationError> {
        let Some(frame) = stack.top_frame() else {
            return Ok(());
        };
        let schema = Arc::clone(self.session.schema_handle());
        let rewriter = Rewriter::new(&schema, self.owner);
        let deps: &mut dyn CardDependencies = &mut *self.session;

        match frame {
            Frame::Card if stack.contains(Frame::Dashboard) => rewriter.dashcard_node(node, deps)?,
            Frame::Card => rewriter.card_node(node)?,
            Frame::QueryPart => rewriter.query_part(node, deps)?,
            Frame::Join => rewriter.join(node, deps)?,
            Frame::VisualizationSettings => rewriter.visualization_settings(node),
            Frame::TableColumns => rewriter.table_columns(node)?,
            Frame::ColumnSettings => rewriter.column_settings(node)?,
            Frame::ClickBehavior => rewriter.click_behavior(node)?,
            Frame::ParameterMapping => rewriter.parameter_mapping(node)?,
            Frame::Parameter => rewriter.dashboard_parameter(node, deps)?,
            // param_values and param_fields are keyed by field id but
            // recomputed by the platform on save
            Frame::Dashboard | Frame::SeriesSettings | Frame::Tabs | Frame::ParamValues | Frame::ParamFields => {}
        }

        self.session.translate_labels(node, stack)
    }
}
