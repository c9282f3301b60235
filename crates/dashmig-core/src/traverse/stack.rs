//! Context stack: where in a document the visitor currently is

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Kinds of places a traversal visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Dashboard document
    Dashboard,
    /// Card document, or a dashcard when below [`Frame::Dashboard`]
    Card,
    /// Query object (`dataset_query.query` or a nested `source-query`)
    QueryPart,
    /// One entry of a query's `joins`
    Join,
    /// `visualization_settings`
    VisualizationSettings,
    /// `column_settings` map, or one of its entries when titled
    ColumnSettings,
    /// `series_settings` map
    SeriesSettings,
    /// `table.columns` list
    TableColumns,
    /// A `click_behavior` object
    ClickBehavior,
    /// One dashboard parameter
    Parameter,
    /// One parameter mapping
    ParameterMapping,
    /// Dashboard tabs list
    Tabs,
    /// Dashboard `param_values`
    ParamValues,
    /// Dashboard `param_fields`
    ParamFields,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frame::Dashboard => "DASHBOARD",
            Frame::Card => "CARD",
            Frame::QueryPart => "QUERY_PART",
            Frame::Join => "JOIN",
            Frame::VisualizationSettings => "VISUALIZATION_SETTINGS",
            Frame::ColumnSettings => "COLUMN_SETTINGS",
            Frame::SeriesSettings => "SERIES_SETTINGS",
            Frame::TableColumns => "TABLE_COLUMNS",
            Frame::ClickBehavior => "CLICK_BEHAVIOR",
            Frame::Parameter => "PARAMETER",
            Frame::ParameterMapping => "PARAMETER_MAPPING",
            Frame::Tabs => "TABS",
            Frame::ParamValues => "PARAM_VALUES",
            Frame::ParamFields => "PARAM_FIELDS",
        };
        f.write_str(name)
    }
}

/// One frame of the stack, optionally titled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackElement {
    /// What is being visited
    pub frame: Frame,
    /// Card name, column-settings key, tab name, ...
    pub title: Option<String>,
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} (title: {title})", self.frame),
            None => write!(f, "{}", self.frame),
        }
    }
}

/// Ordered frames, bottom first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    elements: Vec<StackElement>,
}

impl ContextStack {
    /// Create empty stack
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame; it is popped when the returned guard is dropped
    pub fn push(&mut self, frame: Frame, title: Option<String>) -> StackGuard<'_> {
        self.elements.push(StackElement { frame, title });
        StackGuard { stack: self }
    }

    /// Top element
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&StackElement> {
        self.elements.last()
    }

    /// Frame of the top element
    #[inline]
    #[must_use]
    pub fn top_frame(&self) -> Option<Frame> {
        self.top().map(|e| e.frame)
    }

    /// Frame right below the top
    #[must_use]
    pub fn parent_frame(&self) -> Option<Frame> {
        let len = self.elements.len();
        (len >= 2).then(|| self.elements[len - 2].frame)
    }

    /// Is `frame` anywhere on the stack?
    #[must_use]
    pub fn contains(&self, frame: Frame) -> bool {
        self.elements.iter().any(|e| e.frame == frame)
    }

    /// Elements, bottom first
    pub fn iter(&self) -> impl Iterator<Item = &StackElement> {
        self.elements.iter()
    }

    /// Depth
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frames: Vec<String> = self.elements.iter().map(ToString::to_string).collect();
        write!(f, "--[bottom]--{}--[top]--", frames.join(" | "))
    }
}

/// Scope guard for one pushed frame
///
/// Dereferences to the stack so nested frames can be pushed through it.
#[derive(Debug)]
pub struct StackGuard<'a> {
    stack: &'a mut ContextStack,
}

impl Deref for StackGuard<'_> {
    type Target = ContextStack;

    fn deref(&self) -> &ContextStack {
        self.stack
    }
}

impl DerefMut for StackGuard<'_> {
    fn deref_mut(&mut self) -> &mut ContextStack {
        self.stack
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.elements.pop();
    }
}
