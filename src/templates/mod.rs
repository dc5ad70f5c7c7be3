//! Behavior templates: named location transforms plus one reducer per type.
//!
//! A template is a plain table of function pointers selected by
//! [`TemplateKind`] when a router is constructed. Every action receives the
//! router name, the in-flight location and an [`ActionScope`] explicitly;
//! the manager wraps each call with caching and default handling.

mod data;
mod feature;
mod scene;
mod stack;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Result, RouterError};
use crate::location::Location;
use crate::manager::ActionScope;
use crate::store::RouterState;
use crate::tree::RouterNode;

pub use stack::route_key_orderings;

/// Router type. Built-ins plus user templates registered by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKind {
    Scene,
    Stack,
    Data,
    Feature,
    Custom(String),
}

impl TemplateKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "scene" => TemplateKind::Scene,
            "stack" => TemplateKind::Stack,
            "data" => TemplateKind::Data,
            "feature" => TemplateKind::Feature,
            other => TemplateKind::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TemplateKind::Scene => "scene",
            TemplateKind::Stack => "stack",
            TemplateKind::Data => "data",
            TemplateKind::Feature => "feature",
            TemplateKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the manager wraps an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Clears the router's cache and runs the default-show cascade afterwards.
    Show,
    /// Hides and caches the subtree before the action runs.
    Hide,
    Other,
}

/// Caller-supplied options for one action call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOptions {
    /// Payload for data routers.
    pub data: Option<String>,
    /// Replace the current history entry instead of pushing.
    pub replace_location: bool,
}

impl ActionOptions {
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }
}

/// Flags threaded through composed action calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionContext {
    /// The call belongs to a default-show cascade.
    pub defaults_cascade: bool,
    /// Caching switch inherited from the nearest ancestor that sets one.
    pub disable_caching: Option<bool>,
    /// The call hides a descendant of a router that was visible.
    pub hide_cascade: bool,
}

/// What a reducer may know beyond the location and the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerContext {
    pub parent_visible: bool,
    /// Another path-owning sibling may own the segment in this router's
    /// slot: a data router, or one whose route key is that segment.
    pub slot_contested: bool,
}

pub type ActionFn = fn(
    &ActionOptions,
    Location,
    &str,
    &mut ActionScope<'_>,
    ActionContext,
) -> Result<Location>;

pub type ReducerFn = fn(&Location, &RouterNode, &ReducerContext) -> RouterState;

#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub apply: ActionFn,
}

#[derive(Debug, Clone)]
pub struct Template {
    actions: BTreeMap<String, ActionSpec>,
    reducer: ReducerFn,
}

impl Template {
    pub fn new(reducer: ReducerFn) -> Self {
        Self {
            actions: BTreeMap::new(),
            reducer,
        }
    }

    pub fn with_action(mut self, name: impl Into<String>, kind: ActionKind, apply: ActionFn) -> Self {
        self.actions.insert(name.into(), ActionSpec { kind, apply });
        self
    }

    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.get(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn reducer(&self) -> ReducerFn {
        self.reducer
    }
}

/// Templates by router type.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateKind, Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRegistry {
    /// Scene, stack, data and feature.
    pub fn builtin() -> Self {
        let templates = HashMap::from([
            (TemplateKind::Scene, scene::template()),
            (TemplateKind::Stack, stack::template()),
            (TemplateKind::Data, data::template()),
            (TemplateKind::Feature, feature::template()),
        ]);
        Self { templates }
    }

    /// Registers (or replaces) the template for router type `name`.
    pub fn register(&mut self, name: &str, template: Template) {
        self.templates.insert(TemplateKind::from_name(name), template);
    }

    pub fn contains(&self, kind: &TemplateKind) -> bool {
        self.templates.contains_key(kind)
    }

    pub fn get(&self, kind: &TemplateKind) -> Result<&Template> {
        self.templates.get(kind).ok_or_else(|| RouterError::UnknownTemplate {
            kind: kind.to_string(),
        })
    }
}

/// Visibility-only state.
pub(crate) fn visibility(visible: bool) -> RouterState {
    RouterState {
        visible,
        ..Default::default()
    }
}

/// Reads a query router's boolean flag; codec values are text.
pub(crate) fn flag_is_set(location: &Location, route_key: &str) -> bool {
    location.search_text(route_key).as_deref() == Some("true")
}

/// Removes the router from the pathname (if it occupies its slot) or the query.
pub(crate) fn clear_router_slot(location: &mut Location, node: &RouterNode, occupied: bool) {
    match node.path_index() {
        Some(index) if occupied => location.truncate_path(index),
        Some(_) => {}
        None if node.is_root() => {}
        None => location.clear_search(node.route_key()),
    }
}
