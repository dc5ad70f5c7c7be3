//! The action wrapper: caching, hide cascades and default-show cascades
//! around every template action.

use std::collections::HashMap;

use crate::error::{Result, RouterError};
use crate::location::Location;
use crate::store::{RouterState, RouterStateStore};
use crate::templates::{
    visibility, ActionContext, ActionKind, ActionOptions, ReducerContext, TemplateKind,
    TemplateRegistry,
};
use crate::tree::{CacheValue, RouterNode, RouterTree};

/// Mutable view of the router tree handed to template actions.
///
/// Actions call other routers' actions through [`ActionScope::call`],
/// which runs the full wrapper against the in-flight location without
/// committing it.
pub struct ActionScope<'a> {
    tree: &'a mut RouterTree,
    templates: &'a TemplateRegistry,
    states: &'a RouterStateStore,
}

impl<'a> ActionScope<'a> {
    pub(crate) fn new(
        tree: &'a mut RouterTree,
        templates: &'a TemplateRegistry,
        states: &'a RouterStateStore,
    ) -> Self {
        Self {
            tree,
            templates,
            states,
        }
    }

    pub fn tree(&self) -> &RouterTree {
        self.tree
    }

    pub fn node(&self, name: &str) -> Result<&RouterNode> {
        self.tree.node(name)
    }

    /// Last committed state of `name`.
    pub fn committed_state(&self, name: &str) -> Option<RouterState> {
        self.states.current(name)
    }

    /// Whether `name` is visible in `location`, per its reducer.
    pub fn is_visible(&self, location: &Location, name: &str) -> Result<bool> {
        derive_state(self.tree, self.templates, location, name).map(|state| state.visible)
    }

    pub fn set_known_data(&mut self, name: &str, data: Option<String>) -> Result<()> {
        self.tree.node_mut(name)?.known_data = data;
        Ok(())
    }

    pub fn clear_cache(&mut self, name: &str) -> Result<()> {
        self.tree.node_mut(name)?.cache.clear();
        Ok(())
    }

    /// Runs `action` on `name` as a composed call and returns the location.
    pub fn call(
        &mut self,
        name: &str,
        action: &str,
        options: &ActionOptions,
        location: Location,
        ctx: ActionContext,
    ) -> Result<Location> {
        self.run(name, action, options, location, ctx, false)
    }

    pub(crate) fn run(
        &mut self,
        name: &str,
        action: &str,
        options: &ActionOptions,
        mut location: Location,
        ctx: ActionContext,
        top_level: bool,
    ) -> Result<Location> {
        let node = self.tree.node(name)?;
        let spec = *self
            .templates
            .get(node.kind())?
            .action(action)
            .ok_or_else(|| RouterError::UnknownAction {
                name: name.to_string(),
                action: action.to_string(),
            })?;
        let was_visible = self.is_visible(&location, name)?;

        tracing::debug!(
            router = %name,
            action,
            top_level,
            defaults_cascade = ctx.defaults_cascade,
            was_visible,
            "Applying action"
        );

        // Hiding an already hidden branch from outside records nothing.
        // Inside a cascade every descendant captures, hidden ones included.
        if spec.kind == ActionKind::Hide && (was_visible || ctx.hide_cascade) {
            location = self.set_cache_and_hide(location, name, ctx)?;
        }

        location = (spec.apply)(options, location, name, self, ctx)?;

        match spec.kind {
            ActionKind::Hide => {
                if top_level && was_visible && !self.caching_disabled(name, ctx)? {
                    self.tree.node_mut(name)?.cache.mark_hidden();
                }
            }
            ActionKind::Show => {
                if self.is_visible(&location, name)? {
                    self.tree.node_mut(name)?.cache.clear();
                    location = self.set_children_defaults(location, name, ctx)?;
                }
            }
            ActionKind::Other => {}
        }
        Ok(location)
    }

    fn caching_disabled(&self, name: &str, ctx: ActionContext) -> Result<bool> {
        let node = self.tree.node(name)?;
        Ok(node
            .config()
            .disable_caching
            .or(ctx.disable_caching)
            .unwrap_or(false))
    }

    /// Hides every child of `name` (each runs its own cascade), then
    /// captures `name`'s cache from the resulting location.
    pub fn set_cache_and_hide(
        &mut self,
        mut location: Location,
        name: &str,
        ctx: ActionContext,
    ) -> Result<Location> {
        let disable_caching = self.tree.node(name)?.config().disable_caching.or(ctx.disable_caching);
        let child_ctx = ActionContext {
            disable_caching,
            hide_cascade: true,
            ..ctx
        };

        for child in self.tree.children(name) {
            if !self.has_action(&child, "hide")? {
                continue;
            }
            location = self.call(&child, "hide", &ActionOptions::default(), location, child_ctx)?;
        }

        if !disable_caching.unwrap_or(false) {
            self.set_cache_from_location(&location, name)?;
        }
        Ok(location)
    }

    /// Captures `name`'s visibility (and payload or rank) unless its cache
    /// already holds a value.
    pub fn set_cache_from_location(&mut self, location: &Location, name: &str) -> Result<()> {
        let state = derive_state(self.tree, self.templates, location, name)?;
        let value = match state {
            RouterState { visible: false, .. } => CacheValue::Hidden,
            RouterState {
                data: Some(data), ..
            } => CacheValue::Data(data),
            RouterState {
                order: Some(order), ..
            } => CacheValue::Order(order),
            _ => CacheValue::Visible,
        };

        let stored = self.tree.node_mut(name)?.cache.set_if_empty(value.clone());
        if stored {
            tracing::debug!(router = %name, cache = ?value, "Cache captured");
        }
        Ok(())
    }

    /// Shows the children of `name` that are configured `default_show` or
    /// hold a visible cache, skipping those cached as hidden.
    ///
    /// Plain defaults go first so that restored siblings win exclusive
    /// slots; cached stack members go back-to-front to keep their ranks.
    pub fn set_children_defaults(
        &mut self,
        mut location: Location,
        name: &str,
        ctx: ActionContext,
    ) -> Result<Location> {
        let mut plan: Vec<(String, Option<CacheValue>)> = Vec::new();
        for child in self.tree.children(name) {
            let node = self.tree.node(&child)?;
            match node.cache().get() {
                Some(CacheValue::Hidden) => {}
                Some(cached) => plan.push((child.clone(), Some(cached.clone()))),
                None if node.config().default_show => plan.push((child.clone(), None)),
                None => {}
            }
        }
        plan.sort_by_key(|(_, cached)| match cached {
            None => (0, 0),
            Some(CacheValue::Order(order)) => (1, -order),
            Some(_) => (1, 0),
        });

        let cascade = ActionContext {
            defaults_cascade: true,
            hide_cascade: false,
            ..ctx
        };
        for (child, cached) in plan {
            self.tree.node_mut(&child)?.cache.take();
            if !self.has_action(&child, "show")? {
                continue;
            }
            let options = ActionOptions {
                data: cached.as_ref().and_then(CacheValue::data).map(str::to_string),
                ..Default::default()
            };
            tracing::debug!(router = %child, parent = %name, cache = ?cached, "Applying default show");
            location = self.call(&child, "show", &options, location, cascade)?;
        }
        Ok(location)
    }

    fn has_action(&self, name: &str, action: &str) -> Result<bool> {
        let node = self.tree.node(name)?;
        Ok(self.templates.get(node.kind())?.action(action).is_some())
    }
}

/// Derives the state of one router, evaluating its ancestors for
/// parent visibility. The root is always visible.
pub(crate) fn derive_state(
    tree: &RouterTree,
    templates: &TemplateRegistry,
    location: &Location,
    name: &str,
) -> Result<RouterState> {
    let node = tree.node(name)?;
    let Some(parent) = node.parent() else {
        return Ok(visibility(true));
    };
    let parent_visible = derive_state(tree, templates, location, parent)?.visible;
    let reducer = templates.get(node.kind())?.reducer();
    let ctx = ReducerContext {
        parent_visible,
        slot_contested: slot_contested(tree, node, location),
    };
    Ok(reducer(location, node, &ctx))
}

fn slot_contested(tree: &RouterTree, node: &RouterNode, location: &Location) -> bool {
    let Some(index) = node.path_index() else {
        return false;
    };
    let segment = location.segment(index);
    let Some(parent) = node.parent().and_then(|parent| tree.node(parent).ok()) else {
        return false;
    };
    parent
        .children()
        .filter(|sibling| *sibling != node.name())
        .filter_map(|sibling| tree.node(sibling).ok())
        .filter(|sibling| sibling.is_path_router())
        .any(|sibling| *sibling.kind() == TemplateKind::Data || Some(sibling.route_key()) == segment)
}

/// Derives every router's state top-down and records the payload each
/// path-owning data router accepted.
pub(crate) fn derive_all(
    tree: &mut RouterTree,
    templates: &TemplateRegistry,
    location: &Location,
) -> Result<Vec<(String, RouterState)>> {
    let mut visible: HashMap<String, bool> = HashMap::new();
    let mut states = Vec::with_capacity(tree.len());

    for name in tree.names() {
        let node = tree.node(&name)?;
        let state = match node.parent() {
            None => visibility(true),
            Some(parent) => {
                let parent_visible = visible.get(parent).copied().unwrap_or(false);
                let reducer = templates.get(node.kind())?.reducer();
                let ctx = ReducerContext {
                    parent_visible,
                    slot_contested: slot_contested(tree, node, location),
                };
                reducer(location, node, &ctx)
            }
        };
        let accepted = node
            .is_path_router()
            .then(|| state.data.clone())
            .flatten();

        visible.insert(name.clone(), state.visible);
        if let Some(data) = accepted {
            tree.node_mut(&name)?.known_data = Some(data);
        }
        states.push((name, state));
    }
    Ok(states)
}
