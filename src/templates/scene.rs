//! Scene: mutually exclusive visibility among same-type siblings.

use crate::error::Result;
use crate::location::{Location, SearchValue};
use crate::manager::ActionScope;
use crate::store::RouterState;
use crate::templates::{
    clear_router_slot, flag_is_set, visibility, ActionContext, ActionKind, ActionOptions,
    ReducerContext, Template,
};
use crate::tree::RouterNode;

pub(super) fn template() -> Template {
    Template::new(reduce)
        .with_action("show", ActionKind::Show, show)
        .with_action("hide", ActionKind::Hide, hide)
}

fn show(
    _options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    ctx: ActionContext,
) -> Result<Location> {
    let node = scope.node(name)?;
    let route_key = node.route_key().to_string();
    let path_index = node.path_index();
    let is_root = node.is_root();

    if let Some(parent) = scope.tree().parent_of(name) {
        let parent_name = parent.name().to_string();
        if !ctx.defaults_cascade && !parent.is_root() && !scope.is_visible(&location, &parent_name)? {
            tracing::warn!(
                router = %name,
                parent = %parent_name,
                "Scene show suppressed: parent is not visible"
            );
            return Ok(location);
        }
    }

    let hide_ctx = ActionContext {
        defaults_cascade: false,
        ..ctx
    };
    let siblings = scope.tree().siblings(name);
    for sibling in siblings {
        location = scope.call(&sibling, "hide", &ActionOptions::default(), location, hide_ctx)?;
        // Superseded by this show; the sibling falls back to its default rule.
        scope.clear_cache(&sibling)?;
    }

    match path_index {
        Some(index) => {
            if !location.set_segment(index, &route_key) {
                tracing::warn!(
                    router = %name,
                    index,
                    depth = location.pathname.len(),
                    "Pathname is shorter than the scene's slot"
                );
            }
        }
        None if is_root => {}
        None => location.set_search(&route_key, SearchValue::Flag),
    }
    Ok(location)
}

fn hide(
    _options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    let node = scope.node(name)?;
    let occupied = node
        .path_index()
        .is_some_and(|index| location.segment(index) == Some(node.route_key()));
    clear_router_slot(&mut location, node, occupied);
    Ok(location)
}

fn reduce(location: &Location, node: &RouterNode, _ctx: &ReducerContext) -> RouterState {
    let visible = match node.path_index() {
        Some(index) => location.segment(index) == Some(node.route_key()),
        None => flag_is_set(location, node.route_key()),
    };
    visibility(visible)
}
