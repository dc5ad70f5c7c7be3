//! Feature: an independent boolean toggle in the query string.

use crate::error::Result;
use crate::location::{Location, SearchValue};
use crate::manager::ActionScope;
use crate::store::RouterState;
use crate::templates::{
    flag_is_set, visibility, ActionContext, ActionKind, ActionOptions, ReducerContext, Template,
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
    _ctx: ActionContext,
) -> Result<Location> {
    let node = scope.node(name)?;
    location.set_search(node.route_key(), SearchValue::Flag);
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
    location.clear_search(node.route_key());
    Ok(location)
}

fn reduce(location: &Location, node: &RouterNode, _ctx: &ReducerContext) -> RouterState {
    visibility(flag_is_set(location, node.route_key()))
}
