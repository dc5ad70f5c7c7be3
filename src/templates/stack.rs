//! Stack: ordered, possibly multi-visible routers ranked in the query string.
//!
//! Rank 1 is the front. Every action rebuilds the ordering of the visible
//! siblings, moves the acting router and renumbers ranks contiguously.

use crate::error::Result;
use crate::location::{Location, SearchValue};
use crate::manager::ActionScope;
use crate::store::RouterState;
use crate::templates::{ActionContext, ActionKind, ActionOptions, ReducerContext, Template};
use crate::tree::{RouterNode, RouterTree};

pub(super) fn template() -> Template {
    Template::new(reduce)
        .with_action("show", ActionKind::Show, show)
        .with_action("to_front", ActionKind::Show, show)
        .with_action("hide", ActionKind::Hide, hide)
        .with_action("forward", ActionKind::Other, forward)
        .with_action("backward", ActionKind::Other, backward)
        .with_action("to_back", ActionKind::Other, to_back)
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Front,
    Back,
    Forward,
    Backward,
    Remove,
}

/// Route keys of the visible same-type routers under `name`'s parent
/// (including `name`), front first.
pub fn route_key_orderings(location: &Location, tree: &RouterTree, name: &str) -> Vec<String> {
    let Some(node) = tree.get(name) else {
        return Vec::new();
    };
    let mut members = tree.neighbors_by_type(name, node.kind());
    if members.is_empty() {
        members.push(name.to_string());
    }

    let mut ranked: Vec<(i64, String)> = members
        .iter()
        .filter_map(|member| tree.get(member))
        .filter_map(|member| {
            rank(location, member.route_key()).map(|order| (order, member.route_key().to_string()))
        })
        .collect();
    ranked.sort_by_key(|(order, _)| *order);
    ranked.into_iter().map(|(_, key)| key).collect()
}

fn rank(location: &Location, route_key: &str) -> Option<i64> {
    location.search_value(route_key).and_then(SearchValue::as_number)
}

fn reorder(
    mut location: Location,
    name: &str,
    scope: &ActionScope<'_>,
    placement: Placement,
) -> Result<Location> {
    let route_key = scope.node(name)?.route_key().to_string();
    let mut keys = route_key_orderings(&location, scope.tree(), name);
    let current = keys.iter().position(|key| *key == route_key);

    let target = match (placement, current) {
        (Placement::Forward | Placement::Backward, None) => {
            tracing::debug!(router = %name, ?placement, "Stack move skipped: router not visible");
            return Ok(location);
        }
        (Placement::Front, _) => Some(0),
        (Placement::Back, _) => Some(usize::MAX),
        (Placement::Forward, Some(position)) => Some(position.saturating_sub(1)),
        (Placement::Backward, Some(position)) => Some(position + 1),
        (Placement::Remove, _) => None,
    };

    if let Some(position) = current {
        keys.remove(position);
    }
    match target {
        Some(position) => keys.insert(position.min(keys.len()), route_key),
        None => location.clear_search(&route_key),
    }

    for (position, key) in keys.iter().enumerate() {
        location.set_search(key, SearchValue::Number(position as i64 + 1));
    }
    tracing::debug!(router = %name, ?placement, order = ?keys, "Stack reordered");
    Ok(location)
}

fn show(
    _options: &ActionOptions,
    location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    reorder(location, name, scope, Placement::Front)
}

fn hide(
    _options: &ActionOptions,
    location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    reorder(location, name, scope, Placement::Remove)
}

fn forward(
    _options: &ActionOptions,
    location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    reorder(location, name, scope, Placement::Forward)
}

fn backward(
    _options: &ActionOptions,
    location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    reorder(location, name, scope, Placement::Backward)
}

fn to_back(
    _options: &ActionOptions,
    location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    reorder(location, name, scope, Placement::Back)
}

fn reduce(location: &Location, node: &RouterNode, _ctx: &ReducerContext) -> RouterState {
    let order = rank(location, node.route_key());
    RouterState {
        visible: order.is_some(),
        order,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::deserialize;
    use crate::templates::TemplateRegistry;
    use crate::tree::RouterDeclaration;

    fn tree() -> RouterTree {
        let declaration = RouterDeclaration::new("app")
            .child("stack", RouterDeclaration::new("a"))
            .child("stack", RouterDeclaration::new("b").route_key("bee"))
            .child("stack", RouterDeclaration::new("c"));
        RouterTree::from_declaration(&declaration, &TemplateRegistry::builtin()).unwrap()
    }

    #[test]
    fn test_orderings_sorted_by_rank() {
        let tree = tree();
        let location = deserialize("/?a=3&bee=1&c=2");
        assert_eq!(route_key_orderings(&location, &tree, "a"), vec!["bee", "c", "a"]);
    }

    #[test]
    fn test_orderings_drop_invalid_ranks() {
        let tree = tree();
        let location = deserialize("/?a=x&bee=1");
        assert_eq!(route_key_orderings(&location, &tree, "c"), vec!["bee"]);
    }

    #[test]
    fn test_reducer_reads_rank() {
        let tree = tree();
        let node = tree.node("b").unwrap();
        let ctx = ReducerContext {
            parent_visible: true,
            slot_contested: false,
        };
        let state = reduce(&deserialize("/?bee=2"), node, &ctx);
        assert_eq!(state.order, Some(2));
        assert!(state.visible);
        assert!(!reduce(&deserialize("/?bee=oops"), node, &ctx).visible);
    }
}
