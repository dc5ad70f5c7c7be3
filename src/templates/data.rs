//! Data: a router carrying an arbitrary string payload.
//!
//! Path-owning data routers share their pathname slot with routers in
//! other branches at the same depth, so the reducer only accepts a segment
//! under a visible parent that matches the payload the router last wrote
//! or accepted. Without such a payload a segment is accepted only when no
//! sibling could own it. History navigation resets that payload, which
//! makes the location authoritative again.

use crate::error::Result;
use crate::location::{Location, SearchValue};
use crate::manager::ActionScope;
use crate::store::RouterState;
use crate::templates::{
    clear_router_slot, ActionContext, ActionKind, ActionOptions, ReducerContext, Template,
};
use crate::tree::RouterNode;

pub(super) fn template() -> Template {
    Template::new(reduce)
        .with_action("show", ActionKind::Show, show)
        .with_action("set_data", ActionKind::Show, show)
        .with_action("hide", ActionKind::Hide, hide)
}

fn show(
    options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> Result<Location> {
    let node = scope.node(name)?;
    let route_key = node.route_key().to_string();
    let path_index = node.path_index();
    let known = node.known_data().map(str::to_string);

    let data = options
        .data
        .clone()
        .or_else(|| scope.committed_state(name).and_then(|state| state.data))
        .or(known);
    let Some(data) = data else {
        tracing::debug!(router = %name, "Data show skipped: no payload");
        return Ok(location);
    };

    match path_index {
        Some(index) => {
            if location.set_segment(index, &data) {
                scope.set_known_data(name, Some(data))?;
            } else {
                tracing::warn!(
                    router = %name,
                    index,
                    depth = location.pathname.len(),
                    "Pathname is shorter than the data router's slot"
                );
            }
        }
        None => location.set_search(&route_key, SearchValue::Text(data)),
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
    let occupied = scope.is_visible(&location, name)?;
    let node = scope.node(name)?;
    clear_router_slot(&mut location, node, occupied);
    Ok(location)
}

fn reduce(location: &Location, node: &RouterNode, ctx: &ReducerContext) -> RouterState {
    let data = match node.path_index() {
        Some(index) => location
            .segment(index)
            .filter(|segment| {
                ctx.parent_visible
                    && node
                        .known_data()
                        .map_or(!ctx.slot_contested, |known| known == *segment)
            })
            .map(str::to_string),
        None => location.search_text(node.route_key()),
    };
    RouterState {
        visible: data.is_some(),
        order: None,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TemplateKind, TemplateRegistry};
    use crate::tree::{RouterDeclaration, RouterTree};

    fn tree() -> RouterTree {
        let declaration = RouterDeclaration::new("app")
            .child("data", RouterDeclaration::new("user"))
            .child(
                "stack",
                RouterDeclaration::new("panel").child("data", RouterDeclaration::new("tab")),
            );
        RouterTree::from_declaration(&declaration, &TemplateRegistry::builtin()).unwrap()
    }

    const VISIBLE_PARENT: ReducerContext = ReducerContext {
        parent_visible: true,
        slot_contested: false,
    };

    #[test]
    fn test_path_data_reads_segment() {
        let tree = tree();
        let user = tree.node("user").unwrap();
        assert_eq!(user.kind(), &TemplateKind::Data);
        assert!(user.is_path_router());

        let location = crate::location::deserialize("/42");
        let state = reduce(&location, user, &VISIBLE_PARENT);
        assert!(state.visible);
        assert_eq!(state.data.as_deref(), Some("42"));
    }

    #[test]
    fn test_path_data_rejects_foreign_segment() {
        let mut tree = tree();
        tree.node_mut("user").unwrap().known_data = Some("42".into());
        let user = tree.node("user").unwrap();

        let location = crate::location::deserialize("/settings");
        assert!(!reduce(&location, user, &VISIBLE_PARENT).visible);

        let hidden_parent = ReducerContext {
            parent_visible: false,
            slot_contested: false,
        };
        let location = crate::location::deserialize("/42");
        assert!(!reduce(&location, user, &hidden_parent).visible);
    }

    #[test]
    fn test_contested_slot_needs_known_data() {
        let mut tree = tree();
        let contested = ReducerContext {
            parent_visible: true,
            slot_contested: true,
        };
        let location = crate::location::deserialize("/42");
        assert!(!reduce(&location, tree.node("user").unwrap(), &contested).visible);

        tree.node_mut("user").unwrap().known_data = Some("42".into());
        let state = reduce(&location, tree.node("user").unwrap(), &contested);
        assert_eq!(state.data.as_deref(), Some("42"));
    }

    #[test]
    fn test_query_data_reads_search() {
        let tree = tree();
        let tab = tree.node("tab").unwrap();
        assert!(!tab.is_path_router());

        let location = crate::location::deserialize("/?tab=details");
        let state = reduce(&location, tab, &VISIBLE_PARENT);
        assert_eq!(state.data.as_deref(), Some("details"));
    }
}
