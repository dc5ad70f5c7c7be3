mod common;

use std::sync::Arc;

use common::{is_visible, manager, show, showcase_tree, workspace_tree};
use router_sync::manager::ActionScope;
use router_sync::store::{MemoryLocationStore, RouterStateStore};
use router_sync::templates::{ActionContext, ActionKind, ReducerContext, Template, TemplateRegistry};
use router_sync::{
    ActionOptions, Location, Manager, RouterDeclaration, RouterError, RouterNode, RouterState,
};

fn build(declaration: &RouterDeclaration) -> Result<Manager, RouterError> {
    Manager::new(
        declaration,
        Arc::new(MemoryLocationStore::default()),
        Arc::new(RouterStateStore::default()),
    )
}

#[test]
fn test_routers_listed_parents_first() {
    let (manager, _store) = manager(&showcase_tree());
    let routers = manager.routers();
    assert_eq!(routers.first().map(String::as_str), Some("app"));
    assert_eq!(routers.len(), 5);
    for name in ["home", "settings", "m1", "m2"] {
        assert!(routers.iter().any(|r| r == name));
    }
}

#[test]
fn test_node_shape() {
    let (manager, _store) = manager(&showcase_tree());

    let app = manager.node("app").unwrap();
    assert!(app.is_root());
    assert!(app.is_path_router());
    assert_eq!(app.path_location(), -1);
    assert_eq!(app.kind().as_str(), "scene");

    let home = manager.node("home").unwrap();
    assert_eq!(home.parent(), Some("app"));
    assert_eq!(home.path_index(), Some(0));

    let m1 = manager.node("m1").unwrap();
    assert!(!m1.is_path_router());
    assert_eq!(m1.route_key(), "m1");
}

#[test]
fn test_unknown_router_and_action() {
    let (manager, _store) = manager(&showcase_tree());

    assert!(matches!(
        manager.router("nope"),
        Err(RouterError::UnknownRouter { .. })
    ));
    assert_eq!(
        manager.dispatch("home", "explode", ActionOptions::default()),
        Err(RouterError::UnknownAction {
            name: "home".to_string(),
            action: "explode".to_string(),
        })
    );
    assert_eq!(manager.serialized_location(), "/");
}

#[test]
fn test_declaration_errors() {
    let duplicate_name = RouterDeclaration::new("app")
        .child("scene", RouterDeclaration::new("home"))
        .child("stack", RouterDeclaration::new("home"));
    assert!(matches!(
        build(&duplicate_name),
        Err(RouterError::DuplicateName { .. })
    ));

    let duplicate_key = RouterDeclaration::new("app")
        .child("scene", RouterDeclaration::new("home"))
        .child("scene", RouterDeclaration::new("start").route_key("home"));
    assert!(matches!(
        build(&duplicate_key),
        Err(RouterError::DuplicateRouteKey { .. })
    ));

    let unnamed = RouterDeclaration::new("app").child("scene", RouterDeclaration::new(""));
    assert_eq!(
        build(&unnamed).err(),
        Some(RouterError::MissingField { field: "name" })
    );

    let unknown_type = RouterDeclaration::new("app").child("carousel", RouterDeclaration::new("c"));
    assert!(matches!(
        build(&unknown_type),
        Err(RouterError::UnknownTemplate { .. })
    ));

    let forced_path = RouterDeclaration::new("app").child(
        "stack",
        RouterDeclaration::new("panel").child("data", RouterDeclaration::new("tab").path_router(true)),
    );
    assert!(matches!(
        build(&forced_path),
        Err(RouterError::PathRouterUnderQueryParent { .. })
    ));
}

#[test]
fn test_add_router_joins_scene_group() {
    let (manager, _store) = manager(&showcase_tree());
    show(&manager, "home");

    manager
        .add_router("app", "scene", &RouterDeclaration::new("help"))
        .unwrap();
    assert!(!is_visible(&manager, "help"));
    assert_eq!(manager.node("help").unwrap().path_index(), Some(0));

    show(&manager, "help");
    assert_eq!(manager.serialized_location(), "/help");
    assert!(!is_visible(&manager, "home"));
}

#[test]
fn test_add_router_failure_leaves_tree() {
    let (manager, _store) = manager(&showcase_tree());
    let before = manager.routers();

    let err = manager
        .add_router("nope", "scene", &RouterDeclaration::new("help"))
        .unwrap_err();
    assert!(matches!(err, RouterError::ParentNotFound { .. }));

    let clash = RouterDeclaration::new("extra").child("scene", RouterDeclaration::new("home"));
    assert!(manager.add_router("app", "scene", &clash).is_err());
    assert_eq!(manager.routers(), before);
}

#[test]
fn test_remove_router_drops_subtree_and_state() {
    let tree = showcase_tree().child(
        "scene",
        RouterDeclaration::new("profile").child("data", RouterDeclaration::new("user")),
    );
    let (manager, _store) = manager(&tree);

    let mut removed = manager.remove_router("profile").unwrap();
    removed.sort();
    assert_eq!(removed, vec!["profile", "user"]);
    assert!(matches!(
        manager.state("user"),
        Err(RouterError::StateUnavailable { .. })
    ));
    assert!(matches!(
        manager.router("profile"),
        Err(RouterError::UnknownRouter { .. })
    ));
    assert!(manager.node("app").unwrap().children().all(|child| child != "profile"));

    assert_eq!(
        manager.remove_router("app"),
        Err(RouterError::RootRemoval {
            name: "app".to_string(),
        })
    );
}

fn toggle_show(
    _options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> router_sync::Result<Location> {
    let key = scope.node(name)?.route_key().to_string();
    location.set_search(&key, "on");
    Ok(location)
}

fn toggle_hide(
    _options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> router_sync::Result<Location> {
    let key = scope.node(name)?.route_key().to_string();
    location.clear_search(&key);
    Ok(location)
}

fn toggle_flip(
    _options: &ActionOptions,
    mut location: Location,
    name: &str,
    scope: &mut ActionScope<'_>,
    _ctx: ActionContext,
) -> router_sync::Result<Location> {
    let key = scope.node(name)?.route_key().to_string();
    let next = if location.search_text(&key).as_deref() == Some("on") {
        "off"
    } else {
        "on"
    };
    location.set_search(&key, next);
    Ok(location)
}

fn toggle_state(location: &Location, node: &RouterNode, _ctx: &ReducerContext) -> RouterState {
    RouterState {
        visible: location.search_text(node.route_key()).as_deref() == Some("on"),
        ..Default::default()
    }
}

#[test]
fn test_custom_template() {
    let mut templates = TemplateRegistry::builtin();
    templates.register(
        "toggle",
        Template::new(toggle_state)
            .with_action("show", ActionKind::Show, toggle_show)
            .with_action("hide", ActionKind::Hide, toggle_hide)
            .with_action("flip", ActionKind::Other, toggle_flip),
    );
    let tree = RouterDeclaration::new("app").child("toggle", RouterDeclaration::new("lights"));
    let manager = Manager::with_templates(
        &tree,
        templates,
        Arc::new(MemoryLocationStore::default()),
        Arc::new(RouterStateStore::default()),
    )
    .unwrap();

    let lights = manager.router("lights").unwrap();
    assert!(!lights.node().unwrap().is_path_router());

    lights.show().unwrap();
    assert_eq!(manager.serialized_location(), "/?lights=on");
    assert!(lights.current().unwrap().visible);

    lights.action("flip", ActionOptions::default()).unwrap();
    assert_eq!(manager.serialized_location(), "/?lights=off");
    assert!(!lights.current().unwrap().visible);

    lights.action("flip", ActionOptions::default()).unwrap();
    lights.hide().unwrap();
    assert_eq!(manager.serialized_location(), "/");
}

#[test]
fn test_root_type_from_declaration() {
    let tree = RouterDeclaration::new("app")
        .with_type("stack")
        .child("scene", RouterDeclaration::new("home"));
    let manager = build(&tree).unwrap();
    assert_eq!(manager.node("app").unwrap().kind().as_str(), "stack");
    assert!(is_visible(&manager, "app"));
}

#[test]
fn test_concurrent_dispatch_keeps_every_change() {
    let mut tree = RouterDeclaration::new("app");
    for i in 0..16 {
        tree = tree.child("feature", RouterDeclaration::new(format!("f{i}")));
    }
    let (manager, store) = manager(&tree);

    std::thread::scope(|scope| {
        for i in 0..16 {
            let manager = &manager;
            scope.spawn(move || show(manager, &format!("f{i}")));
        }
    });

    for i in 0..16 {
        assert!(is_visible(&manager, &format!("f{i}")), "f{i} was lost");
    }
    assert_eq!(store.entries().len(), 17);
}

fn tripwire_pull(
    _options: &ActionOptions,
    location: Location,
    _name: &str,
    scope: &mut ActionScope<'_>,
    ctx: ActionContext,
) -> router_sync::Result<Location> {
    let location = scope.call("main", "hide", &ActionOptions::default(), location, ctx)?;
    scope.node("missing")?;
    Ok(location)
}

#[test]
fn test_failed_action_leaves_caches_untouched() {
    let mut templates = TemplateRegistry::builtin();
    templates.register(
        "tripwire",
        Template::new(toggle_state).with_action("pull", ActionKind::Other, tripwire_pull),
    );
    let tree = workspace_tree(false).child("tripwire", RouterDeclaration::new("wire"));
    let manager = Manager::with_templates(
        &tree,
        templates,
        Arc::new(MemoryLocationStore::default()),
        Arc::new(RouterStateStore::default()),
    )
    .unwrap();

    show(&manager, "main");
    assert_eq!(manager.serialized_location(), "/main/overview?beta=true");

    let err = manager.dispatch("wire", "pull", ActionOptions::default()).unwrap_err();
    assert!(matches!(err, RouterError::UnknownRouter { .. }));
    assert_eq!(manager.serialized_location(), "/main/overview?beta=true");
    for name in ["main", "overview", "details", "beta"] {
        assert!(
            manager.node(name).unwrap().cache().get().is_none(),
            "{name} cache should be empty"
        );
    }
}
