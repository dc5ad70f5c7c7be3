//! Shared router trees and store fixtures.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use parking_lot::Mutex;
use router_sync::store::{MemoryLocationStore, Navigator, RouterStateStore};
use router_sync::{Manager, RouterDeclaration, RouterState};

/// `app` with scenes `home`/`settings` and stack members `m1`/`m2`.
pub fn showcase_tree() -> RouterDeclaration {
    RouterDeclaration::new("app")
        .child("scene", RouterDeclaration::new("home"))
        .child("scene", RouterDeclaration::new("settings"))
        .child("stack", RouterDeclaration::new("m1"))
        .child("stack", RouterDeclaration::new("m2"))
}

/// `main` holds a default scene, a second scene and a default feature;
/// `other` is its exclusive sibling.
pub fn workspace_tree(disable_caching: bool) -> RouterDeclaration {
    let main = RouterDeclaration::new("main")
        .child("scene", RouterDeclaration::new("overview").default_show())
        .child("scene", RouterDeclaration::new("details"))
        .child("feature", RouterDeclaration::new("beta").default_show());
    let main = if disable_caching {
        main.disable_caching(true)
    } else {
        main
    };
    RouterDeclaration::new("app")
        .child("scene", main)
        .child("scene", RouterDeclaration::new("other"))
}

/// Manager over a fresh in-memory store at `/`.
pub fn manager(declaration: &RouterDeclaration) -> (Manager, Arc<MemoryLocationStore>) {
    manager_at(declaration, "/")
}

pub fn manager_at(
    declaration: &RouterDeclaration,
    initial: &str,
) -> (Manager, Arc<MemoryLocationStore>) {
    let store = Arc::new(MemoryLocationStore::new(initial, 100));
    let states = Arc::new(RouterStateStore::default());
    let manager = Manager::new(declaration, store.clone(), states).expect("Failed to build manager");
    (manager, store)
}

pub fn current(manager: &Manager, name: &str) -> RouterState {
    manager
        .state(name)
        .unwrap_or_else(|e| panic!("No state for {name}: {e}"))
        .current
}

pub fn is_visible(manager: &Manager, name: &str) -> bool {
    current(manager, name).visible
}

pub fn show(manager: &Manager, name: &str) {
    manager
        .router(name)
        .and_then(|router| router.show())
        .unwrap_or_else(|e| panic!("{name}.show failed: {e}"));
}

pub fn hide(manager: &Manager, name: &str) {
    manager
        .router(name)
        .and_then(|router| router.hide())
        .unwrap_or_else(|e| panic!("{name}.hide failed: {e}"));
}

/// In-process stand-in for a platform history API.
pub struct FakeNavigator {
    inner: Mutex<(Vec<String>, usize)>,
}

impl FakeNavigator {
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Mutex::new((vec![initial.to_string()], 0)),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().0.clone()
    }

    /// Navigation the store did not initiate, like an address bar edit.
    pub fn push_external(&self, serialized: &str) {
        Navigator::push(self, serialized);
    }
}

impl Navigator for FakeNavigator {
    fn current(&self) -> String {
        let inner = self.inner.lock();
        inner.0[inner.1].clone()
    }

    fn push(&self, serialized: &str) {
        let mut inner = self.inner.lock();
        let keep = inner.1 + 1;
        inner.0.truncate(keep);
        inner.0.push(serialized.to_string());
        inner.1 = keep;
    }

    fn replace(&self, serialized: &str) {
        let mut inner = self.inner.lock();
        let index = inner.1;
        inner.0[index] = serialized.to_string();
    }

    fn go(&self, offset: i64) {
        let mut inner = self.inner.lock();
        let last = inner.0.len() as i64 - 1;
        inner.1 = (inner.1 as i64 + offset).clamp(0, last) as usize;
    }
}
