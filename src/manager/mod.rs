//! Orchestration: the router tree, its templates and the two stores.
//!
//! ```text
//! action ──→ wrapper ──→ template ──→ commit ──→ LocationStore
//!                                                    │ observers
//!   RouterStateStore ←── reducers ←── Manager ←──────┘
//! ```
//!
//! Actions never write router state directly. They produce a location,
//! the location store notifies, and the manager re-derives every router's
//! state from what was committed.

mod handle;
mod scope;

pub use handle::RouterHandle;
pub use scope::ActionScope;

use std::sync::{Arc, Weak};

use parking_lot::{ReentrantMutex, RwLock};

use crate::error::Result;
use crate::location::{deserialize, serialize, Location};
use crate::store::{
    ChangeOrigin, LocationChange, LocationStore, ObserverId, RouterState, RouterStateStore, StateRecord,
    SubscriptionId,
};
use crate::templates::{ActionContext, ActionOptions, TemplateRegistry};
use crate::tree::{RouterDeclaration, RouterNode, RouterTree};
use scope::derive_all;

/// Owns the router tree and wires actions to the location and state stores.
///
/// Dropping the manager detaches it from the location store.
pub struct Manager {
    shared: Arc<Shared>,
    observer: ObserverId,
}

struct Shared {
    /// Held across read, run and commit. Reentrant so subscribers may act.
    dispatch: ReentrantMutex<()>,
    tree: RwLock<RouterTree>,
    templates: TemplateRegistry,
    location_store: Arc<dyn LocationStore>,
    states: Arc<RouterStateStore>,
}

impl Shared {
    /// Re-derives every router's state from `serialized`.
    fn refresh(&self, serialized: &str, origin: ChangeOrigin) -> Result<()> {
        let location = deserialize(serialized);
        let updates = {
            let mut tree = self.tree.write();
            if origin == ChangeOrigin::Navigation {
                tree.clear_known_data();
            }
            derive_all(&mut tree, &self.templates, &location)?
        };
        self.states.set_states(updates);
        Ok(())
    }
}

impl Manager {
    /// Builds the tree with the built-in templates.
    ///
    /// # Errors
    /// Any declaration error (missing fields, duplicates, path ownership).
    pub fn new(
        declaration: &RouterDeclaration,
        location_store: Arc<dyn LocationStore>,
        states: Arc<RouterStateStore>,
    ) -> Result<Self> {
        Self::with_templates(declaration, TemplateRegistry::builtin(), location_store, states)
    }

    /// Builds the tree with a custom template registry.
    pub fn with_templates(
        declaration: &RouterDeclaration,
        templates: TemplateRegistry,
        location_store: Arc<dyn LocationStore>,
        states: Arc<RouterStateStore>,
    ) -> Result<Self> {
        let tree = RouterTree::from_declaration(declaration, &templates)?;
        let shared = Arc::new(Shared {
            dispatch: ReentrantMutex::new(()),
            tree: RwLock::new(tree),
            templates,
            location_store: Arc::clone(&location_store),
            states,
        });
        shared.refresh(&location_store.current(), ChangeOrigin::Navigation)?;

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        let observer = location_store.subscribe(Arc::new(move |change: &LocationChange| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if let Err(e) = shared.refresh(&change.serialized, change.origin) {
                tracing::error!(error = %e, location = %change.serialized, "Failed to derive router state");
            }
        }));

        tracing::info!(
            root = %declaration.name,
            routers = shared.tree.read().len(),
            "Router manager initialized"
        );
        Ok(Self { shared, observer })
    }

    /// Handle exposing `name`'s actions and state.
    pub fn router(&self, name: &str) -> Result<RouterHandle<'_>> {
        self.shared.tree.read().node(name)?;
        Ok(RouterHandle::new(self, name))
    }

    /// Runs `action` on `name` and commits the resulting location.
    ///
    /// # Errors
    /// Unknown router or action; errors raised by the template.
    pub fn dispatch(&self, name: &str, action: &str, options: ActionOptions) -> Result<Location> {
        let _guard = self.shared.dispatch.lock();
        let previous = deserialize(&self.shared.location_store.current());
        let mut location = {
            let mut tree = self.shared.tree.write();
            // Cache and payload writes land only if the whole action succeeds.
            let mut staged = tree.clone();
            let mut scope = ActionScope::new(&mut staged, &self.shared.templates, &self.shared.states);
            let location = scope.run(
                name,
                action,
                &options,
                previous.clone(),
                ActionContext::default(),
                true,
            )?;
            *tree = staged;
            location
        };

        location.options.replace_location = options.replace_location;
        let serialized = serialize(&location, &previous);
        self.shared
            .location_store
            .commit(serialized, location.options.replace_location);
        Ok(location)
    }

    /// Adds a declared subtree under `parent` as routers of type `kind`.
    pub fn add_router(&self, parent: &str, kind: &str, declaration: &RouterDeclaration) -> Result<()> {
        self.shared
            .tree
            .write()
            .add_child(parent, kind, declaration, &self.shared.templates)?;
        self.shared
            .refresh(&self.shared.location_store.current(), ChangeOrigin::Commit)
    }

    /// Removes `name` with all descendants, dropping their state and
    /// subscriptions. Returns the removed names.
    pub fn remove_router(&self, name: &str) -> Result<Vec<String>> {
        let removed = self.shared.tree.write().remove(name)?;
        for removed_name in &removed {
            self.shared.states.remove(removed_name);
        }
        Ok(removed)
    }

    /// All router names, parents before children.
    pub fn routers(&self) -> Vec<String> {
        self.shared.tree.read().names()
    }

    /// Snapshot of a router node.
    pub fn node(&self, name: &str) -> Result<RouterNode> {
        self.shared.tree.read().node(name).cloned()
    }

    /// `{current, historical}` for `name`.
    pub fn state(&self, name: &str) -> Result<StateRecord> {
        self.shared.states.state(name)
    }

    /// Previous states of `name`, most recent first.
    pub fn history(&self, name: &str) -> Result<Vec<RouterState>> {
        self.shared.states.history(name)
    }

    pub fn subscribe<F>(&self, name: &str, subscriber: F) -> Result<SubscriptionId>
    where
        F: Fn(&str, &StateRecord) + Send + Sync + 'static,
    {
        self.shared.tree.read().node(name)?;
        Ok(self.shared.states.subscribe(name, Arc::new(subscriber)))
    }

    pub fn unsubscribe(&self, name: &str, id: SubscriptionId) -> bool {
        self.shared.states.unsubscribe(name, id)
    }

    pub fn location(&self) -> Location {
        deserialize(&self.shared.location_store.current())
    }

    pub fn serialized_location(&self) -> String {
        self.shared.location_store.current()
    }

    pub fn back(&self) -> Result<()> {
        self.go(-1)
    }

    pub fn forward(&self) -> Result<()> {
        self.go(1)
    }

    pub fn go(&self, offset: i64) -> Result<()> {
        let _guard = self.shared.dispatch.lock();
        self.shared.location_store.go(offset)
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.shared.location_store.unsubscribe(self.observer);
    }
}
