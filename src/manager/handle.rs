use crate::error::Result;
use crate::location::Location;
use crate::manager::Manager;
use crate::store::{RouterState, StateRecord, SubscriptionId};
use crate::templates::ActionOptions;
use crate::tree::RouterNode;

/// A router's action and state surface, borrowed from its manager.
///
/// Every action commits; use [`RouterHandle::action`] for template
/// actions without a dedicated method.
#[derive(Clone)]
pub struct RouterHandle<'m> {
    manager: &'m Manager,
    name: String,
}

impl<'m> RouterHandle<'m> {
    pub(crate) fn new(manager: &'m Manager, name: &str) -> Self {
        Self {
            manager,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self, action: &str, options: ActionOptions) -> Result<Location> {
        self.manager.dispatch(&self.name, action, options)
    }

    pub fn show(&self) -> Result<Location> {
        self.action("show", ActionOptions::default())
    }

    pub fn show_with(&self, options: ActionOptions) -> Result<Location> {
        self.action("show", options)
    }

    pub fn hide(&self) -> Result<Location> {
        self.action("hide", ActionOptions::default())
    }

    pub fn set_data(&self, data: impl Into<String>) -> Result<Location> {
        self.action("set_data", ActionOptions::with_data(data))
    }

    pub fn forward(&self) -> Result<Location> {
        self.action("forward", ActionOptions::default())
    }

    pub fn backward(&self) -> Result<Location> {
        self.action("backward", ActionOptions::default())
    }

    pub fn to_front(&self) -> Result<Location> {
        self.action("to_front", ActionOptions::default())
    }

    pub fn to_back(&self) -> Result<Location> {
        self.action("to_back", ActionOptions::default())
    }

    pub fn state(&self) -> Result<StateRecord> {
        self.manager.state(&self.name)
    }

    pub fn current(&self) -> Result<RouterState> {
        self.state().map(|record| record.current)
    }

    /// Previous states, most recent first.
    pub fn history(&self) -> Result<Vec<RouterState>> {
        self.manager.history(&self.name)
    }

    pub fn node(&self) -> Result<RouterNode> {
        self.manager.node(&self.name)
    }

    pub fn subscribe<F>(&self, subscriber: F) -> Result<SubscriptionId>
    where
        F: Fn(&str, &StateRecord) + Send + Sync + 'static,
    {
        self.manager.subscribe(&self.name, subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.manager.unsubscribe(&self.name, id)
    }
}
