//! Location stores and the per-router state store.
//!
//! A [`LocationStore`] owns the authoritative serialized location and its
//! history. The manager commits to it and observes it; every change, from
//! an action or from history navigation, flows back through the observers.

mod memory;
mod observers;
mod platform;
mod state;

pub use memory::{MemoryLocationStore, DEFAULT_HISTORY_CAPACITY};
pub use observers::ObserverId;
pub use platform::{Navigator, PlatformLocationStore, DEFAULT_POLL_INTERVAL};
pub use state::{
    RouterState, RouterStateStore, StateRecord, StateSubscriber, SubscriptionId,
    DEFAULT_STATE_HISTORY,
};

use std::sync::Arc;

use crate::error::Result;

/// Where a location change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// An in-process commit.
    Commit,
    /// Back/forward/go, or navigation detected outside the process.
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    pub serialized: String,
    pub origin: ChangeOrigin,
}

pub type LocationObserver = Arc<dyn Fn(&LocationChange) + Send + Sync>;

/// Storage for the serialized location.
pub trait LocationStore: Send + Sync {
    /// The current serialized location.
    fn current(&self) -> String;

    /// Makes `serialized` current, pushing a history entry unless `replace`.
    ///
    /// Committing the current location again is a no-op.
    fn commit(&self, serialized: String, replace: bool);

    /// Moves through history by `offset` entries, clamped to what exists.
    ///
    /// # Errors
    /// `go(0)` is rejected as a caller error.
    fn go(&self, offset: i64) -> Result<()>;

    fn back(&self) -> Result<()> {
        self.go(-1)
    }

    fn forward(&self) -> Result<()> {
        self.go(1)
    }

    fn subscribe(&self, observer: LocationObserver) -> ObserverId;

    fn unsubscribe(&self, id: ObserverId) -> bool;
}
