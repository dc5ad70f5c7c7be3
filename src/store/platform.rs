//! Location store backed by a platform navigation API.
//!
//! The platform may change the location behind our back (a native back
//! button, an address bar edit). [`PlatformLocationStore::poll`] detects
//! that by comparing against the last location it saw, and the poller task
//! calls it on an interval so such changes reach the observers through the
//! same path as in-process commits.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::observers::{ObserverId, ObserverList};
use super::{ChangeOrigin, LocationChange, LocationObserver, LocationStore};
use crate::error::{Result, RouterError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Platform history primitives.
pub trait Navigator: Send + Sync {
    fn current(&self) -> String;
    fn push(&self, serialized: &str);
    fn replace(&self, serialized: &str);
    /// May complete asynchronously; the poller picks up the result.
    fn go(&self, offset: i64);
}

pub struct PlatformLocationStore<N> {
    navigator: N,
    last_seen: Mutex<String>,
    observers: ObserverList,
}

impl<N: Navigator> PlatformLocationStore<N> {
    pub fn new(navigator: N) -> Self {
        let last_seen = Mutex::new(navigator.current());
        Self {
            navigator,
            last_seen,
            observers: ObserverList::default(),
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Notifies observers if the platform location changed since last seen.
    ///
    /// Returns whether a change was detected.
    pub fn poll(&self) -> bool {
        // Read under the lock that commit holds while pushing.
        let current = {
            let mut last_seen = self.last_seen.lock();
            let current = self.navigator.current();
            if *last_seen == current {
                return false;
            }
            *last_seen = current.clone();
            current
        };

        tracing::info!(location = %current, "Out-of-band navigation detected");
        self.observers.notify(&LocationChange {
            serialized: current,
            origin: ChangeOrigin::Navigation,
        });
        true
    }
}

impl<N: Navigator + 'static> PlatformLocationStore<N> {
    /// Polls the platform every `period` until the store is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_poller(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    tracing::debug!("Location store dropped, poller stopping");
                    break;
                };
                store.poll();
            }
        })
    }
}

impl<N: Navigator> LocationStore for PlatformLocationStore<N> {
    fn current(&self) -> String {
        self.navigator.current()
    }

    fn commit(&self, serialized: String, replace: bool) {
        {
            let mut last_seen = self.last_seen.lock();
            if *last_seen == serialized {
                return;
            }
            if replace {
                self.navigator.replace(&serialized);
            } else {
                self.navigator.push(&serialized);
            }
            *last_seen = serialized.clone();
        }

        tracing::info!(location = %serialized, replace, "Location committed");
        self.observers.notify(&LocationChange {
            serialized,
            origin: ChangeOrigin::Commit,
        });
    }

    fn go(&self, offset: i64) -> Result<()> {
        if offset == 0 {
            return Err(RouterError::InvalidHistoryOffset);
        }
        self.navigator.go(offset);
        self.poll();
        Ok(())
    }

    fn subscribe(&self, observer: LocationObserver) -> ObserverId {
        self.observers.add(observer)
    }

    fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }
}
