//! Per-router derived state with bounded history and subscribers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::error::{Result, RouterError};

/// Default number of previous states kept per router.
pub const DEFAULT_STATE_HISTORY: usize = 10;

/// What a router's reducer derives from a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouterState {
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Current state plus previous states, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateRecord {
    pub current: RouterState,
    pub historical: VecDeque<RouterState>,
}

pub type StateSubscriber = Arc<dyn Fn(&str, &StateRecord) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Derived state for every router, keyed by router name.
///
/// Only the manager writes here; readers get clones. Subscribers of a
/// router fire after a batch update in which its state changed, outside
/// any lock.
pub struct RouterStateStore {
    records: RwLock<HashMap<String, StateRecord>>,
    subscribers: Mutex<HashMap<String, Vec<(SubscriptionId, StateSubscriber)>>>,
    next_id: AtomicU64,
    history_capacity: usize,
}

impl Default for RouterStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_HISTORY)
    }
}

impl RouterStateStore {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            history_capacity,
        }
    }

    /// Applies a batch of freshly derived states.
    ///
    /// A router whose state is unchanged keeps its history and is not
    /// notified; a router seen for the first time gets an empty history.
    pub fn set_states(&self, updates: Vec<(String, RouterState)>) {
        let mut changed = Vec::new();
        {
            let mut records = self.records.write();
            for (name, state) in updates {
                match records.get_mut(&name) {
                    Some(record) if record.current == state => {}
                    Some(record) => {
                        let previous = std::mem::replace(&mut record.current, state);
                        record.historical.push_front(previous);
                        record.historical.truncate(self.history_capacity);
                        changed.push((name, record.clone()));
                    }
                    None => {
                        let record = StateRecord {
                            current: state,
                            historical: VecDeque::new(),
                        };
                        records.insert(name.clone(), record.clone());
                        changed.push((name, record));
                    }
                }
            }
        }

        for (name, record) in changed {
            tracing::trace!(
                router = %name,
                visible = record.current.visible,
                order = ?record.current.order,
                data = ?record.current.data,
                "Router state changed"
            );
            let subscribers: Vec<StateSubscriber> = self
                .subscribers
                .lock()
                .get(&name)
                .map(|list| list.iter().map(|(_, s)| Arc::clone(s)).collect())
                .unwrap_or_default();
            for subscriber in subscribers {
                subscriber(&name, &record);
            }
        }
    }

    /// `{current, historical}` for `name`.
    ///
    /// # Errors
    /// `StateUnavailable` if no state was ever derived for the router.
    pub fn state(&self, name: &str) -> Result<StateRecord> {
        self.records
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RouterError::StateUnavailable {
                name: name.to_string(),
            })
    }

    pub fn current(&self, name: &str) -> Option<RouterState> {
        self.records.read().get(name).map(|record| record.current.clone())
    }

    /// Previous states of `name`, most recent first.
    pub fn history(&self, name: &str) -> Result<Vec<RouterState>> {
        self.state(name)
            .map(|record| record.historical.into_iter().collect())
    }

    pub fn subscribe(&self, name: &str, subscriber: StateSubscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .entry(name.to_string())
            .or_default()
            .push((id, subscriber));
        id
    }

    pub fn unsubscribe(&self, name: &str, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let Some(list) = subscribers.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        list.len() != before
    }

    /// Drops the record and all subscriptions of `name`.
    pub fn remove(&self, name: &str) {
        self.records.write().remove(name);
        self.subscribers.lock().remove(name);
    }
}
