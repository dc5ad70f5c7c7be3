use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{LocationChange, LocationObserver};

/// Handle returned by [`super::LocationStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observer list shared by the location store implementations.
///
/// Observers are invoked on a snapshot taken outside the lock, so they may
/// subscribe, unsubscribe or commit again while being notified.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: AtomicU64,
    observers: Mutex<Vec<(ObserverId, LocationObserver)>>,
}

impl ObserverList {
    pub fn add(&self, observer: LocationObserver) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, observer));
        id
    }

    pub fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn notify(&self, change: &LocationChange) {
        let snapshot: Vec<LocationObserver> = self
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in snapshot {
            observer(change);
        }
    }
}
