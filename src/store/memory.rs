//! In-memory history list.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::observers::{ObserverId, ObserverList};
use super::{ChangeOrigin, LocationChange, LocationObserver, LocationStore};
use crate::error::{Result, RouterError};

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Location store backed by a bounded in-memory history.
///
/// Pushing after going back drops the forward entries; once the capacity
/// is reached the oldest entry is evicted.
pub struct MemoryLocationStore {
    inner: Mutex<HistoryInner>,
    observers: ObserverList,
}

struct HistoryInner {
    entries: VecDeque<String>,
    index: usize,
    capacity: usize,
}

impl Default for MemoryLocationStore {
    fn default() -> Self {
        Self::new("/", DEFAULT_HISTORY_CAPACITY)
    }
}

impl MemoryLocationStore {
    /// Creates a store whose history holds `initial` only.
    pub fn new(initial: impl Into<String>, capacity: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial.into());
        Self {
            inner: Mutex::new(HistoryInner {
                entries,
                index: 0,
                capacity: capacity.max(1),
            }),
            observers: ObserverList::default(),
        }
    }

    /// All history entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    /// Position of the current entry in [`Self::entries`].
    pub fn index(&self) -> usize {
        self.inner.lock().index
    }
}

impl LocationStore for MemoryLocationStore {
    fn current(&self) -> String {
        let inner = self.inner.lock();
        inner.entries.get(inner.index).cloned().unwrap_or_else(|| "/".to_string())
    }

    fn commit(&self, serialized: String, replace: bool) {
        {
            let mut inner = self.inner.lock();
            if inner.entries.get(inner.index) == Some(&serialized) {
                return;
            }
            if replace {
                let index = inner.index;
                inner.entries[index] = serialized.clone();
            } else {
                let keep = inner.index + 1;
                inner.entries.truncate(keep);
                inner.entries.push_back(serialized.clone());
                while inner.entries.len() > inner.capacity {
                    inner.entries.pop_front();
                }
                inner.index = inner.entries.len() - 1;
            }
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

        let serialized = {
            let mut inner = self.inner.lock();
            let last = inner.entries.len() as i64 - 1;
            let target = (inner.index as i64).saturating_add(offset).clamp(0, last) as usize;
            if target == inner.index {
                tracing::debug!(offset, index = inner.index, "History navigation clamped to current entry");
                return Ok(());
            }
            inner.index = target;
            inner.entries[target].clone()
        };

        tracing::info!(offset, location = %serialized, "History navigated");
        self.observers.notify(&LocationChange {
            serialized,
            origin: ChangeOrigin::Navigation,
        });
        Ok(())
    }

    fn subscribe(&self, observer: LocationObserver) -> ObserverId {
        self.observers.add(observer)
    }

    fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder(store: &MemoryLocationStore) -> Arc<parking_lot::Mutex<Vec<LocationChange>>> {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(Arc::new(move |change: &LocationChange| sink.lock().push(change.clone())));
        seen
    }

    #[test]
    fn test_commit_pushes_and_notifies() {
        let store = MemoryLocationStore::default();
        let seen = recorder(&store);

        store.commit("/home".to_string(), false);
        assert_eq!(store.current(), "/home");
        assert_eq!(store.entries(), vec!["/", "/home"]);

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].origin, ChangeOrigin::Commit);
    }

    #[test]
    fn test_commit_same_location_is_noop() {
        let store = MemoryLocationStore::default();
        let seen = recorder(&store);
        store.commit("/".to_string(), false);
        assert_eq!(store.entries().len(), 1);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_replace_keeps_length() {
        let store = MemoryLocationStore::default();
        store.commit("/a".to_string(), false);
        store.commit("/b".to_string(), true);
        assert_eq!(store.entries(), vec!["/", "/b"]);
    }

    #[test]
    fn test_back_forward_and_truncation() {
        let store = MemoryLocationStore::default();
        store.commit("/a".to_string(), false);
        store.commit("/b".to_string(), false);

        store.back().unwrap();
        assert_eq!(store.current(), "/a");
        store.forward().unwrap();
        assert_eq!(store.current(), "/b");

        store.go(-2).unwrap();
        store.commit("/c".to_string(), false);
        assert_eq!(store.entries(), vec!["/", "/c"]);
    }

    #[test]
    fn test_go_clamps_to_oldest_entry() {
        let store = MemoryLocationStore::default();
        let seen = recorder(&store);
        assert!(store.go(-1).is_ok());
        assert_eq!(store.current(), "/");

        store.commit("/a".to_string(), false);
        store.go(-10).unwrap();
        assert_eq!(store.current(), "/");
        assert_eq!(seen.lock().last().map(|c| c.origin), Some(ChangeOrigin::Navigation));
    }

    #[test]
    fn test_go_zero_is_error() {
        let store = MemoryLocationStore::default();
        assert_eq!(store.go(0), Err(RouterError::InvalidHistoryOffset));
    }

    #[test]
    fn test_go_clamps_extreme_offsets() {
        let store = MemoryLocationStore::new("/", 10);
        store.commit("/a".to_string(), false);
        store.go(i64::MAX).unwrap();
        assert_eq!(store.index(), 1);
        store.go(i64::MIN).unwrap();
        assert_eq!(store.index(), 0);
        assert_eq!(store.current(), "/");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = MemoryLocationStore::new("/", 2);
        store.commit("/a".to_string(), false);
        store.commit("/b".to_string(), false);
        assert_eq!(store.entries(), vec!["/a", "/b"]);
        assert_eq!(store.index(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let store = MemoryLocationStore::default();
        let id = store.subscribe(Arc::new(|_: &LocationChange| {}));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
    }
}
