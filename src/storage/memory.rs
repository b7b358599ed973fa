use crate::Result;
use crate::storage::{KeyValueStore, StorageEvent};
use flume::Sender;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-process key-value namespace. Each handle is one "tab".
#[derive(Debug)]
pub struct MemoryKeyValueStore {
    shared: Arc<Mutex<Namespace>>,
    origin: u64,
}

#[derive(Debug, Default)]
struct Namespace {
    entries: HashMap<String, String>,
    watchers: Vec<Watcher>,
    next_origin: u64,
}

#[derive(Debug)]
struct Watcher {
    origin: u64,
    sender: Sender<StorageEvent>,
}

impl Namespace {
    fn broadcast(&mut self, origin: u64, key: &str, new_value: Option<String>) {
        let event = StorageEvent {
            key: key.to_string(),
            new_value,
        };

        // Disconnected receivers are pruned as we go
        self.watchers.retain(|watcher| {
            if watcher.origin == origin {
                return !watcher.sender.is_disconnected();
            }
            watcher.sender.send(event.clone()).is_ok()
        });
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Namespace {
                next_origin: 1,
                ..Default::default()
            })),
            origin: 0,
        }
    }

    /// Another handle on the same namespace, with its own origin
    pub fn open_tab(&self) -> Self {
        let mut namespace = self.lock();
        let origin = namespace.next_origin;
        namespace.next_origin += 1;

        Self {
            shared: Arc::clone(&self.shared),
            origin,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Namespace> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut namespace = self.lock();
        namespace.entries.insert(key.to_string(), value.to_string());
        namespace.broadcast(self.origin, key, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut namespace = self.lock();
        if namespace.entries.remove(key).is_some() {
            namespace.broadcast(self.origin, key, None);
        }
        Ok(())
    }

    fn watch(&self) -> flume::Receiver<StorageEvent> {
        let (sender, receiver) = flume::unbounded();
        self.lock().watchers.push(Watcher {
            origin: self.origin,
            sender,
        });
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_remove() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "[1]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1]"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn tabs_share_entries() {
        let first = MemoryKeyValueStore::new();
        let second = first.open_tab();

        first.set("k", "\"v\"").unwrap();
        assert_eq!(second.get("k").unwrap().as_deref(), Some("\"v\""));
    }

    #[test]
    fn events_only_reach_other_tabs() {
        let first = MemoryKeyValueStore::new();
        let second = first.open_tab();
        let own_events = first.watch();
        let other_events = second.watch();

        first.set("k", "1").unwrap();
        first.remove("k").unwrap();

        assert!(own_events.try_recv().is_err());
        assert_eq!(
            other_events.try_recv().unwrap(),
            StorageEvent {
                key: "k".to_string(),
                new_value: Some("1".to_string())
            }
        );
        assert_eq!(other_events.try_recv().unwrap().new_value, None);
    }

    #[test]
    fn removing_a_missing_key_is_silent() {
        let first = MemoryKeyValueStore::new();
        let second = first.open_tab();
        let events = second.watch();

        first.remove("missing").unwrap();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn dropped_watchers_are_pruned() {
        let first = MemoryKeyValueStore::new();
        let second = first.open_tab();
        drop(second.watch());

        first.set("k", "1").unwrap();
        assert!(first.lock().watchers.is_empty());
    }
}
