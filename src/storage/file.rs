use crate::storage::{KeyValueStore, StorageEvent};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One JSON file per key inside a data folder. Several processes may share
/// the folder; each one sees the others' writes through `watch()`.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    /// Writes this process made that no watcher has observed yet, per key
    own_writes: Arc<Mutex<HashMap<String, Option<String>>>>,
    poll_interval: Duration,
}

impl FileKeyValueStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            own_writes: Arc::new(Mutex::new(HashMap::new())),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(Error::InvalidInput(format!("Invalid storage key: {:?}", key)));
        }

        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn record_own_write(&self, key: &str, value: Option<String>) {
        self.own_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

/// Write to a uniquely named sibling file, then rename it over `path`
fn write_atomically(dir: &Path, path: &Path, value: &str) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(value.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_value(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Current contents of every visible key file in `dir`
fn scan(dir: &Path) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        let Some(key) = file_name.strip_suffix(".json") else {
            continue;
        };
        if let Some(value) = read_value(&path)? {
            values.insert(key.to_string(), value);
        }
    }

    Ok(values)
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        read_value(&self.path_for(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        // Record first so a watcher that races the rename still treats it as ours
        self.record_own_write(key, Some(value.to_string()));

        write_atomically(&self.dir, &path, value)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.record_own_write(key, None);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn watch(&self) -> flume::Receiver<StorageEvent> {
        let (sender, receiver) = flume::unbounded();

        let dir = self.dir.clone();
        let own_writes = Arc::clone(&self.own_writes);
        let interval = self.poll_interval;
        let mut seen = scan(&dir).unwrap_or_default();

        // Poll the folder until the receiver goes away
        let spawned = thread::Builder::new()
            .name("pantrypal-storage-watch".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(interval);
                    if sender.is_disconnected() {
                        break;
                    }

                    let current = match scan(&dir) {
                        Ok(current) => current,
                        Err(e) => {
                            debug!(error = %e, "Storage scan failed, retrying");
                            continue;
                        }
                    };

                    let keys: HashSet<&String> = seen.keys().chain(current.keys()).collect();
                    for key in keys {
                        let now = current.get(key);
                        if seen.get(key) == now {
                            continue;
                        }

                        // The first change seen after one of our writes settles it,
                        // whether or not the value is still ours
                        let pending = own_writes
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .remove(key.as_str());
                        if pending.is_some_and(|own| own.as_ref() == now) {
                            continue;
                        }

                        debug!(key = %key, "Detected external storage change");
                        let event = StorageEvent {
                            key: key.clone(),
                            new_value: now.cloned(),
                        };
                        if sender.send(event).is_err() {
                            return;
                        }
                    }

                    seen = current;
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, "Failed to start storage watcher");
        }

        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path) -> FileKeyValueStore {
        FileKeyValueStore::open(dir)
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
    }

    #[test]
    fn values_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        assert_eq!(store.get("pantry-pal-ingredients").unwrap(), None);
        store.set("pantry-pal-ingredients", "[\"egg\"]").unwrap();
        assert_eq!(
            store.get("pantry-pal-ingredients").unwrap().as_deref(),
            Some("[\"egg\"]")
        );
        assert!(dir.path().join("pantry-pal-ingredients.json").exists());

        store.set("pantry-pal-ingredients", "[]").unwrap();
        assert_eq!(store.get("pantry-pal-ingredients").unwrap().as_deref(), Some("[]"));

        store.remove("pantry-pal-ingredients").unwrap();
        store.remove("pantry-pal-ingredients").unwrap();
        assert_eq!(store.get("pantry-pal-ingredients").unwrap(), None);
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        assert!(matches!(store.set("../escape", "1"), Err(Error::InvalidInput(_))));
        assert!(matches!(store.get(".hidden"), Err(Error::InvalidInput(_))));
        assert!(matches!(store.remove(""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn watcher_reports_other_process_writes() {
        let dir = tempfile::tempdir().unwrap();
        let this_process = open(dir.path());
        let other_process = open(dir.path());
        let events = this_process.watch();

        other_process.set("pantry-pal-favorites", "[3]").unwrap();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.key, "pantry-pal-favorites");
        assert_eq!(event.new_value.as_deref(), Some("[3]"));

        other_process.remove("pantry-pal-favorites").unwrap();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.new_value, None);
    }

    #[test]
    fn another_process_restoring_our_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let this_process = open(dir.path());
        let other_process = open(dir.path());
        let events = this_process.watch();

        this_process.set("pantry-pal-ingredients", "[\"egg\"]").unwrap();
        other_process.set("pantry-pal-ingredients", "[\"egg\",\"milk\"]").unwrap();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.new_value.as_deref(), Some("[\"egg\",\"milk\"]"));

        other_process.set("pantry-pal-ingredients", "[\"egg\"]").unwrap();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.new_value.as_deref(), Some("[\"egg\"]"));
    }

    #[test]
    fn concurrent_writers_never_publish_torn_values() {
        let dir = tempfile::tempdir().unwrap();
        let writers: Vec<_> = ["[1,2,3]", "[4,5,6,7,8,9]"]
            .into_iter()
            .map(|value| {
                let store = open(dir.path());
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.set("pantry-pal-favorites", value).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = open(dir.path());
        let value = store.get("pantry-pal-favorites").unwrap().unwrap();
        assert!(value == "[1,2,3]" || value == "[4,5,6,7,8,9]", "torn value {value}");

        // No temp files are left behind
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn watcher_skips_own_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let events = store.watch();

        store.set("pantry-pal-favorites", "[1]").unwrap();
        assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
