//! Key-value persistence adapters
//!
//! The pantry persists three JSON blobs under fixed keys. An adapter gives
//! synchronous get/set/remove on a shared namespace, plus a change channel
//! that reports writes made by *other* handles (another tab, another process).
//! A handle never sees events for its own writes.

pub mod file;
pub mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use crate::Result;

pub const INGREDIENTS_KEY: &str = "pantry-pal-ingredients";
pub const FAVORITES_KEY: &str = "pantry-pal-favorites";
pub const GENERATED_FAVORITES_KEY: &str = "pantry-pal-generated-favorites";

/// Every key the pantry reads and writes
pub const PANTRY_KEYS: [&str; 3] = [INGREDIENTS_KEY, FAVORITES_KEY, GENERATED_FAVORITES_KEY];

/// A value changed under our feet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed
    pub new_value: Option<String>,
}

impl StorageEvent {
    pub fn is_pantry_key(&self) -> bool {
        PANTRY_KEYS.contains(&self.key.as_str())
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Open a channel of changes made by other handles on the same namespace.
    /// Dropping the receiver stops delivery.
    fn watch(&self) -> flume::Receiver<StorageEvent>;
}
