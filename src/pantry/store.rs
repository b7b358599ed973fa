use crate::models::{GeneratedRecipe, PantryState, RecipeId, normalize_ingredient};
use crate::storage::{FAVORITES_KEY, GENERATED_FAVORITES_KEY, INGREDIENTS_KEY, KeyValueStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

type Listener = Rc<dyn Fn()>;

struct StoreState {
    snapshot: Rc<PantryState>,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
}

/// The single writer of `PantryState`.
///
/// Cloning gives another handle on the same store. Every action writes
/// through to the key-value adapter before any listener runs, and never
/// fails: storage problems are logged and the in-memory state moves on.
#[derive(Clone)]
pub struct PantryStore {
    state: Rc<RefCell<StoreState>>,
    storage: Rc<dyn KeyValueStore>,
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    state: Weak<RefCell<StoreState>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().listeners.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for PantryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PantryStore")
            .field("snapshot", &state.snapshot)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl PantryStore {
    /// A store holding the empty default state. Nothing is read from storage
    /// until `load_from_persistence` runs.
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState {
                snapshot: Rc::new(PantryState::default()),
                listeners: BTreeMap::new(),
                next_listener_id: 0,
            })),
            storage,
        }
    }

    pub fn storage(&self) -> &Rc<dyn KeyValueStore> {
        &self.storage
    }

    /// Same `Rc` for as long as the state is unchanged
    pub fn get_snapshot(&self) -> Rc<PantryState> {
        Rc::clone(&self.state.borrow().snapshot)
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.insert(id, Rc::new(listener));

        Subscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn has_ingredient(&self, name: &str) -> bool {
        self.state.borrow().snapshot.has_ingredient(name)
    }

    pub fn is_favorite(&self, recipe_id: RecipeId) -> bool {
        self.state.borrow().snapshot.is_favorite(recipe_id)
    }

    pub fn is_generated_favorite(&self, recipe_id: RecipeId) -> bool {
        self.state.borrow().snapshot.is_generated_favorite(recipe_id)
    }

    pub fn add_ingredient(&self, name: &str) {
        let Some(ingredient) = normalize_ingredient(name) else {
            debug!("Ignoring blank ingredient");
            return;
        };

        let current = self.get_snapshot();
        if current.ingredients.contains(&ingredient) {
            debug!(ingredient = %ingredient, "Ingredient already in pantry");
            return;
        }

        let mut next = PantryState::clone(&current);
        next.ingredients.push(ingredient);
        self.persist(INGREDIENTS_KEY, &next.ingredients);
        self.replace(next);
        self.notify();
    }

    /// Persists and notifies even when nothing matched; the snapshot is only
    /// replaced when an entry was actually removed.
    pub fn remove_ingredient(&self, name: &str) {
        let current = self.get_snapshot();
        let ingredient = normalize_ingredient(name).unwrap_or_default();

        if current.ingredients.contains(&ingredient) {
            let mut next = PantryState::clone(&current);
            next.ingredients.retain(|existing| *existing != ingredient);
            self.persist(INGREDIENTS_KEY, &next.ingredients);
            self.replace(next);
        } else {
            debug!(ingredient = %ingredient, "Ingredient not in pantry");
            self.persist(INGREDIENTS_KEY, &current.ingredients);
        }
        self.notify();
    }

    pub fn clear_ingredients(&self) {
        let current = self.get_snapshot();

        if let Err(e) = self.storage.remove(INGREDIENTS_KEY) {
            warn!(key = INGREDIENTS_KEY, error = %e, "Failed to clear pantry entry");
        }
        if !current.ingredients.is_empty() {
            let mut next = PantryState::clone(&current);
            next.ingredients.clear();
            self.replace(next);
        }
        self.notify();
    }

    pub fn toggle_favorite(&self, recipe_id: RecipeId) {
        let mut next = PantryState::clone(&self.get_snapshot());
        if !next.favorite_recipe_ids.remove(&recipe_id) {
            next.favorite_recipe_ids.insert(recipe_id);
        }

        self.persist(FAVORITES_KEY, &next.favorite_recipe_ids);
        self.replace(next);
        self.notify();
    }

    pub fn toggle_generated_favorite(&self, recipe: &GeneratedRecipe) {
        let mut next = PantryState::clone(&self.get_snapshot());
        let before = next.favorite_generated_recipes.len();
        next.favorite_generated_recipes
            .retain(|existing| existing.id != recipe.id);
        if next.favorite_generated_recipes.len() == before {
            next.favorite_generated_recipes.push(recipe.clone());
        }

        self.persist(GENERATED_FAVORITES_KEY, &next.favorite_generated_recipes);
        self.replace(next);
        self.notify();
    }

    /// Re-read every key and adopt the result if it differs from what we
    /// hold. Returns whether subscribers were notified.
    pub fn load_from_persistence(&self) -> bool {
        let loaded = PantryState::from_parts(
            self.read_entry(INGREDIENTS_KEY),
            self.read_entry(FAVORITES_KEY),
            self.read_entry(GENERATED_FAVORITES_KEY),
        );

        if *self.get_snapshot() == loaded {
            debug!("Persisted pantry unchanged");
            return false;
        }

        debug!(
            ingredients = loaded.ingredients.len(),
            favorites = loaded.favorite_count(),
            "Loaded pantry from storage"
        );
        self.replace(loaded);
        self.notify();
        true
    }

    fn read_entry<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.storage.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "Discarding unreadable pantry entry");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read pantry entry");
                T::default()
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(crate::Error::from)
            .and_then(|json| self.storage.set(key, &json));

        if let Err(e) = result {
            warn!(key, error = %e, "Failed to persist pantry entry");
        }
    }

    fn replace(&self, next: PantryState) {
        self.state.borrow_mut().snapshot = Rc::new(next);
    }

    fn notify(&self) {
        // Release the borrow before calling out; listeners may re-enter
        let listeners: Vec<Listener> = self.state.borrow().listeners.values().cloned().collect();
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use std::cell::Cell;

    fn store_with(storage: MemoryKeyValueStore) -> PantryStore {
        PantryStore::new(Rc::new(storage))
    }

    fn counting_listener(store: &PantryStore) -> (Rc<Cell<usize>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let subscription = store.subscribe(move || counter.set(counter.get() + 1));
        (count, subscription)
    }

    fn generated(id: RecipeId, title: &str) -> GeneratedRecipe {
        GeneratedRecipe {
            id,
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn fresh_store_is_empty() {
        let store = store_with(MemoryKeyValueStore::new());
        store.load_from_persistence();

        let snapshot = store.get_snapshot();
        assert!(snapshot.ingredients.is_empty());
        assert!(snapshot.favorite_recipe_ids.is_empty());
        assert!(snapshot.favorite_generated_recipes.is_empty());
    }

    #[test]
    fn add_ingredient_is_case_insensitive_and_idempotent() {
        let store = store_with(MemoryKeyValueStore::new());
        let (count, _subscription) = counting_listener(&store);

        store.add_ingredient("Tomato");
        store.add_ingredient("Tomato");
        store.add_ingredient("TOMATO");

        assert_eq!(store.get_snapshot().ingredients, vec!["tomato"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn add_ingredient_appends_in_order() {
        let store = store_with(MemoryKeyValueStore::new());
        store.add_ingredient("egg");
        store.add_ingredient("Milk");
        store.add_ingredient("   ");

        assert_eq!(store.get_snapshot().ingredients, vec!["egg", "milk"]);
    }

    #[test]
    fn snapshot_reference_is_stable_until_mutation() {
        let store = store_with(MemoryKeyValueStore::new());
        let first = store.get_snapshot();
        let second = store.get_snapshot();
        assert!(Rc::ptr_eq(&first, &second));

        store.add_ingredient("egg");
        let third = store.get_snapshot();
        assert!(!Rc::ptr_eq(&second, &third));
        assert!(first.ingredients.is_empty());
    }

    #[test]
    fn writes_land_before_listeners_run() {
        let storage = Rc::new(MemoryKeyValueStore::new());
        let store = PantryStore::new(storage.clone());
        let observed = Rc::new(RefCell::new(None));

        let seen = Rc::clone(&observed);
        let probe = Rc::clone(&storage);
        let _subscription = store.subscribe(move || {
            *seen.borrow_mut() = probe.get(INGREDIENTS_KEY).unwrap();
        });

        store.add_ingredient("Egg");
        assert_eq!(observed.borrow().as_deref(), Some("[\"egg\"]"));
    }

    #[test]
    fn remove_ingredient_normalizes_name() {
        let store = store_with(MemoryKeyValueStore::new());
        store.add_ingredient("egg");
        store.add_ingredient("milk");

        store.remove_ingredient(" EGG ");
        assert_eq!(store.get_snapshot().ingredients, vec!["milk"]);
    }

    #[test]
    fn removing_missing_ingredient_still_notifies_without_new_snapshot() {
        let store = store_with(MemoryKeyValueStore::new());
        store.add_ingredient("egg");
        let before = store.get_snapshot();
        let (count, _subscription) = counting_listener(&store);

        store.remove_ingredient("saffron");

        assert_eq!(count.get(), 1);
        assert!(Rc::ptr_eq(&before, &store.get_snapshot()));
    }

    #[test]
    fn clear_ingredients_removes_persisted_entry() {
        let storage = Rc::new(MemoryKeyValueStore::new());
        let store = PantryStore::new(storage.clone());
        store.add_ingredient("egg");
        store.toggle_favorite(2);

        store.clear_ingredients();

        assert!(store.get_snapshot().ingredients.is_empty());
        assert!(store.is_favorite(2));
        assert_eq!(storage.get(INGREDIENTS_KEY).unwrap(), None);
    }

    #[test]
    fn toggle_favorite_is_symmetric() {
        let store = store_with(MemoryKeyValueStore::new());
        store.toggle_favorite(1);
        let original = store.get_snapshot().favorite_recipe_ids.clone();

        store.toggle_favorite(5);
        assert!(store.is_favorite(5));
        store.toggle_favorite(5);

        assert_eq!(store.get_snapshot().favorite_recipe_ids, original);
    }

    #[test]
    fn generated_favorite_lifecycle() {
        let store = store_with(MemoryKeyValueStore::new());
        let dish = generated(1001, "Test Dish");

        store.toggle_generated_favorite(&dish);
        assert!(store.is_generated_favorite(1001));
        assert_eq!(store.get_snapshot().favorite_generated_recipes, vec![dish.clone()]);

        // Removal matches on id only
        store.toggle_generated_favorite(&generated(1001, "Renamed"));
        assert!(store.get_snapshot().favorite_generated_recipes.is_empty());
    }

    #[test]
    fn state_round_trips_through_persistence() {
        let storage = MemoryKeyValueStore::new();
        let reloaded_storage = storage.open_tab();
        let store = store_with(storage);

        store.add_ingredient("Egg");
        store.toggle_favorite(3);
        store.toggle_generated_favorite(&generated(42, "Soup"));
        let before = store.get_snapshot();

        let reloaded = store_with(reloaded_storage);
        reloaded.load_from_persistence();

        assert_eq!(*reloaded.get_snapshot(), *before);
    }

    #[test]
    fn reload_without_changes_keeps_snapshot_and_stays_quiet() {
        let store = store_with(MemoryKeyValueStore::new());
        store.add_ingredient("egg");
        let before = store.get_snapshot();
        let (count, _subscription) = counting_listener(&store);

        assert!(!store.load_from_persistence());
        assert_eq!(count.get(), 0);
        assert!(Rc::ptr_eq(&before, &store.get_snapshot()));
    }

    #[test]
    fn external_write_converges_with_one_notification() {
        let storage = MemoryKeyValueStore::new();
        let other_tab = storage.open_tab();
        let store = store_with(storage);
        let (count, _subscription) = counting_listener(&store);

        other_tab.set(INGREDIENTS_KEY, r#"["a","b"]"#).unwrap();

        assert!(store.load_from_persistence());
        assert_eq!(store.get_snapshot().ingredients, vec!["a", "b"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn malformed_json_loads_as_empty() {
        let storage = MemoryKeyValueStore::new();
        storage.set(INGREDIENTS_KEY, "{not json").unwrap();
        storage.set(FAVORITES_KEY, "[7]").unwrap();
        let store = store_with(storage);

        store.load_from_persistence();

        let snapshot = store.get_snapshot();
        assert!(snapshot.ingredients.is_empty());
        assert!(snapshot.is_favorite(7));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = store_with(MemoryKeyValueStore::new());
        let (count, subscription) = counting_listener(&store);
        let (_other_count, _other) = counting_listener(&store);
        assert_eq!(store.listener_count(), 2);

        drop(subscription);
        store.add_ingredient("egg");

        assert_eq!(count.get(), 0);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn listeners_can_read_snapshot_and_unsubscribe_reentrantly() {
        let store = store_with(MemoryKeyValueStore::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let reader = store.clone();
        let seen_in_listener = Rc::clone(&seen);
        let slot_in_listener = Rc::clone(&slot);
        let subscription = store.subscribe(move || {
            seen_in_listener
                .borrow_mut()
                .push(reader.get_snapshot().ingredients.len());
            slot_in_listener.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(subscription);

        store.add_ingredient("egg");
        store.add_ingredient("milk");

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(store.listener_count(), 0);
    }

    /// Every read and write fails, like a full disk or a revoked folder
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> crate::Result<Option<String>> {
            Err(crate::Error::Storage("disk unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Err(crate::Error::Storage("disk full".to_string()))
        }

        fn remove(&self, _key: &str) -> crate::Result<()> {
            Err(crate::Error::Storage("disk full".to_string()))
        }

        fn watch(&self) -> flume::Receiver<crate::storage::StorageEvent> {
            flume::unbounded().1
        }
    }

    #[test]
    fn failed_writes_still_update_state_and_notify() {
        let store = PantryStore::new(Rc::new(BrokenStorage));
        let (count, _subscription) = counting_listener(&store);

        store.add_ingredient("Egg");
        store.toggle_favorite(7);
        store.toggle_generated_favorite(&generated(11, "Fried rice"));
        store.clear_ingredients();

        let snapshot = store.get_snapshot();
        assert!(snapshot.ingredients.is_empty());
        assert!(snapshot.is_favorite(7));
        assert!(snapshot.is_generated_favorite(11));
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn failed_reads_load_as_empty_state() {
        let store = PantryStore::new(Rc::new(BrokenStorage));
        let (count, _subscription) = counting_listener(&store);

        assert!(!store.load_from_persistence());
        assert_eq!(*store.get_snapshot(), PantryState::default());
        assert_eq!(count.get(), 0);

        store.add_ingredient("egg");
        assert!(store.load_from_persistence());
        assert!(store.get_snapshot().ingredients.is_empty());
        assert_eq!(count.get(), 2);
    }
}
