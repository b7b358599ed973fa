use crate::models::{GeneratedRecipe, PantryState, RecipeId};
use crate::pantry::{PantryStore, Subscription};
use crate::storage::StorageEvent;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    Uninitialized,
    Hydrating,
    Ready,
    TornDown,
}

/// Connects one view to the pantry store.
///
/// Before `mount` the view only ever sees the empty default snapshot, which
/// is what a render without storage access would produce. `mount` hydrates
/// from storage exactly once and starts listening to the store and to
/// changes made by other tabs. Dropping the binding releases both.
pub struct PantryBinding {
    store: PantryStore,
    phase: BindingPhase,
    default_snapshot: Rc<PantryState>,
    subscription: Option<Subscription>,
    storage_events: Option<flume::Receiver<StorageEvent>>,
    render_pending: Rc<Cell<bool>>,
}

impl PantryBinding {
    pub fn new(store: PantryStore) -> Self {
        Self {
            store,
            phase: BindingPhase::Uninitialized,
            default_snapshot: Rc::new(PantryState::default()),
            subscription: None,
            storage_events: None,
            render_pending: Rc::new(Cell::new(false)),
        }
    }

    pub fn phase(&self) -> BindingPhase {
        self.phase
    }

    /// False until hydration has run: "no data yet" rather than "empty"
    pub fn is_ready(&self) -> bool {
        self.phase == BindingPhase::Ready
    }

    pub fn store(&self) -> &PantryStore {
        &self.store
    }

    pub fn snapshot(&self) -> Rc<PantryState> {
        match self.phase {
            BindingPhase::Ready => self.store.get_snapshot(),
            _ => Rc::clone(&self.default_snapshot),
        }
    }

    /// Client-side activation. Only the first call does anything.
    pub fn mount(&mut self) {
        match self.phase {
            BindingPhase::Uninitialized => {}
            BindingPhase::TornDown => {
                warn!("Refusing to mount a torn-down pantry binding");
                return;
            }
            BindingPhase::Hydrating | BindingPhase::Ready => return,
        }

        self.phase = BindingPhase::Hydrating;

        let pending = Rc::clone(&self.render_pending);
        self.subscription = Some(self.store.subscribe(move || pending.set(true)));
        self.storage_events = Some(self.store.storage().watch());

        self.store.load_from_persistence();
        // Leaving the default snapshot always changes what the view shows
        self.render_pending.set(true);
        self.phase = BindingPhase::Ready;
        debug!("Pantry binding hydrated");
    }

    /// Apply changes from other tabs and report whether the view should
    /// re-render. Several storage events in one poll cost one reload.
    pub fn poll(&mut self) -> bool {
        if self.phase != BindingPhase::Ready {
            return false;
        }

        let mut external_change = false;
        if let Some(events) = &self.storage_events {
            for event in events.try_iter() {
                if event.is_pantry_key() {
                    debug!(key = %event.key, "Pantry changed in another tab");
                    external_change = true;
                }
            }
        }

        if external_change {
            self.store.load_from_persistence();
        }

        self.render_pending.replace(false)
    }

    pub fn unmount(&mut self) {
        if self.phase == BindingPhase::TornDown {
            return;
        }

        self.subscription = None;
        self.storage_events = None;
        self.phase = BindingPhase::TornDown;
    }

    /// Actions only run once hydrated. Before that they would build on the
    /// empty default and overwrite what is persisted.
    fn ready_store(&self, action: &str) -> Option<&PantryStore> {
        if self.phase == BindingPhase::Ready {
            Some(&self.store)
        } else {
            warn!(action, phase = ?self.phase, "Ignoring pantry action on an unmounted binding");
            None
        }
    }

    pub fn add_ingredient(&self, name: &str) {
        if let Some(store) = self.ready_store("add_ingredient") {
            store.add_ingredient(name);
        }
    }

    pub fn remove_ingredient(&self, name: &str) {
        if let Some(store) = self.ready_store("remove_ingredient") {
            store.remove_ingredient(name);
        }
    }

    pub fn clear_ingredients(&self) {
        if let Some(store) = self.ready_store("clear_ingredients") {
            store.clear_ingredients();
        }
    }

    pub fn toggle_favorite(&self, recipe_id: RecipeId) {
        if let Some(store) = self.ready_store("toggle_favorite") {
            store.toggle_favorite(recipe_id);
        }
    }

    pub fn toggle_generated_favorite(&self, recipe: &GeneratedRecipe) {
        if let Some(store) = self.ready_store("toggle_generated_favorite") {
            store.toggle_generated_favorite(recipe);
        }
    }
}

impl Drop for PantryBinding {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for PantryBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PantryBinding")
            .field("phase", &self.phase)
            .field("store", &self.store)
            .finish()
    }
}
