//! Two tabs sharing one pantry, through the public API only

use pantrypal::models::{Catalog, RecipeSuggestion};
use pantrypal::pantry::{BindingPhase, PantryBinding, PantryStore};
use pantrypal::search;
use pantrypal::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

fn file_store(dir: &std::path::Path) -> Rc<dyn KeyValueStore> {
    Rc::new(
        FileKeyValueStore::open(dir)
            .unwrap()
            .with_poll_interval(Duration::from_millis(10)),
    )
}

/// Poll until the binding reports a change or the deadline passes
fn poll_until_changed(binding: &mut PantryBinding) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if binding.poll() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn memory_tabs_converge_after_poll() {
    let tab_a = MemoryKeyValueStore::new();
    let tab_b = tab_a.open_tab();

    let mut view_a = PantryBinding::new(PantryStore::new(Rc::new(tab_a)));
    let mut view_b = PantryBinding::new(PantryStore::new(Rc::new(tab_b)));
    view_a.mount();
    view_b.mount();
    assert!(view_a.poll());
    assert!(view_b.poll());

    view_a.add_ingredient("Egg");
    view_a.add_ingredient("rice");
    view_a.toggle_favorite(10);

    assert!(view_a.poll());
    assert!(view_b.snapshot().ingredients.is_empty());

    assert!(view_b.poll());
    assert_eq!(view_b.snapshot().ingredients, vec!["egg", "rice"]);
    assert!(view_b.snapshot().is_favorite(10));

    // Nothing further happened in tab A, so B has nothing to re-render
    assert!(!view_b.poll());
}

#[test]
fn processes_sharing_a_data_folder_see_each_other() {
    let dir = tempfile::tempdir().unwrap();

    let mut tui = PantryBinding::new(PantryStore::new(file_store(dir.path())));
    tui.mount();
    assert!(tui.poll());
    assert!(tui.snapshot().ingredients.is_empty());

    let notified = Rc::new(Cell::new(0));
    let _subscription = {
        let notified = Rc::clone(&notified);
        tui.store().subscribe(move || notified.set(notified.get() + 1))
    };

    // A one-shot CLI command in another process
    let cli = PantryStore::new(file_store(dir.path()));
    cli.load_from_persistence();
    cli.add_ingredient("tomato");
    cli.add_ingredient("basil");

    assert!(poll_until_changed(&mut tui));
    // The watcher may split the two writes across polls
    if tui.snapshot().ingredients.len() < 2 {
        assert!(poll_until_changed(&mut tui));
    }
    assert_eq!(tui.snapshot().ingredients, vec!["tomato", "basil"]);
    assert!(notified.get() >= 1);

    let catalog = Catalog::builtin().unwrap();
    let titles: Vec<&str> = search::match_recipes(&catalog, &tui.snapshot().ingredients)
        .iter()
        .map(|found| found.recipe.title.as_str())
        .collect();
    assert_eq!(titles[..2], ["Classic Tomato Pasta", "Caprese Salad"]);
}

#[test]
fn another_process_reverting_to_our_last_write_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();

    let mut tab = PantryBinding::new(PantryStore::new(file_store(dir.path())));
    tab.mount();
    tab.add_ingredient("egg");
    assert!(tab.poll());

    let other = PantryStore::new(file_store(dir.path()));
    other.load_from_persistence();
    other.add_ingredient("milk");
    assert!(poll_until_changed(&mut tab));
    assert_eq!(tab.snapshot().ingredients, vec!["egg", "milk"]);

    // Disk now holds exactly what this tab wrote earlier
    other.remove_ingredient("milk");
    assert!(poll_until_changed(&mut tab));
    assert_eq!(tab.snapshot().ingredients, vec!["egg"]);

    // A later local action must not resurrect the removed entry
    tab.toggle_favorite(1);
    let reloaded = PantryStore::new(file_store(dir.path()));
    reloaded.load_from_persistence();
    assert_eq!(reloaded.get_snapshot().ingredients, vec!["egg"]);
}

#[test]
fn generated_favorites_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let recipe = RecipeSuggestion {
        title: "Midnight Noodles".to_string(),
        description: "Quick and salty.".to_string(),
        prep_time: "10 mins".to_string(),
        ..Default::default()
    }
    .into_generated_with_id(42);

    {
        let mut first_run = PantryBinding::new(PantryStore::new(file_store(dir.path())));
        first_run.mount();
        first_run.toggle_generated_favorite(&recipe);
        first_run.add_ingredient("noodles");
    }

    let mut second_run = PantryBinding::new(PantryStore::new(file_store(dir.path())));
    assert_eq!(second_run.phase(), BindingPhase::Uninitialized);
    assert!(second_run.snapshot().favorite_generated_recipes.is_empty());

    second_run.mount();
    let snapshot = second_run.snapshot();
    assert_eq!(snapshot.favorite_generated_recipes, vec![recipe]);
    assert_eq!(snapshot.ingredients, vec!["noodles"]);
}

#[test]
fn corrupt_files_fall_back_to_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pantry-pal-ingredients.json"), "not json").unwrap();
    std::fs::write(dir.path().join("pantry-pal-favorites.json"), "[1, 2]").unwrap();

    let mut binding = PantryBinding::new(PantryStore::new(file_store(dir.path())));
    binding.mount();

    let snapshot = binding.snapshot();
    assert!(snapshot.ingredients.is_empty());
    assert!(snapshot.is_favorite(1) && snapshot.is_favorite(2));
}
