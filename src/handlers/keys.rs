//! Keyboard Input Handling Module
//!
//! Translates key presses into `App` actions. Text input modes are handled
//! first, then the detail popup, then global keys, then the active screen.

use crate::app::{App, Focus, InputMode, Screen};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Returns true when the app should quit
pub fn handle_key_events(key: KeyEvent, app: &mut App) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.input_mode {
        InputMode::AddIngredient | InputMode::Preferences => return handle_input_mode_keys(key, app),
        InputMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.input_mode = InputMode::Normal;
            }
            return false;
        }
        InputMode::Normal => {}
    }

    if app.detail.is_some() {
        return handle_detail_keys(key, app);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char('?') => {
            app.clear_messages();
            app.input_mode = InputMode::Help;
            return false;
        }
        KeyCode::Esc => {
            app.clear_messages();
            return false;
        }
        KeyCode::Backspace | KeyCode::Left => {
            if app.can_go_back() {
                app.go_back();
            }
            return false;
        }
        KeyCode::Char('1') => {
            app.navigate_to(Screen::Pantry);
            return false;
        }
        KeyCode::Char('2') => {
            app.navigate_to(Screen::Favorites);
            return false;
        }
        KeyCode::Char('3') => {
            app.navigate_to(Screen::MealPlan);
            return false;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection(-1);
            return false;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection(1);
            return false;
        }
        _ => {}
    }

    match app.screen {
        Screen::Pantry => handle_pantry_keys(key, app),
        Screen::Favorites => handle_favorites_keys(key, app),
        Screen::MealPlan => handle_meal_plan_keys(key, app),
    }
    false
}

fn handle_input_mode_keys(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.input_buffer.clear();
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.input_buffer);
            match app.input_mode {
                InputMode::AddIngredient => app.submit_ingredient(&input),
                InputMode::Preferences => {
                    app.ai.preferences = input.trim().to_string();
                    app.set_success_message("Dietary preferences saved".to_string());
                }
                _ => {}
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
    false
}

fn handle_detail_keys(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.close_detail(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_current_favorite(),
        _ => {}
    }
    false
}

fn handle_pantry_keys(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('i') => {
            app.clear_messages();
            app.input_buffer.clear();
            app.input_mode = InputMode::AddIngredient;
        }
        KeyCode::Tab | KeyCode::Right => app.toggle_focus(),
        KeyCode::Char('d') | KeyCode::Delete if app.focus == Focus::Ingredients => {
            app.remove_selected_ingredient()
        }
        KeyCode::Char('C') => app.clear_ingredients(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.request_suggestion(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_current_favorite(),
        KeyCode::Enter => app.open_detail(),
        _ => {}
    }
}

fn handle_favorites_keys(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('f') | KeyCode::Char('d') | KeyCode::Delete => app.toggle_current_favorite(),
        _ => {}
    }
}

fn handle_meal_plan_keys(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Enter => app.request_meal_plan(),
        KeyCode::Char('e') | KeyCode::Char('p') => {
            app.clear_messages();
            app.input_buffer = app.ai.preferences.clone();
            app.input_mode = InputMode::Preferences;
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.ai.use_text_plan = !app.ai.use_text_plan;
            let mode = if app.ai.use_text_plan { "free text" } else { "structured" };
            app.set_success_message(format!("Meal plans will be {}", mode));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantrypal::models::Catalog;
    use pantrypal::pantry::{PantryBinding, PantryStore};
    use pantrypal::storage::MemoryKeyValueStore;
    use std::rc::Rc;

    fn app() -> App {
        let binding = PantryBinding::new(PantryStore::new(Rc::new(MemoryKeyValueStore::new())));
        App::with_parts(binding, Rc::new(Catalog::builtin().unwrap()), None)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_events(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_an_ingredient_adds_it() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.input_mode, InputMode::AddIngredient);

        type_text(&mut app, "Garlicq");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.snapshot.ingredients, vec!["garlic"]);
    }

    #[test]
    fn escape_cancels_input() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "leek");
        press(&mut app, KeyCode::Esc);

        assert!(app.input_buffer.is_empty());
        assert!(app.snapshot.ingredients.is_empty());
    }

    #[test]
    fn q_quits_but_closes_popups_first() {
        let mut app = app();
        app.add_ingredient("egg");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.detail.is_some());

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(app.detail.is_none());
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn preferences_are_edited_on_meal_plan_screen() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::MealPlan);

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "vegan");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ai.preferences, "vegan");

        press(&mut app, KeyCode::Char('t'));
        assert!(app.ai.use_text_plan);
    }

    #[test]
    fn delete_removes_selected_ingredient() {
        let mut app = app();
        app.add_ingredient("egg");
        app.add_ingredient("rice");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.snapshot.ingredients, vec!["egg"]);
    }
}
