//! User Interface Module
//!
//! Rendering only: every function here reads `App` and draws, none of them
//! change state.

pub mod colors;
pub mod components;
pub mod favorites;
pub mod meal_plan;
pub mod pantry;
pub mod recipe_details;

use crate::app::{App, InputMode, Screen};
use colors::RosePine;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::Style,
    widgets::{Block, Widget},
};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(RosePine::BASE))
        .render(area, frame.buffer_mut());

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .split(area);

    components::render_tabs(frame, chunks[0], app);
    match app.screen {
        Screen::Pantry => pantry::render(frame, chunks[1], app),
        Screen::Favorites => favorites::render(frame, chunks[1], app),
        Screen::MealPlan => meal_plan::render(frame, chunks[1], app),
    }
    components::render_status_line(frame, chunks[2], app);
    components::render_bottom_bar(frame, chunks[3], app);

    if app.detail.is_some() {
        recipe_details::render_popup(frame, app);
    }
    match app.input_mode {
        InputMode::AddIngredient => {
            components::render_input_popup(frame, " Add Ingredient ", "e.g. tomatoes", app)
        }
        InputMode::Preferences => components::render_input_popup(
            frame,
            " Dietary Preferences ",
            "e.g. vegetarian, no nuts",
            app,
        ),
        InputMode::Help => components::render_help_popup(frame),
        InputMode::Normal => {}
    }
}
