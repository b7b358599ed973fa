//! UI Components and Layout Module
//!
//! Reusable pieces shared by every screen.
//!
//! # Components
//!
//! - **Tabs**: screen switcher with the pantry and favorites counts
//! - **Status line**: the latest success or error message, or the AI spinner
//! - **Bottom Navigation Bar**: breadcrumbs and keyboard shortcuts
//! - **Popups**: text input and help

use crate::app::{App, DetailView, Focus, InputMode, Screen};
use crate::handlers::ai::spinner_frame;
use crate::ui::colors::RosePine;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Tabs, Widget, Wrap},
};

/// A `width` x `height` rectangle centered in `area`, clipped to fit
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles = vec![
        format!(" 1 󰏗 Pantry ({}) ", app.snapshot.ingredients.len()),
        format!(" 2 ★ Favorites ({}) ", app.favorite_items().len()),
        " 3 󰃭 Meal Plan ".to_string(),
    ];
    let selected = match app.screen {
        Screen::Pantry => 0,
        Screen::Favorites => 1,
        Screen::MealPlan => 2,
    };

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(RosePine::SUBTLE))
        .highlight_style(Style::default().fg(RosePine::BASE).bg(RosePine::IRIS).bold())
        .divider(Span::styled("│", Style::default().fg(RosePine::MUTED)))
        .block(
            Block::bordered()
                .title(" PantryPal ")
                .title_alignment(Alignment::Left)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(RosePine::HIGHLIGHT_HIGH)),
        )
        .render(area, frame.buffer_mut());
}

pub fn render_status_line(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(error) = &app.error_message {
        Line::from(Span::styled(format!(" ✗ {}", error), Style::default().fg(RosePine::LOVE)))
    } else if app.ai.is_busy() {
        let text = app.success_message.as_deref().unwrap_or("Waiting for the AI model...");
        Line::from(vec![
            Span::styled(
                format!(" {} ", spinner_frame(app.ai.loading_frame)),
                Style::default().fg(RosePine::IRIS),
            ),
            Span::styled(text.to_string(), Style::default().fg(RosePine::SUBTLE)),
        ])
    } else if let Some(success) = &app.success_message {
        Line::from(Span::styled(format!(" ✓ {}", success), Style::default().fg(RosePine::FOAM)))
    } else if !app.binding.is_ready() {
        Line::from(Span::styled(" Loading pantry...", Style::default().fg(RosePine::MUTED)))
    } else {
        Line::default()
    };

    Paragraph::new(line).render(area, frame.buffer_mut());
}

/// Breadcrumbs on the left, shortcuts for the current context on the right
pub fn render_bottom_bar(frame: &mut Frame, area: Rect, app: &App) {
    let navbar_chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(2)]).split(area);

    let left_content = Paragraph::new(breadcrumbs(app))
        .alignment(Alignment::Left)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(RosePine::HIGHLIGHT_HIGH)),
        );

    let right_content = Paragraph::new(context_shortcuts(app))
        .alignment(Alignment::Right)
        .style(Style::default().fg(RosePine::MUTED))
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(RosePine::HIGHLIGHT_HIGH)),
        );

    left_content.render(navbar_chunks[0], frame.buffer_mut());
    right_content.render(navbar_chunks[1], frame.buffer_mut());
}

fn context_shortcuts(app: &App) -> String {
    let back_hint = if app.can_go_back() { " [←] Back │" } else { "" };

    match app.input_mode {
        InputMode::AddIngredient | InputMode::Preferences => {
            return " [⏎] Confirm │ [Esc] Cancel ".to_string();
        }
        InputMode::Help => return " [Esc] Close ".to_string(),
        InputMode::Normal => {}
    }

    if app.detail.is_some() {
        return " [f] Favorite │ [Esc] Close ".to_string();
    }

    match (app.screen, app.focus) {
        (Screen::Pantry, Focus::Ingredients) => format!(
            "{} [a] Add │ [d] Remove │ [C] Clear │ [s] Suggest │ [Tab] Recipes │ [?] Help │ [q] Quit ",
            back_hint
        ),
        (Screen::Pantry, Focus::Recipes) => format!(
            "{} [↑↓] Navigate │ [⏎] Details │ [f] Favorite │ [Tab] Pantry │ [q] Quit ",
            back_hint
        ),
        (Screen::Favorites, _) => format!(
            "{} [↑↓] Navigate │ [⏎] Details │ [d] Unfavorite │ [q] Quit ",
            back_hint
        ),
        (Screen::MealPlan, _) => format!(
            "{} [g] Generate │ [e] Preferences │ [t] Text/Structured │ [↑↓] Scroll │ [q] Quit ",
            back_hint
        ),
    }
}

fn breadcrumbs(app: &App) -> Line<'static> {
    let active = Style::default().fg(RosePine::BASE).bg(RosePine::IRIS);
    let separator = || Span::styled(" ❯ ", Style::default().fg(RosePine::MUTED));

    let mut spans = vec![Span::styled(
        format!(" {} ", app.screen.title()),
        active,
    )];

    if app.screen == Screen::Pantry {
        spans.push(separator());
        let panel = match app.focus {
            Focus::Ingredients => " Ingredients ",
            Focus::Recipes => " Recipes ",
        };
        spans.push(Span::styled(panel, Style::default().fg(RosePine::SUBTLE)));
    }

    if let Some(detail) = &app.detail {
        let title = match detail {
            DetailView::Catalog(id) => app
                .catalog
                .get(*id)
                .map(|recipe| recipe.title.clone())
                .unwrap_or_default(),
            DetailView::Generated(recipe) => recipe.title.clone(),
        };
        spans.push(separator());
        spans.push(Span::styled(
            format!(" {} ", title),
            Style::default().fg(RosePine::BASE).bg(RosePine::GOLD),
        ));
    }

    Line::from(spans)
}

pub fn render_input_popup(frame: &mut Frame, title: &str, placeholder: &str, app: &App) {
    let popup_area = centered_rect(frame.area(), 60, 5);
    Clear.render(popup_area, frame.buffer_mut());

    let block = Block::bordered()
        .title(title)
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(RosePine::IRIS).bg(RosePine::SURFACE));

    let content = if app.input_buffer.is_empty() {
        Line::from(vec![
            Span::styled("█", Style::default().fg(RosePine::ROSE)),
            Span::styled(placeholder.to_string(), Style::default().fg(RosePine::MUTED).italic()),
        ])
    } else {
        Line::from(vec![
            Span::styled(app.input_buffer.clone(), Style::default().fg(RosePine::TEXT)),
            Span::styled("█", Style::default().fg(RosePine::ROSE)),
        ])
    };

    Paragraph::new(vec![Line::default(), content])
        .block(block)
        .render(popup_area, frame.buffer_mut());
}

pub fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect(frame.area(), 64, 22);
    Clear.render(popup_area, frame.buffer_mut());

    let heading = |text: &str| {
        Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(RosePine::GOLD).bold(),
        ))
    };
    let entry = |keys: &str, action: &str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", keys), Style::default().fg(RosePine::FOAM)),
            Span::styled(action.to_string(), Style::default().fg(RosePine::TEXT)),
        ])
    };

    let lines = vec![
        heading("Anywhere"),
        entry("1 / 2 / 3", "Pantry, Favorites, Meal Plan"),
        entry("↑↓ / j k", "Move the cursor"),
        entry("← / Bksp", "Previous screen"),
        entry("?", "Toggle this help"),
        entry("q", "Quit (or close the open popup)"),
        Line::default(),
        heading("Pantry"),
        entry("a", "Add an ingredient"),
        entry("d", "Remove the selected ingredient"),
        entry("C", "Clear the pantry"),
        entry("Tab", "Switch between ingredients and recipes"),
        entry("⏎ / f", "Recipe details / toggle favorite"),
        entry("s", "Suggest a new recipe with AI"),
        Line::default(),
        heading("Meal Plan"),
        entry("g", "Generate a 7-day plan"),
        entry("e", "Edit dietary preferences"),
        entry("t", "Switch between structured and text plans"),
    ];

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_type(BorderType::Double)
                .style(Style::default().fg(RosePine::IRIS).bg(RosePine::SURFACE)),
        )
        .render(popup_area, frame.buffer_mut());
}
