use crate::app::{App, FavoriteItem};
use crate::ui::colors::RosePine;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Style, Stylize},
    widgets::{Block, BorderType, Cell, Paragraph, Row, Table, TableState, Widget},
};

/// Render the favorites screen as a table
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let favorites = app.favorite_items();

    let block = Block::bordered()
        .title(format!(" ★ Favorites ({}) ", favorites.len()))
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(RosePine::LOVE));

    if favorites.is_empty() {
        Paragraph::new(
            "No favorites yet. Press 'f' on a recipe, or on an AI suggestion, to keep it here.",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(RosePine::MUTED))
        .block(block)
        .render(area, frame.buffer_mut());
        return;
    }

    let header = Row::new(vec![
        Cell::from("Title").style(Style::default().fg(RosePine::IRIS).bold()),
        Cell::from("Source").style(Style::default().fg(RosePine::IRIS).bold()),
        Cell::from("Time").style(Style::default().fg(RosePine::IRIS).bold()),
        Cell::from("Description").style(Style::default().fg(RosePine::IRIS).bold()),
    ]);

    let rows: Vec<Row> = favorites
        .iter()
        .map(|item| {
            let (source, prep_time, description) = match item {
                FavoriteItem::Catalog(recipe) => ("Catalog", &recipe.prep_time, &recipe.description),
                FavoriteItem::Generated(recipe) => ("✨ AI", &recipe.prep_time, &recipe.description),
            };

            Row::new(vec![
                Cell::from(item.title().to_string()).style(Style::default().fg(RosePine::TEXT)),
                Cell::from(source).style(Style::default().fg(RosePine::FOAM)),
                Cell::from(prep_time.clone()).style(Style::default().fg(RosePine::GOLD)),
                Cell::from(truncate(description, 60)).style(Style::default().fg(RosePine::SUBTLE)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(RosePine::selected())
    .column_spacing(1);

    let mut state = TableState::default().with_selected(Some(app.selected_favorite));
    frame.render_stateful_widget(table, area, &mut state);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}
