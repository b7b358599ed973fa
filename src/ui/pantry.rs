use crate::app::{App, Focus};
use crate::ui::colors::RosePine;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Widget, Wrap,
    },
};

/// Ingredients on the left, matching catalog recipes on the right
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).split(area);

    render_ingredients(frame, chunks[0], app);
    render_matches(frame, chunks[1], app);
}

fn render_ingredients(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Ingredients;
    let block = Block::bordered()
        .title(format!(" 󰏗 My Pantry ({}) ", app.snapshot.ingredients.len()))
        .border_type(BorderType::Rounded)
        .style(RosePine::panel(focused));

    if !app.binding.is_ready() {
        Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(RosePine::MUTED))
            .block(block)
            .render(area, frame.buffer_mut());
        return;
    }

    if app.snapshot.ingredients.is_empty() {
        let hint = vec![
            Line::default(),
            Line::from(Span::styled(
                "Your pantry is empty.",
                Style::default().fg(RosePine::SUBTLE),
            )),
            Line::from(Span::styled(
                "Press 'a' to add an ingredient.",
                Style::default().fg(RosePine::MUTED),
            )),
        ];
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, frame.buffer_mut());
        return;
    }

    let items: Vec<ListItem> = app
        .snapshot
        .ingredients
        .iter()
        .map(|name| {
            ListItem::new(Line::from(vec![
                Span::styled("  ", Style::default().fg(RosePine::PINE)),
                Span::styled(name.clone(), Style::default().fg(RosePine::TEXT)),
            ]))
        })
        .collect();

    let highlight = if focused {
        RosePine::selected()
    } else {
        Style::default().fg(RosePine::ROSE)
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("❯");

    let mut state = ListState::default().with_selected(Some(app.selected_ingredient));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_matches(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Recipes;
    let matches = app.matches();

    let block = Block::bordered()
        .title(format!(" 󰩰 Recipes You Can Make ({}) ", matches.len()))
        .border_type(BorderType::Rounded)
        .style(RosePine::panel(focused));

    let (table_area, suggestion_area) = if app.ai.suggestion.is_some() {
        let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(4)]).split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    if matches.is_empty() {
        let message = if app.snapshot.ingredients.is_empty() {
            "Add ingredients to see what you can cook."
        } else {
            "No catalog recipe uses these ingredients. Press 's' for an AI suggestion."
        };
        Paragraph::new(vec![Line::default(), Line::from(message)])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(RosePine::MUTED))
            .block(block)
            .render(table_area, frame.buffer_mut());
    } else {
        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("Recipe").style(Style::default().fg(RosePine::IRIS).bold()),
            Cell::from("Match").style(Style::default().fg(RosePine::IRIS).bold()),
            Cell::from("Time").style(Style::default().fg(RosePine::IRIS).bold()),
            Cell::from("Uses").style(Style::default().fg(RosePine::IRIS).bold()),
        ]);

        let rows: Vec<Row> = matches
            .iter()
            .map(|found| {
                let star = if app.snapshot.is_favorite(found.recipe.id) {
                    "★"
                } else {
                    " "
                };
                Row::new(vec![
                    Cell::from(star).style(Style::default().fg(RosePine::GOLD)),
                    Cell::from(found.recipe.title.clone()).style(Style::default().fg(RosePine::TEXT)),
                    Cell::from(format!(
                        "{}/{}",
                        found.match_count,
                        found.recipe.ingredients.len()
                    ))
                    .style(Style::default().fg(RosePine::FOAM)),
                    Cell::from(found.recipe.prep_time.clone())
                        .style(Style::default().fg(RosePine::SUBTLE)),
                    Cell::from(found.matched_ingredients.join(", "))
                        .style(Style::default().fg(RosePine::MUTED)),
                ])
            })
            .collect();

        let highlight = if focused {
            RosePine::selected()
        } else {
            Style::default()
        };
        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Percentage(40),
                Constraint::Length(6),
                Constraint::Length(10),
                Constraint::Fill(1),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(highlight)
        .column_spacing(1);

        let mut state = TableState::default().with_selected(Some(app.selected_recipe));
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    if let (Some(area), Some(suggestion)) = (suggestion_area, &app.ai.suggestion) {
        let saved = if app.snapshot.is_generated_favorite(suggestion.id) {
            " ★ saved"
        } else {
            ""
        };
        let lines = vec![
            Line::from(vec![
                Span::styled(suggestion.title.clone(), Style::default().fg(RosePine::GOLD).bold()),
                Span::styled(saved, Style::default().fg(RosePine::GOLD)),
            ]),
            Line::from(Span::styled(
                "Press ⏎ on the pantry panel to open it",
                Style::default().fg(RosePine::MUTED),
            )),
        ];
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" ✨ AI Suggestion ")
                    .border_type(BorderType::Rounded)
                    .style(Style::default().fg(RosePine::GOLD)),
            )
            .render(area, frame.buffer_mut());
    }
}
