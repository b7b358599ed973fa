use crate::app::{App, DetailView};
use crate::ui::colors::RosePine;
use crate::ui::components::centered_rect;
use pantrypal::models::Ingredient;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap},
};

/// Fields shared by catalog and generated recipes
struct RecipeView<'a> {
    title: &'a str,
    description: &'a str,
    prep_time: &'a str,
    ingredients: &'a [Ingredient],
    instructions: &'a [String],
    image: Option<&'a str>,
    generated: bool,
}

/// Floating recipe card over the current screen
pub fn render_popup(frame: &mut Frame, app: &App) {
    let Some(detail) = &app.detail else {
        return;
    };

    let view = match detail {
        DetailView::Catalog(id) => match app.catalog.get(*id) {
            Some(recipe) => RecipeView {
                title: &recipe.title,
                description: &recipe.description,
                prep_time: &recipe.prep_time,
                ingredients: &recipe.ingredients,
                instructions: &recipe.instructions,
                image: Some(recipe.image.as_str()).filter(|image| !image.is_empty()),
                generated: false,
            },
            None => return,
        },
        DetailView::Generated(recipe) => RecipeView {
            title: &recipe.title,
            description: &recipe.description,
            prep_time: &recipe.prep_time,
            ingredients: &recipe.ingredients,
            instructions: &recipe.instructions,
            image: recipe.image.as_deref(),
            generated: true,
        },
    };

    let area = frame.area();
    let popup_area = centered_rect(area, area.width.saturating_sub(10).min(90), area.height.saturating_sub(4));
    Clear.render(popup_area, frame.buffer_mut());

    let favorite = app.is_favorite(detail);
    let mut title = format!(" {} ", view.title);
    if view.generated {
        title = format!(" ✨{}", title);
    }
    if favorite {
        title.push_str("★ ");
    }

    let block = Block::bordered()
        .title(title)
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(RosePine::GOLD).bg(RosePine::SURFACE));

    Paragraph::new(recipe_lines(&view, app))
        .wrap(Wrap { trim: false })
        .block(block)
        .render(popup_area, frame.buffer_mut());
}

fn recipe_lines(view: &RecipeView<'_>, app: &App) -> Vec<Line<'static>> {
    let section = |text: &str| {
        Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(RosePine::IRIS).bold(),
        ))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            view.description.to_string(),
            Style::default().fg(RosePine::TEXT).italic(),
        )),
        Line::from(vec![
            Span::styled("Prep time: ", Style::default().fg(RosePine::SUBTLE)),
            Span::styled(view.prep_time.to_string(), Style::default().fg(RosePine::GOLD)),
        ]),
    ];

    match view.image {
        Some(image) if image.starts_with("data:") => lines.push(Line::from(Span::styled(
            "Image: generated (embedded)",
            Style::default().fg(RosePine::MUTED),
        ))),
        Some(image) => lines.push(Line::from(Span::styled(
            format!("Image: {}", image),
            Style::default().fg(RosePine::MUTED),
        ))),
        None => {}
    }

    lines.push(Line::default());
    lines.push(section("Ingredients"));
    for ingredient in view.ingredients {
        let (marker, color) = if app.snapshot.has_ingredient(&ingredient.name) {
            ("✓", RosePine::FOAM)
        } else {
            ("·", RosePine::MUTED)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", marker), Style::default().fg(color)),
            Span::styled(format!("{:<12}", ingredient.quantity), Style::default().fg(RosePine::SUBTLE)),
            Span::styled(ingredient.name.clone(), Style::default().fg(RosePine::TEXT)),
        ]));
    }

    lines.push(Line::default());
    lines.push(section("Instructions"));
    for (idx, step) in view.instructions.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}. ", idx + 1), Style::default().fg(RosePine::GOLD)),
            Span::styled(step.clone(), Style::default().fg(RosePine::TEXT)),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "[f] Toggle favorite │ [Esc] Close",
        Style::default().fg(RosePine::MUTED),
    )));
    lines
}
