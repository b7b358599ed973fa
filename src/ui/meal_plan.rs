use crate::app::App;
use crate::handlers::ai::{AiTask, spinner_frame};
use crate::ui::colors::RosePine;
use pantrypal::ai::WeeklyMealPlan;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(3)]).split(area);

    render_settings(frame, chunks[0], app);

    let block = Block::bordered()
        .title(" 󰃭 Weekly Meal Plan ")
        .title_alignment(Alignment::Center)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(RosePine::HIGHLIGHT_HIGH));

    let planning = matches!(
        app.ai.pending.as_ref().map(|pending| &pending.task),
        Some(AiTask::MealPlan { .. })
    );

    let lines = if planning {
        vec![
            Line::default(),
            Line::from(Span::styled(
                format!("{} Planning your week...", spinner_frame(app.ai.loading_frame)),
                Style::default().fg(RosePine::IRIS),
            )),
        ]
    } else if let Some(plan) = &app.ai.meal_plan {
        structured_lines(plan)
    } else if let Some(text) = &app.ai.meal_plan_text {
        text.lines()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(RosePine::TEXT))))
            .collect()
    } else {
        vec![
            Line::default(),
            Line::from(Span::styled(
                "No plan yet. Press 'g' to plan 7 days of meals from your pantry.",
                Style::default().fg(RosePine::MUTED),
            )),
        ]
    };

    let centered = planning || (app.ai.meal_plan.is_none() && app.ai.meal_plan_text.is_none());
    let alignment = if centered { Alignment::Center } else { Alignment::Left };

    Paragraph::new(lines)
        .alignment(alignment)
        .wrap(Wrap { trim: false })
        .scroll((app.meal_plan_scroll, 0))
        .block(block)
        .render(chunks[1], frame.buffer_mut());
}

fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let preferences = if app.ai.preferences.trim().is_empty() {
        "None"
    } else {
        app.ai.preferences.as_str()
    };
    let format = if app.ai.use_text_plan {
        "free text"
    } else {
        "structured"
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Ingredients: ", Style::default().fg(RosePine::SUBTLE)),
            Span::styled(app.snapshot.ingredients_csv(), Style::default().fg(RosePine::TEXT)),
        ]),
        Line::from(vec![
            Span::styled("Dietary preferences: ", Style::default().fg(RosePine::SUBTLE)),
            Span::styled(preferences.to_string(), Style::default().fg(RosePine::GOLD)),
            Span::styled("   Format: ", Style::default().fg(RosePine::SUBTLE)),
            Span::styled(format, Style::default().fg(RosePine::FOAM)),
        ]),
    ];

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(RosePine::HIGHLIGHT_HIGH)),
        )
        .render(area, frame.buffer_mut());
}

fn structured_lines(plan: &WeeklyMealPlan) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for day in &plan.meal_plan {
        lines.push(Line::from(Span::styled(
            day.day.clone(),
            Style::default().fg(RosePine::IRIS).bold(),
        )));
        for (slot, meal) in day.meals() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", slot), Style::default().fg(RosePine::FOAM)),
                Span::styled(meal.name.clone(), Style::default().fg(RosePine::TEXT).bold()),
            ]));
            lines.push(Line::from(Span::styled(
                format!("              {}", meal.recipe),
                Style::default().fg(RosePine::SUBTLE),
            )));
        }
        lines.push(Line::default());
    }
    lines
}
