//! Background AI requests
//!
//! Each request runs on its own thread with its own Tokio runtime and sends
//! exactly one [`AiMessage`] back over the app's channel. The UI thread picks
//! results up in `App::tick`, so the store is only ever touched from there.

use crate::app::{App, Screen};
use flume::Sender;
use pantrypal::AiError;
use pantrypal::ai::{
    DefaultAiClient, IngredientStandardizationInput, MealPlanInput, SuggestRecipeInput,
    WeeklyMealPlan,
};
use pantrypal::models::RecipeSuggestion;
use std::future::Future;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Runtime;
use tracing::{debug, error};

/// What the app asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTask {
    /// `raw` is what the user typed, normalized; added as-is on failure
    Standardize { raw: String },
    Suggest,
    MealPlan { text: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: u64,
    pub task: AiTask,
}

#[derive(Debug, Clone)]
pub enum AiPayload {
    Standardized(String),
    Suggestion(RecipeSuggestion),
    MealPlan(WeeklyMealPlan),
    MealPlanText(String),
}

#[derive(Debug, Clone)]
pub struct AiMessage {
    pub id: u64,
    pub result: Result<AiPayload, String>,
}

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn spinner_frame(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// Run `job` on a worker thread and post its result as request `id`
fn spawn_request<F, Fut>(sender: Sender<AiMessage>, id: u64, name: &str, job: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<AiPayload, AiError>>,
{
    let spawned = thread::Builder::new()
        .name(format!("ai-{}", name))
        .spawn({
            let sender = sender.clone();
            move || {
                let result = match Runtime::new() {
                    Ok(rt) => rt.block_on(job()).map_err(|e| e.to_string()),
                    Err(e) => Err(format!("Runtime error: {}", e)),
                };
                if let Err(e) = &result {
                    debug!(id, error = %e, "AI request failed");
                }
                // The app may already be gone
                let _ = sender.send(AiMessage { id, result });
            }
        });

    if let Err(e) = spawned {
        error!(error = %e, "Failed to spawn AI worker");
        let _ = sender.send(AiMessage {
            id,
            result: Err(format!("Could not start AI request: {}", e)),
        });
    }
}

pub fn request_standardization(
    app: &mut App,
    client: Arc<DefaultAiClient>,
    typed: &str,
    raw: String,
) {
    let input = IngredientStandardizationInput {
        ingredient_name: typed.to_string(),
    };
    let id = app.ai.begin(AiTask::Standardize { raw });
    app.set_success_message(format!("Standardizing \"{}\"...", typed));

    spawn_request(app.ai.sender.clone(), id, "standardize", move || async move {
        client
            .standardize_ingredient(&input)
            .await
            .map(|output| AiPayload::Standardized(output.standardized_name))
    });
}

pub fn request_suggestion(app: &mut App, client: Arc<DefaultAiClient>) {
    let input = SuggestRecipeInput {
        ingredients: app.snapshot.ingredients_csv(),
    };
    let id = app.ai.begin(AiTask::Suggest);
    app.ai.suggestion = None;
    app.set_success_message("Inventing a new recipe...".to_string());

    spawn_request(app.ai.sender.clone(), id, "suggest", move || async move {
        client.suggest_recipe(&input).await.map(AiPayload::Suggestion)
    });
}

pub fn request_meal_plan(app: &mut App, client: Arc<DefaultAiClient>) {
    let text = app.ai.use_text_plan;
    let input = MealPlanInput::new(app.snapshot.ingredients_csv(), Some(app.ai.preferences.as_str()));
    let id = app.ai.begin(AiTask::MealPlan { text });
    app.navigate_to(Screen::MealPlan);
    app.set_success_message("Planning your week...".to_string());

    spawn_request(app.ai.sender.clone(), id, "meal-plan", move || async move {
        if text {
            client
                .generate_meal_plan_text(&input)
                .await
                .map(|plan| AiPayload::MealPlanText(plan.meal_plan))
        } else {
            client.generate_meal_plan(&input).await.map(AiPayload::MealPlan)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn worker_posts_exactly_one_result() {
        let (sender, receiver) = flume::unbounded();
        spawn_request(sender, 7, "test", || async {
            Ok(AiPayload::Standardized("tomato".to_string()))
        });

        let message = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message.id, 7);
        assert!(matches!(message.result, Ok(AiPayload::Standardized(ref name)) if name == "tomato"));
        assert!(receiver.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn worker_reports_errors_as_text() {
        let (sender, receiver) = flume::unbounded();
        spawn_request(sender, 1, "test", || async {
            Err(AiError::Model("offline".to_string()))
        });

        let message = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message.result.unwrap_err(), "Model error: offline");
    }

    #[test]
    fn spinner_wraps() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER.len()));
    }
}
