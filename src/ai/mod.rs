//! AI flow clients
//!
//! Every flow follows the same shape: validate the input, render a prompt,
//! call the model, parse the reply as JSON and validate the output. The
//! model backends sit behind two small traits so the flows can be driven by
//! Ollama and an HTTP image endpoint in production and by fakes in tests.
//!
//! # Flows
//!
//! - **`standardize`**: ingredient name normalization
//! - **`suggest`**: new recipe from pantry ingredients, with an optional image
//! - **`meal_plan`**: weekly plan, structured (v2) or free text (v1)
//! - **`recipe_image`**: text-to-image for a recipe title

pub mod image;
pub mod meal_plan;
pub mod ollama;
pub mod recipe_image;
pub mod standardize;
pub mod suggest;

pub use image::HttpImageModel;
pub use meal_plan::{DailyPlan, Meal, MealPlanInput, MealPlanText, WeeklyMealPlan};
pub use ollama::OllamaTextModel;
pub use recipe_image::{RecipeImageInput, RecipeImageOutput};
pub use standardize::{IngredientStandardizationInput, IngredientStandardizationOutput};
pub use suggest::SuggestRecipeInput;

use crate::AiError;
use crate::config::Config;
use crate::models::Catalog;
use serde::de::DeserializeOwned;
use tracing::debug;

/// A text-generation backend
#[allow(async_fn_in_trait)]
pub trait TextModel {
    /// Send one prompt and return the raw completion
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// A text-to-image backend
#[allow(async_fn_in_trait)]
pub trait ImageModel {
    /// A data URI or URL for the generated image, `None` if the backend
    /// answered without one
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, AiError>;
}

/// Schema checks applied to flow inputs and outputs
pub trait Validate {
    fn validate(&self) -> Result<(), AiError>;
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AiError> {
    if value.trim().is_empty() {
        return Err(AiError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Pull the JSON object out of a model reply. Models like to wrap JSON in
/// code fences or chat around it.
pub(crate) fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let start = raw.find('{');
    let end = raw.rfind('}');

    let body = match (start, end) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => {
            return Err(AiError::InvalidResponse(
                "no JSON object in model reply".to_string(),
            ));
        }
    };

    serde_json::from_str(body).map_err(|e| AiError::InvalidResponse(e.to_string()))
}

/// Entry point for every flow
#[derive(Debug, Clone)]
pub struct AiClient<T, I> {
    text: T,
    image: I,
    /// Catalog titles the suggestion flow must not reinvent
    known_titles: Vec<String>,
}

pub type DefaultAiClient = AiClient<OllamaTextModel, HttpImageModel>;

impl DefaultAiClient {
    pub fn from_config(config: &Config, catalog: &Catalog) -> Self {
        let text = OllamaTextModel::from_config(&config.ollama);
        let image = HttpImageModel::from_config(&config.image);
        debug!(
            model = text.model(),
            images = image.is_enabled(),
            "AI client configured"
        );
        AiClient::new(text, image, catalog.titles())
    }
}

impl<T: TextModel, I: ImageModel> AiClient<T, I> {
    pub fn new(text: T, image: I, known_titles: Vec<String>) -> Self {
        Self {
            text,
            image,
            known_titles,
        }
    }

    async fn run_prompt<O: DeserializeOwned + Validate>(
        &self,
        flow: &'static str,
        prompt: &str,
    ) -> Result<O, AiError> {
        debug!(flow, prompt_len = prompt.len(), "Calling text model");
        let raw = self.text.complete(prompt).await?;
        let output: O = parse_structured(&raw)?;
        output.validate()?;
        debug!(flow, "Model output validated");
        Ok(output)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records the prompts it was given
    #[derive(Default)]
    pub struct ScriptedText {
        pub replies: Mutex<VecDeque<Result<String, AiError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedText {
        pub fn replying(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([Err(AiError::Model(message.to_string()))])),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextModel for ScriptedText {
        async fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AiError::Model("no scripted reply".to_string())))
        }
    }

    pub enum FakeImage {
        Url(&'static str),
        Empty,
        Broken,
    }

    impl ImageModel for FakeImage {
        async fn generate_image(&self, _prompt: &str) -> Result<Option<String>, AiError> {
            match self {
                FakeImage::Url(url) => Ok(Some(url.to_string())),
                FakeImage::Empty => Ok(None),
                FakeImage::Broken => Err(AiError::Unavailable("image backend down".to_string())),
            }
        }
    }
}
