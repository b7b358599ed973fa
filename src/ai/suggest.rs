use crate::AiError;
use crate::ai::{AiClient, ImageModel, RecipeImageInput, TextModel, Validate, require_text};
use crate::models::RecipeSuggestion;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRecipeInput {
    /// Comma-separated ingredient list
    pub ingredients: String,
}

impl Validate for SuggestRecipeInput {
    fn validate(&self) -> Result<(), AiError> {
        require_text("ingredients", &self.ingredients)
    }
}

impl Validate for RecipeSuggestion {
    fn validate(&self) -> Result<(), AiError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        require_text("prepTime", &self.prep_time)?;

        if self.ingredients.is_empty() {
            return Err(AiError::Validation("ingredients must not be empty".to_string()));
        }
        for ingredient in &self.ingredients {
            require_text("ingredients[].name", &ingredient.name)?;
        }
        if self.instructions.is_empty() {
            return Err(AiError::Validation("instructions must not be empty".to_string()));
        }
        Ok(())
    }
}

fn render_prompt(input: &SuggestRecipeInput, known_titles: &[String]) -> String {
    format!(
        "You are an expert chef who excels at creating new and exciting recipes from a limited set \
         of ingredients. A user will provide you with ingredients they have, and you must invent a \
         new, delicious recipe.\n\n\
         - The recipe should primarily use the ingredients provided by the user.\n\
         - You can assume the user has common pantry staples like oil, salt, pepper, and basic \
         spices. You can include these in the ingredient list.\n\
         - To ensure the suggestion is unique, the recipe should NOT be one of the following \
         standard dishes: {}.\n\
         - Make the recipe sound appealing and the instructions clear and easy to follow.\n\n\
         User's Available Ingredients: {}\n\n\
         Respond with only a JSON object of the form {{\"title\": \"...\", \"description\": \"...\", \
         \"prepTime\": \"...\", \"ingredients\": [{{\"name\": \"...\", \"quantity\": \"...\"}}], \
         \"instructions\": [\"...\"]}}.",
        known_titles.join(", "),
        input.ingredients.trim()
    )
}

impl<T: TextModel, I: ImageModel> AiClient<T, I> {
    /// Invent a recipe, then try to illustrate it. A failed illustration
    /// still returns the recipe, just without `image`.
    pub async fn suggest_recipe(
        &self,
        input: &SuggestRecipeInput,
    ) -> Result<RecipeSuggestion, AiError> {
        input.validate()?;

        let mut suggestion: RecipeSuggestion = self
            .run_prompt("suggest_recipe", &render_prompt(input, &self.known_titles))
            .await?;

        let image_input = RecipeImageInput {
            recipe_title: format!(
                "A photorealistic image of {}, presented beautifully on a plate.",
                suggestion.title
            ),
        };
        suggestion.image = match self.generate_recipe_image(&image_input).await {
            Ok(output) => Some(output.image_url),
            Err(e) => {
                warn!(title = %suggestion.title, error = %e, "Image generation failed, returning recipe without image");
                None
            }
        };

        Ok(suggestion)
    }
}
