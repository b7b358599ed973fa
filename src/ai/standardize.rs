use crate::AiError;
use crate::ai::{AiClient, ImageModel, TextModel, Validate, require_text};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientStandardizationInput {
    pub ingredient_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientStandardizationOutput {
    pub standardized_name: String,
}

impl Validate for IngredientStandardizationInput {
    fn validate(&self) -> Result<(), AiError> {
        require_text("ingredientName", &self.ingredient_name)
    }
}

impl Validate for IngredientStandardizationOutput {
    fn validate(&self) -> Result<(), AiError> {
        require_text("standardizedName", &self.standardized_name)
    }
}

fn render_prompt(input: &IngredientStandardizationInput) -> String {
    format!(
        "You are an expert in food and ingredients. You will standardize the ingredient name \
         provided by the user, for example turning \"tomatoes\" or \"Roma tomato\" into \"tomato\".\n\n\
         Ingredient Name: {}\n\n\
         Respond with only a JSON object of the form {{\"standardizedName\": \"...\"}}.",
        input.ingredient_name.trim()
    )
}

impl<T: TextModel, I: ImageModel> AiClient<T, I> {
    pub async fn standardize_ingredient(
        &self,
        input: &IngredientStandardizationInput,
    ) -> Result<IngredientStandardizationOutput, AiError> {
        input.validate()?;
        self.run_prompt("ingredient_standardization", &render_prompt(input))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FakeImage, ScriptedText};

    fn input(name: &str) -> IngredientStandardizationInput {
        IngredientStandardizationInput {
            ingredient_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn returns_standardized_name() {
        let client = AiClient::new(
            ScriptedText::replying(&[r#"{"standardizedName": "tomato"}"#]),
            FakeImage::Empty,
            vec![],
        );

        let output = client.standardize_ingredient(&input("Tomatoes")).await.unwrap();
        assert_eq!(output.standardized_name, "tomato");
        assert!(client.text.prompts.lock().unwrap()[0].contains("Tomatoes"));
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_model() {
        let client = AiClient::new(ScriptedText::default(), FakeImage::Empty, vec![]);

        let err = client.standardize_ingredient(&input("  ")).await.unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
        assert!(client.text.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_output_fails_validation() {
        let client = AiClient::new(
            ScriptedText::replying(&[r#"{"standardizedName": ""}"#]),
            FakeImage::Empty,
            vec![],
        );

        let err = client.standardize_ingredient(&input("kale")).await.unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let client = AiClient::new(ScriptedText::failing("offline"), FakeImage::Empty, vec![]);

        let err = client.standardize_ingredient(&input("kale")).await.unwrap_err();
        assert!(matches!(err, AiError::Model(_)));
    }
}
