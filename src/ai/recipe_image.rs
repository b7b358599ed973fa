use crate::AiError;
use crate::ai::{AiClient, ImageModel, TextModel, Validate, require_text};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImageInput {
    pub recipe_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImageOutput {
    /// Usually a `data:` URI
    pub image_url: String,
}

impl Validate for RecipeImageInput {
    fn validate(&self) -> Result<(), AiError> {
        require_text("recipeTitle", &self.recipe_title)
    }
}

impl<T: TextModel, I: ImageModel> AiClient<T, I> {
    pub async fn generate_recipe_image(
        &self,
        input: &RecipeImageInput,
    ) -> Result<RecipeImageOutput, AiError> {
        input.validate()?;
        debug!(title = %input.recipe_title, "Calling image model");

        match self.image.generate_image(&input.recipe_title).await? {
            Some(image_url) => Ok(RecipeImageOutput { image_url }),
            None => Err(AiError::MissingImage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FakeImage, ScriptedText};

    fn input() -> RecipeImageInput {
        RecipeImageInput {
            recipe_title: "Lentil soup".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_backend_uri() {
        let client = AiClient::new(
            ScriptedText::default(),
            FakeImage::Url("data:image/png;base64,AAAA"),
            vec![],
        );
        let output = client.generate_recipe_image(&input()).await.unwrap();
        assert_eq!(output.image_url, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn missing_uri_is_an_explicit_error() {
        let client = AiClient::new(ScriptedText::default(), FakeImage::Empty, vec![]);
        let err = client.generate_recipe_image(&input()).await.unwrap_err();
        assert!(matches!(err, AiError::MissingImage));
    }
}
