use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier shared by catalog recipes and generated recipes
pub type RecipeId = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// A recipe from the built-in catalog. Read-only after start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub image: String,
    #[serde(default)]
    pub image_hint: String,
}

/// Output of the recipe suggestion flow, before it gets an identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeSuggestion {
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl RecipeSuggestion {
    /// Give the suggestion a time-based id so it can be favorited
    pub fn into_generated(self) -> GeneratedRecipe {
        self.into_generated_with_id(Utc::now().timestamp_millis().max(0) as RecipeId)
    }

    pub fn into_generated_with_id(self, id: RecipeId) -> GeneratedRecipe {
        GeneratedRecipe {
            id,
            title: self.title,
            description: self.description,
            prep_time: self.prep_time,
            ingredients: self.ingredients,
            instructions: self.instructions,
            image: self.image,
        }
    }
}

/// An AI-produced recipe. Lives only in memory until it is favorited.
///
/// Every field defaults when absent: persisted blobs carry no schema version,
/// so older records still parse with empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedRecipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_recipe_uses_camel_case_keys() {
        let recipe = RecipeSuggestion {
            title: "Test Dish".to_string(),
            prep_time: "10 mins".to_string(),
            ..Default::default()
        }
        .into_generated_with_id(1001);

        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["id"], 1001);
        assert_eq!(json["prepTime"], "10 mins");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn generated_recipe_tolerates_missing_fields() {
        let recipe: GeneratedRecipe = serde_json::from_str(r#"{"id": 7, "title": "Old"}"#).unwrap();
        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.title, "Old");
        assert!(recipe.instructions.is_empty());
        assert!(recipe.image.is_none());
    }

    #[test]
    fn suggestions_get_time_based_ids() {
        let before = Utc::now().timestamp_millis() as RecipeId;
        let recipe = RecipeSuggestion::default().into_generated();
        assert!(recipe.id >= before);
    }
}
