use crate::models::{GeneratedRecipe, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Everything the user has told us about their kitchen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryState {
    /// Lowercase, insertion-ordered, no duplicates
    pub ingredients: Vec<String>,
    pub favorite_recipe_ids: BTreeSet<RecipeId>,
    /// Insertion-ordered, unique by id
    pub favorite_generated_recipes: Vec<GeneratedRecipe>,
}

/// Trim and lowercase an ingredient name. `None` when nothing is left.
pub fn normalize_ingredient(name: &str) -> Option<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

impl PantryState {
    /// Build a state from raw persisted parts, restoring the invariants that
    /// another writer may have broken.
    pub fn from_parts(
        ingredients: Vec<String>,
        favorite_recipe_ids: BTreeSet<RecipeId>,
        favorite_generated_recipes: Vec<GeneratedRecipe>,
    ) -> Self {
        let mut seen = HashSet::new();
        let ingredients = ingredients
            .iter()
            .filter_map(|name| normalize_ingredient(name))
            .filter(|name| seen.insert(name.clone()))
            .collect();

        let mut seen_ids = HashSet::new();
        let favorite_generated_recipes = favorite_generated_recipes
            .into_iter()
            .filter(|recipe| seen_ids.insert(recipe.id))
            .collect();

        Self {
            ingredients,
            favorite_recipe_ids,
            favorite_generated_recipes,
        }
    }

    pub fn has_ingredient(&self, name: &str) -> bool {
        normalize_ingredient(name)
            .map(|name| self.ingredients.contains(&name))
            .unwrap_or(false)
    }

    pub fn is_favorite(&self, recipe_id: RecipeId) -> bool {
        self.favorite_recipe_ids.contains(&recipe_id)
    }

    pub fn is_generated_favorite(&self, recipe_id: RecipeId) -> bool {
        self.favorite_generated_recipes
            .iter()
            .any(|recipe| recipe.id == recipe_id)
    }

    pub fn favorite_count(&self) -> usize {
        self.favorite_recipe_ids.len() + self.favorite_generated_recipes.len()
    }

    /// The ingredient list in the comma-separated form the AI flows take
    pub fn ingredients_csv(&self) -> String {
        self.ingredients.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_ingredient("  Tomato "), Some("tomato".to_string()));
        assert_eq!(normalize_ingredient("   "), None);
    }

    #[test]
    fn from_parts_restores_invariants() {
        let recipe = GeneratedRecipe {
            id: 9,
            title: "First".to_string(),
            ..Default::default()
        };
        let duplicate = GeneratedRecipe {
            id: 9,
            title: "Second".to_string(),
            ..Default::default()
        };

        let state = PantryState::from_parts(
            vec!["Egg".into(), "egg".into(), " ".into(), "Milk".into()],
            BTreeSet::from([3]),
            vec![recipe, duplicate],
        );

        assert_eq!(state.ingredients, vec!["egg", "milk"]);
        assert_eq!(state.favorite_generated_recipes.len(), 1);
        assert_eq!(state.favorite_generated_recipes[0].title, "First");
    }

    #[test]
    fn membership_checks_are_case_insensitive() {
        let state = PantryState::from_parts(vec!["garlic".into()], BTreeSet::new(), vec![]);
        assert!(state.has_ingredient("GARLIC"));
        assert!(!state.has_ingredient("onion"));
        assert_eq!(state.ingredients_csv(), "garlic");
    }
}
