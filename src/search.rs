//! Recipe matching and catalog search
//!
//! Pure functions over the catalog and a pantry snapshot.

use crate::models::{Catalog, PantryState, Recipe};

/// A catalog recipe that uses at least one pantry ingredient
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeMatch<'a> {
    pub recipe: &'a Recipe,
    pub match_count: usize,
    /// Ingredient names as written in the recipe
    pub matched_ingredients: Vec<String>,
}

impl RecipeMatch<'_> {
    pub fn missing_count(&self) -> usize {
        self.recipe.ingredients.len().saturating_sub(self.match_count)
    }
}

/// Catalog recipes sharing ingredients with the pantry, most matches first.
/// Ties keep catalog order.
pub fn match_recipes<'a>(catalog: &'a Catalog, pantry: &[String]) -> Vec<RecipeMatch<'a>> {
    if pantry.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<RecipeMatch<'a>> = catalog
        .recipes()
        .iter()
        .map(|recipe| {
            let matched_ingredients: Vec<String> = recipe
                .ingredients
                .iter()
                .filter(|ingredient| pantry.contains(&ingredient.name.to_lowercase()))
                .map(|ingredient| ingredient.name.clone())
                .collect();

            RecipeMatch {
                recipe,
                match_count: matched_ingredients.len(),
                matched_ingredients,
            }
        })
        .filter(|candidate| candidate.match_count > 0)
        .collect();

    matches.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    matches
}

/// Favorited catalog recipes in catalog order. Ids missing from the
/// catalog are skipped.
pub fn favorite_recipes<'a>(catalog: &'a Catalog, state: &PantryState) -> Vec<&'a Recipe> {
    catalog
        .recipes()
        .iter()
        .filter(|recipe| state.is_favorite(recipe.id))
        .collect()
}

/// Case-insensitive search over titles, descriptions and ingredient names
pub fn search_catalog<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Recipe> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    catalog
        .recipes()
        .iter()
        .filter(|recipe| {
            recipe.title.to_lowercase().contains(&query)
                || recipe.description.to_lowercase().contains(&query)
                || recipe
                    .ingredients
                    .iter()
                    .any(|ingredient| ingredient.name.to_lowercase().contains(&query))
        })
        .collect()
}
