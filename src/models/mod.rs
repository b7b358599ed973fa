pub mod catalog;
pub mod pantry;
pub mod recipe;

pub use catalog::Catalog;
pub use pantry::{PantryState, normalize_ingredient};
pub use recipe::{GeneratedRecipe, Ingredient, Recipe, RecipeId, RecipeSuggestion};
