use crate::models::{Recipe, RecipeId};
use crate::{Error, Result};
use std::collections::HashSet;

const BUILTIN_RECIPES: &str = include_str!("../../data/recipes.json");

/// The static recipe list shipped with the application
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Parse the catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RECIPES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        Self::from_recipes(recipes)
    }

    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self> {
        let mut ids = HashSet::new();
        for recipe in &recipes {
            if !ids.insert(recipe.id) {
                return Err(Error::InvalidInput(format!(
                    "Duplicate recipe id {} in catalog",
                    recipe.id
                )));
            }
        }

        Ok(Self { recipes })
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn titles(&self) -> Vec<String> {
        self.recipes.iter().map(|recipe| recipe.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
