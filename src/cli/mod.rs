//! CLI Module for PantryPal
//! Lets the pantry be managed from the shell without launching the TUI.
//! Every command opens the same data folder the TUI uses, so a running TUI
//! picks the change up on its next tick.

pub mod commands;

use clap::{Parser, Subcommand};
use pantrypal::config::Config;
use pantrypal::models::{Catalog, RecipeId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pantrypal",
    version,
    about = "Track your pantry, find recipes and plan meals",
    after_help = "Run with no command to launch the full TUI (Terminal User Interface) mode"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "PANTRYPAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Folder holding the persisted pantry
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an ingredient to the pantry
    Add {
        name: String,
        /// Clean the name up with the AI model first
        #[arg(long)]
        standardize: bool,
    },
    /// Remove an ingredient from the pantry
    #[command(alias = "rm")]
    Remove { name: String },
    /// Remove every ingredient
    Clear,
    /// List pantry ingredients
    #[command(alias = "ls")]
    Pantry,
    /// List catalog recipes that use pantry ingredients
    Recipes,
    /// Show one catalog recipe
    #[command(alias = "view")]
    Show { id: RecipeId },
    /// Search catalog titles, descriptions and ingredients
    #[command(alias = "find")]
    Search { query: String },
    /// Toggle a catalog recipe as favorite
    #[command(alias = "fav")]
    Favorite { id: RecipeId },
    /// List favorite recipes
    Favorites,
    /// Ask the AI model for a new recipe from the pantry
    Suggest {
        /// Keep the suggestion as a favorite
        #[arg(long)]
        save: bool,
    },
    /// Ask the AI model for a 7-day meal plan
    MealPlan {
        /// Dietary preferences, e.g. "vegetarian, no nuts"
        #[arg(long, short)]
        preferences: Option<String>,
        /// Plain-text plan instead of the structured one
        #[arg(long)]
        text: bool,
    },
}

/// Everything a command needs, resolved once in `main`
pub struct CliContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub catalog: Catalog,
}

pub fn execute_cli(command: Command, ctx: &CliContext) -> anyhow::Result<()> {
    match command {
        Command::Add { name, standardize } => commands::add_ingredient(ctx, &name, standardize),
        Command::Remove { name } => commands::remove_ingredient(ctx, &name),
        Command::Clear => commands::clear_pantry(ctx),
        Command::Pantry => commands::list_pantry(ctx),
        Command::Recipes => commands::list_matching_recipes(ctx),
        Command::Show { id } => commands::show_recipe(ctx, id),
        Command::Search { query } => commands::search_recipes(ctx, &query),
        Command::Favorite { id } => commands::toggle_favorite(ctx, id),
        Command::Favorites => commands::list_favorites(ctx),
        Command::Suggest { save } => commands::suggest_recipe(ctx, save),
        Command::MealPlan { preferences, text } => {
            commands::meal_plan(ctx, preferences.as_deref(), text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_tui() {
        let cli = Cli::try_parse_from(["pantrypal"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_add_with_standardize() {
        let cli = Cli::try_parse_from(["pantrypal", "add", "Tomatoes", "--standardize"]).unwrap();
        match cli.command {
            Some(Command::Add { name, standardize }) => {
                assert_eq!(name, "Tomatoes");
                assert!(standardize);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_meal_plan_options() {
        let cli = Cli::try_parse_from([
            "pantrypal",
            "meal-plan",
            "--preferences",
            "vegan",
            "--text",
            "--data-dir",
            "/tmp/pantry",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/pantry")));
        match cli.command {
            Some(Command::MealPlan { preferences, text }) => {
                assert_eq!(preferences.as_deref(), Some("vegan"));
                assert!(text);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn recipe_ids_must_be_numeric() {
        assert!(Cli::try_parse_from(["pantrypal", "show", "pasta"]).is_err());
    }
}
