use crate::cli::CliContext;
use anyhow::{Context, Result, bail};
use colored::{ColoredString, Colorize};
use pantrypal::ai::{
    DefaultAiClient, IngredientStandardizationInput, MealPlanInput, SuggestRecipeInput,
};
use pantrypal::models::{GeneratedRecipe, Recipe, RecipeId, normalize_ingredient};
use pantrypal::pantry::PantryStore;
use pantrypal::search;
use pantrypal::storage::FileKeyValueStore;
use std::rc::Rc;
use tokio::runtime::Runtime;
use tracing::warn;

fn margin() -> ColoredString {
    "┃".bright_magenta()
}

fn rule() -> ColoredString {
    "─".repeat(60).bright_magenta()
}

/// Open the persisted pantry and hydrate a store from it
fn open_store(ctx: &CliContext) -> Result<PantryStore> {
    let storage = FileKeyValueStore::open(&ctx.data_dir)
        .with_context(|| format!("Failed to open data folder {}", ctx.data_dir.display()))?;
    let store = PantryStore::new(Rc::new(storage));
    store.load_from_persistence();
    Ok(store)
}

fn ai_client(ctx: &CliContext) -> DefaultAiClient {
    DefaultAiClient::from_config(&ctx.config, &ctx.catalog)
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to start async runtime")
}

fn lookup_recipe(ctx: &CliContext, id: RecipeId) -> Result<&Recipe> {
    match ctx.catalog.get(id) {
        Some(recipe) => Ok(recipe),
        None => bail!(pantrypal::Error::NotFound(format!("recipe {}", id))),
    }
}

pub fn add_ingredient(ctx: &CliContext, name: &str, standardize: bool) -> Result<()> {
    let Some(raw) = normalize_ingredient(name) else {
        bail!(pantrypal::Error::InvalidInput(
            "ingredient name must not be empty".to_string()
        ));
    };

    let name = if standardize {
        let client = ai_client(ctx);
        let input = IngredientStandardizationInput {
            ingredient_name: name.to_string(),
        };
        match runtime()?.block_on(client.standardize_ingredient(&input)) {
            Ok(output) => output.standardized_name,
            Err(e) => {
                warn!(error = %e, ingredient = %raw, "Standardization failed, adding as typed");
                println!(
                    "{}  {} could not standardize, adding \"{}\" as typed",
                    margin(),
                    "Warning:".bright_yellow(),
                    raw
                );
                raw
            }
        }
    } else {
        raw
    };

    let store = open_store(ctx)?;
    if store.has_ingredient(&name) {
        println!("{}  {} is already in the pantry", margin(), name.bright_white());
        return Ok(());
    }

    store.add_ingredient(&name);
    println!(
        "{}  {} {}",
        margin(),
        "Added".bright_green(),
        name.to_lowercase().bright_white()
    );
    Ok(())
}

pub fn remove_ingredient(ctx: &CliContext, name: &str) -> Result<()> {
    let store = open_store(ctx)?;
    if !store.has_ingredient(name) {
        println!("{}  {} is not in the pantry", margin(), name.bright_white());
        return Ok(());
    }

    store.remove_ingredient(name);
    println!("{}  {} {}", margin(), "Removed".bright_red(), name.bright_white());
    Ok(())
}

pub fn clear_pantry(ctx: &CliContext) -> Result<()> {
    let store = open_store(ctx)?;
    let count = store.get_snapshot().ingredients.len();
    store.clear_ingredients();
    println!(
        "{}  Cleared {} ingredient{}",
        margin(),
        count.to_string().yellow(),
        if count == 1 { "" } else { "s" }
    );
    Ok(())
}

pub fn list_pantry(ctx: &CliContext) -> Result<()> {
    let store = open_store(ctx)?;
    let state = store.get_snapshot();

    println!("{}  {}", margin(), "MY PANTRY".bright_green().bold());
    println!("{}", rule());
    if state.ingredients.is_empty() {
        println!("{}  Your pantry is empty. Try: pantrypal add tomato", margin());
        return Ok(());
    }

    for (idx, ingredient) in state.ingredients.iter().enumerate() {
        println!(
            "{}  {}. {}",
            margin(),
            (idx + 1).to_string().yellow(),
            ingredient.bright_white()
        );
    }
    Ok(())
}

pub fn list_matching_recipes(ctx: &CliContext) -> Result<()> {
    let store = open_store(ctx)?;
    let state = store.get_snapshot();
    let matches = search::match_recipes(&ctx.catalog, &state.ingredients);

    println!("{}  {}", margin(), "RECIPES YOU CAN MAKE".bright_green().bold());
    println!("{}", rule());
    if matches.is_empty() {
        println!(
            "{}  No catalog recipe uses your ingredients yet. Try `pantrypal suggest`.",
            margin()
        );
        return Ok(());
    }

    for found in matches {
        let star = if state.is_favorite(found.recipe.id) {
            "★".bright_yellow()
        } else {
            " ".normal()
        };
        println!(
            "{}  {} {} {} {}",
            margin(),
            format!("[{}]", found.recipe.id).bright_black(),
            star,
            found.recipe.title.bright_white().bold(),
            format!(
                "({}/{} ingredients, {} missing)",
                found.match_count,
                found.recipe.ingredients.len(),
                found.missing_count()
            )
            .bright_cyan()
        );
        println!(
            "{}      {} {}",
            margin(),
            "uses:".bright_black(),
            found.matched_ingredients.join(", ")
        );
    }
    Ok(())
}

pub fn show_recipe(ctx: &CliContext, id: RecipeId) -> Result<()> {
    let recipe = lookup_recipe(ctx, id)?;
    let store = open_store(ctx)?;
    let state = store.get_snapshot();

    println!(
        "{}  {} {}",
        margin(),
        "RECIPE".bright_green().bold(),
        recipe.title.bold()
    );
    println!("{}", rule());
    println!("{}  {}", margin(), recipe.description);
    println!(
        "{}  {}: {}",
        margin(),
        "Prep time".bright_yellow(),
        recipe.prep_time
    );
    if state.is_favorite(recipe.id) {
        println!("{}  {}", margin(), "★ Favorite".bright_yellow());
    }
    println!("{}", rule());

    println!("{}  {}", margin(), "Ingredients".bright_blue().bold());
    for ingredient in &recipe.ingredients {
        let marker = if state.has_ingredient(&ingredient.name) {
            "✓".bright_green()
        } else {
            "·".bright_black()
        };
        println!(
            "{}  {} {} {}",
            margin(),
            marker,
            ingredient.quantity.bright_cyan(),
            ingredient.name
        );
    }

    println!("{}  {}", margin(), "Instructions".bright_blue().bold());
    for (idx, step) in recipe.instructions.iter().enumerate() {
        println!("{}  {}. {}", margin(), (idx + 1).to_string().yellow(), step);
    }
    println!("{}", rule());
    Ok(())
}

pub fn search_recipes(ctx: &CliContext, query: &str) -> Result<()> {
    let results = search::search_catalog(&ctx.catalog, query);

    println!(
        "{}  {} \"{}\"",
        margin(),
        "SEARCH RESULTS FOR".bright_green().bold(),
        query.bright_white()
    );
    println!("{}", rule());
    if results.is_empty() {
        println!("{}  No recipes found matching: {}", margin(), query);
        return Ok(());
    }

    for recipe in results {
        println!(
            "{}  {} {} {}",
            margin(),
            format!("[{}]", recipe.id).bright_black(),
            recipe.title.bright_white().bold(),
            format!("({})", recipe.prep_time).bright_cyan()
        );
    }
    Ok(())
}

pub fn toggle_favorite(ctx: &CliContext, id: RecipeId) -> Result<()> {
    let recipe = lookup_recipe(ctx, id)?;
    let store = open_store(ctx)?;

    store.toggle_favorite(id);
    if store.is_favorite(id) {
        println!(
            "{}  {} {}",
            margin(),
            "★ Added to favorites:".bright_yellow(),
            recipe.title.bright_white()
        );
    } else {
        println!(
            "{}  {} {}",
            margin(),
            "Removed from favorites:".bright_black(),
            recipe.title.bright_white()
        );
    }
    Ok(())
}

pub fn list_favorites(ctx: &CliContext) -> Result<()> {
    let store = open_store(ctx)?;
    let state = store.get_snapshot();
    let catalog_favorites = search::favorite_recipes(&ctx.catalog, &state);

    println!("{}  {}", margin(), "★ FAVORITES".bright_yellow().bold());
    println!("{}", rule());
    if catalog_favorites.is_empty() && state.favorite_generated_recipes.is_empty() {
        println!(
            "{}  No favorites yet. Use `pantrypal favorite <ID>` or `pantrypal suggest --save`.",
            margin()
        );
        return Ok(());
    }

    for recipe in catalog_favorites {
        println!(
            "{}  {} {}",
            margin(),
            format!("[{}]", recipe.id).bright_black(),
            recipe.title.bright_white()
        );
    }
    for recipe in &state.favorite_generated_recipes {
        println!(
            "{}  {} {} {}",
            margin(),
            format!("[{}]", recipe.id).bright_black(),
            recipe.title.bright_white(),
            "(AI)".bright_magenta()
        );
    }
    Ok(())
}

fn print_generated(recipe: &GeneratedRecipe) {
    println!(
        "{}  {} {}",
        margin(),
        "AI RECIPE".bright_magenta().bold(),
        recipe.title.bold()
    );
    println!("{}", rule());
    println!("{}  {}", margin(), recipe.description);
    println!(
        "{}  {}: {}",
        margin(),
        "Prep time".bright_yellow(),
        recipe.prep_time
    );
    match &recipe.image {
        Some(image) if image.starts_with("data:") => {
            println!("{}  {}: embedded ({} bytes)", margin(), "Image".bright_cyan(), image.len())
        }
        Some(image) => println!("{}  {}: {}", margin(), "Image".bright_cyan(), image),
        None => {}
    }
    println!("{}", rule());

    println!("{}  {}", margin(), "Ingredients".bright_blue().bold());
    for ingredient in &recipe.ingredients {
        println!(
            "{}  - {} {}",
            margin(),
            ingredient.quantity.bright_cyan(),
            ingredient.name
        );
    }
    println!("{}  {}", margin(), "Instructions".bright_blue().bold());
    for (idx, step) in recipe.instructions.iter().enumerate() {
        println!("{}  {}. {}", margin(), (idx + 1).to_string().yellow(), step);
    }
    println!("{}", rule());
}

fn require_ingredients(csv: &str) -> Result<()> {
    if csv.is_empty() {
        bail!(pantrypal::Error::InvalidInput(
            "your pantry is empty, add some ingredients first".to_string()
        ));
    }
    Ok(())
}

pub fn suggest_recipe(ctx: &CliContext, save: bool) -> Result<()> {
    let store = open_store(ctx)?;
    let ingredients = store.get_snapshot().ingredients_csv();
    require_ingredients(&ingredients)?;

    println!("{}  Asking {} for a new recipe...", margin(), ctx.config.ollama.model.bright_cyan());
    let client = ai_client(ctx);
    let suggestion = runtime()?
        .block_on(client.suggest_recipe(&SuggestRecipeInput { ingredients }))?;

    let recipe = suggestion.into_generated();
    print_generated(&recipe);

    if save {
        store.toggle_generated_favorite(&recipe);
        println!(
            "{}  {} {}",
            margin(),
            "★ Saved to favorites with id".bright_yellow(),
            recipe.id
        );
    }
    Ok(())
}

pub fn meal_plan(ctx: &CliContext, preferences: Option<&str>, text: bool) -> Result<()> {
    let store = open_store(ctx)?;
    let ingredients = store.get_snapshot().ingredients_csv();
    require_ingredients(&ingredients)?;

    let input = MealPlanInput::new(ingredients, preferences);
    let client = ai_client(ctx);
    let rt = runtime()?;

    println!("{}  {}", margin(), "WEEKLY MEAL PLAN".bright_green().bold());
    println!(
        "{}  {}: {}",
        margin(),
        "Dietary preferences".bright_yellow(),
        input.dietary_preferences
    );
    println!("{}", rule());

    if text {
        let plan = rt
            .block_on(client.generate_meal_plan_text(&input))?;
        for line in plan.meal_plan.lines() {
            println!("{}  {}", margin(), line);
        }
        println!("{}", rule());
        return Ok(());
    }

    let plan = rt
        .block_on(client.generate_meal_plan(&input))?;
    for day in &plan.meal_plan {
        println!("{}  {}", margin(), day.day.bright_white().bold());
        for (slot, meal) in day.meals() {
            println!(
                "{}    {:<10} {}",
                margin(),
                slot.bright_cyan(),
                meal.name.bright_white()
            );
            println!("{}               {}", margin(), meal.recipe.bright_black());
        }
    }
    println!("{}", rule());
    Ok(())
}
