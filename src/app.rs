use crate::handlers::ai::{AiMessage, AiPayload, AiTask, PendingRequest};
use crate::ui;
use anyhow::{Context, Result};
use flume::{Receiver, Sender};
use pantrypal::ai::{DefaultAiClient, WeeklyMealPlan};
use pantrypal::config::Config;
use pantrypal::models::{Catalog, GeneratedRecipe, PantryState, Recipe, RecipeId, normalize_ingredient};
use pantrypal::pantry::{PantryBinding, PantryStore};
use pantrypal::search::{self, RecipeMatch};
use pantrypal::storage::FileKeyValueStore;
use ratatui::Frame;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Pantry,
    Favorites,
    MealPlan,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Pantry => "Pantry",
            Screen::Favorites => "Favorites",
            Screen::MealPlan => "Meal Plan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    AddIngredient,
    Preferences,
    Help,
}

/// Which panel of the pantry screen has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Ingredients,
    Recipes,
}

/// Recipe shown in the detail popup
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Catalog(RecipeId),
    Generated(GeneratedRecipe),
}

/// One row of the favorites screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FavoriteItem<'a> {
    Catalog(&'a Recipe),
    Generated(&'a GeneratedRecipe),
}

impl FavoriteItem<'_> {
    pub fn title(&self) -> &str {
        match self {
            FavoriteItem::Catalog(recipe) => &recipe.title,
            FavoriteItem::Generated(recipe) => &recipe.title,
        }
    }
}

/// Results of the AI flows and the bookkeeping for the one request in flight
#[derive(Debug)]
pub struct AiState {
    pub client: Option<Arc<DefaultAiClient>>,
    pub sender: Sender<AiMessage>,
    pub receiver: Receiver<AiMessage>,
    pub pending: Option<PendingRequest>,
    next_request_id: u64,
    pub suggestion: Option<GeneratedRecipe>,
    pub meal_plan: Option<WeeklyMealPlan>,
    pub meal_plan_text: Option<String>,
    /// Ask for the free-text plan instead of the structured one
    pub use_text_plan: bool,
    pub preferences: String,
    pub loading_frame: usize,
}

impl AiState {
    fn new(client: Option<Arc<DefaultAiClient>>) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            client,
            sender,
            receiver,
            pending: None,
            next_request_id: 1,
            suggestion: None,
            meal_plan: None,
            meal_plan_text: None,
            use_text_plan: false,
            preferences: String::new(),
            loading_frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start tracking a new request; any older one is forgotten
    pub fn begin(&mut self, task: AiTask) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.pending = Some(PendingRequest { id, task });
        self.loading_frame = 0;
        id
    }
}

pub struct App {
    pub screen: Screen,
    pub screen_history: Vec<Screen>,
    pub input_mode: InputMode,
    pub focus: Focus,

    pub binding: PantryBinding,
    pub snapshot: Rc<PantryState>,
    pub catalog: Rc<Catalog>,
    pub ai: AiState,

    pub selected_ingredient: usize,
    pub selected_recipe: usize,
    pub selected_favorite: usize,
    pub meal_plan_scroll: u16,
    pub detail: Option<DetailView>,
    pub input_buffer: String,

    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub needs_redraw: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("input_mode", &self.input_mode)
            .field("focus", &self.focus)
            .field("ingredients", &self.snapshot.ingredients.len())
            .field("ai_busy", &self.ai.is_busy())
            .finish()
    }
}

impl App {
    /// Open the pantry in `data_dir` and hydrate it
    pub fn new(config: &Config, data_dir: &Path, catalog: Catalog) -> Result<Self> {
        let storage = FileKeyValueStore::open(data_dir)
            .with_context(|| format!("Failed to open data folder {}", data_dir.display()))?
            .with_poll_interval(Duration::from_millis(config.storage.watch_interval_ms));
        info!(data_dir = %storage.directory().display(), recipes = catalog.len(), "Starting TUI");
        let binding = PantryBinding::new(PantryStore::new(Rc::new(storage)));
        let client = DefaultAiClient::from_config(config, &catalog);

        Ok(Self::with_parts(binding, Rc::new(catalog), Some(Arc::new(client))))
    }

    pub fn with_parts(
        mut binding: PantryBinding,
        catalog: Rc<Catalog>,
        ai_client: Option<Arc<DefaultAiClient>>,
    ) -> Self {
        binding.mount();
        let snapshot = binding.snapshot();

        Self {
            screen: Screen::default(),
            screen_history: Vec::new(),
            input_mode: InputMode::default(),
            focus: Focus::default(),
            binding,
            snapshot,
            catalog,
            ai: AiState::new(ai_client),
            selected_ingredient: 0,
            selected_recipe: 0,
            selected_favorite: 0,
            meal_plan_scroll: 0,
            detail: None,
            input_buffer: String::new(),
            error_message: None,
            success_message: None,
            needs_redraw: false,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        ui::render(frame, self);
    }

    /// Runs once per event-loop iteration
    pub fn tick(&mut self) {
        self.sync();

        let messages: Vec<AiMessage> = self.ai.receiver.try_iter().collect();
        for message in messages {
            self.apply_ai_message(message);
        }

        if self.ai.is_busy() {
            self.ai.loading_frame = self.ai.loading_frame.wrapping_add(1);
        }
    }

    /// Pick up store changes (ours or another tab's) if the binding has any
    pub fn sync(&mut self) {
        if self.binding.poll() {
            self.snapshot = self.binding.snapshot();
            self.clamp_selections();
        }
    }

    fn clamp_selections(&mut self) {
        self.selected_ingredient = clamp(self.selected_ingredient, self.snapshot.ingredients.len());
        self.selected_recipe = clamp(self.selected_recipe, self.matches().len());
        self.selected_favorite = clamp(self.selected_favorite, self.favorite_items().len());
    }

    // Navigation

    pub fn navigate_to(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen_history.push(self.screen);
        self.screen = screen;
        self.detail = None;
        self.clear_messages();
    }

    pub fn can_go_back(&self) -> bool {
        !self.screen_history.is_empty()
    }

    pub fn go_back(&mut self) {
        if let Some(previous) = self.screen_history.pop() {
            self.screen = previous;
            self.detail = None;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Ingredients => Focus::Recipes,
            Focus::Recipes => Focus::Ingredients,
        };
    }

    pub fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match (self.screen, self.focus) {
            (Screen::Pantry, Focus::Ingredients) => {
                (&mut self.selected_ingredient, self.snapshot.ingredients.len())
            }
            (Screen::Pantry, Focus::Recipes) => {
                let len = search::match_recipes(&self.catalog, &self.snapshot.ingredients).len();
                (&mut self.selected_recipe, len)
            }
            (Screen::Favorites, _) => {
                let len = self.favorite_items().len();
                (&mut self.selected_favorite, len)
            }
            (Screen::MealPlan, _) => {
                self.meal_plan_scroll = if delta < 0 {
                    self.meal_plan_scroll.saturating_sub(1)
                } else {
                    self.meal_plan_scroll.saturating_add(1)
                };
                return;
            }
        };

        if len == 0 {
            *selected = 0;
            return;
        }
        *selected = (*selected as isize + delta).rem_euclid(len as isize) as usize;
    }

    // Derived views

    pub fn matches(&self) -> Vec<RecipeMatch<'_>> {
        search::match_recipes(&self.catalog, &self.snapshot.ingredients)
    }

    /// Catalog favorites first, then generated ones in the order they were saved
    pub fn favorite_items(&self) -> Vec<FavoriteItem<'_>> {
        search::favorite_recipes(&self.catalog, &self.snapshot)
            .into_iter()
            .map(FavoriteItem::Catalog)
            .chain(
                self.snapshot
                    .favorite_generated_recipes
                    .iter()
                    .map(FavoriteItem::Generated),
            )
            .collect()
    }

    pub fn selected_ingredient_name(&self) -> Option<&str> {
        self.snapshot
            .ingredients
            .get(self.selected_ingredient)
            .map(String::as_str)
    }

    // Pantry actions

    /// Add straight to the store, no AI involved
    pub fn add_ingredient(&mut self, name: &str) {
        let Some(name) = normalize_ingredient(name) else {
            return;
        };
        if self.snapshot.has_ingredient(&name) {
            self.set_error_message(format!("{} is already in your pantry", name));
            return;
        }

        self.binding.add_ingredient(&name);
        self.sync();
        self.set_success_message(format!("Added {}", name));
    }

    /// Entry point for the add-ingredient input box
    pub fn submit_ingredient(&mut self, input: &str) {
        let Some(raw) = normalize_ingredient(input) else {
            self.set_error_message("Ingredient name must not be empty".to_string());
            return;
        };
        if self.snapshot.has_ingredient(&raw) {
            self.set_error_message(format!("{} is already in your pantry", raw));
            return;
        }

        match self.ai.client.clone() {
            Some(client) if !self.ai.is_busy() => {
                crate::handlers::ai::request_standardization(self, client, input.trim(), raw);
            }
            _ => self.add_ingredient(&raw),
        }
    }

    pub fn remove_selected_ingredient(&mut self) {
        let Some(name) = self.selected_ingredient_name().map(str::to_string) else {
            return;
        };
        self.binding.remove_ingredient(&name);
        self.sync();
        self.set_success_message(format!("Removed {}", name));
    }

    pub fn clear_ingredients(&mut self) {
        if self.snapshot.ingredients.is_empty() {
            return;
        }
        self.binding.clear_ingredients();
        self.sync();
        self.set_success_message("Pantry cleared".to_string());
    }

    // Recipe actions

    /// The recipe the cursor (or the open popup) points at
    pub fn current_recipe(&self) -> Option<DetailView> {
        if let Some(detail) = &self.detail {
            return Some(detail.clone());
        }

        match (self.screen, self.focus) {
            (Screen::Pantry, Focus::Recipes) => self
                .matches()
                .get(self.selected_recipe)
                .map(|found| DetailView::Catalog(found.recipe.id)),
            (Screen::Pantry, Focus::Ingredients) => self.ai.suggestion.clone().map(DetailView::Generated),
            (Screen::Favorites, _) => {
                self.favorite_items()
                    .get(self.selected_favorite)
                    .map(|item| match item {
                        FavoriteItem::Catalog(recipe) => DetailView::Catalog(recipe.id),
                        FavoriteItem::Generated(recipe) => DetailView::Generated((*recipe).clone()),
                    })
            }
            (Screen::MealPlan, _) => None,
        }
    }

    pub fn open_detail(&mut self) {
        self.detail = self.current_recipe();
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn toggle_current_favorite(&mut self) {
        let Some(target) = self.current_recipe() else {
            return;
        };

        let (title, now_favorite) = match &target {
            DetailView::Catalog(id) => {
                self.binding.toggle_favorite(*id);
                let title = self
                    .catalog
                    .get(*id)
                    .map(|recipe| recipe.title.clone())
                    .unwrap_or_default();
                (title, self.binding.store().is_favorite(*id))
            }
            DetailView::Generated(recipe) => {
                self.binding.toggle_generated_favorite(recipe);
                (
                    recipe.title.clone(),
                    self.binding.store().is_generated_favorite(recipe.id),
                )
            }
        };
        self.sync();

        if now_favorite {
            self.set_success_message(format!("★ {} added to favorites", title));
        } else {
            self.set_success_message(format!("{} removed from favorites", title));
        }
    }

    pub fn is_favorite(&self, view: &DetailView) -> bool {
        match view {
            DetailView::Catalog(id) => self.snapshot.is_favorite(*id),
            DetailView::Generated(recipe) => self.snapshot.is_generated_favorite(recipe.id),
        }
    }

    // AI

    pub fn request_suggestion(&mut self) {
        if !self.ready_for_ai() {
            return;
        }
        if let Some(client) = self.ai.client.clone() {
            crate::handlers::ai::request_suggestion(self, client);
        }
    }

    pub fn request_meal_plan(&mut self) {
        if !self.ready_for_ai() {
            return;
        }
        if let Some(client) = self.ai.client.clone() {
            crate::handlers::ai::request_meal_plan(self, client);
        }
    }

    fn ready_for_ai(&mut self) -> bool {
        if self.ai.client.is_none() {
            self.set_error_message("AI features are not available".to_string());
            return false;
        }
        if self.ai.is_busy() {
            self.set_error_message("Still waiting for the AI model".to_string());
            return false;
        }
        if self.snapshot.ingredients.is_empty() {
            self.set_error_message("Add some ingredients first".to_string());
            return false;
        }
        true
    }

    /// Fold one worker result into the app. Results for requests we are no
    /// longer waiting on are dropped.
    pub fn apply_ai_message(&mut self, message: AiMessage) {
        let pending = match self.ai.pending.take() {
            Some(pending) if pending.id == message.id => pending,
            other => {
                debug!(id = message.id, "Ignoring stale AI result");
                self.ai.pending = other;
                return;
            }
        };

        match (pending.task, message.result) {
            (AiTask::Standardize { raw }, Ok(AiPayload::Standardized(name))) => {
                self.add_ingredient(&name);
                if normalize_ingredient(&name).as_deref() != Some(raw.as_str()) {
                    debug!(raw = %raw, standardized = %name, "Ingredient standardized");
                }
            }
            (AiTask::Standardize { raw }, Err(error)) => {
                warn!(error = %error, ingredient = %raw, "Standardization failed, adding as typed");
                self.add_ingredient(&raw);
                self.set_error_message(format!("Could not standardize \"{}\": {}", raw, error));
            }
            (AiTask::Suggest, Ok(AiPayload::Suggestion(suggestion))) => {
                let recipe = suggestion.into_generated();
                self.set_success_message(format!("New recipe: {}", recipe.title));
                self.detail = Some(DetailView::Generated(recipe.clone()));
                self.ai.suggestion = Some(recipe);
            }
            (AiTask::MealPlan { .. }, Ok(AiPayload::MealPlan(plan))) => {
                self.ai.meal_plan = Some(plan);
                self.ai.meal_plan_text = None;
                self.meal_plan_scroll = 0;
                self.set_success_message("Meal plan ready".to_string());
            }
            (AiTask::MealPlan { .. }, Ok(AiPayload::MealPlanText(text))) => {
                self.ai.meal_plan_text = Some(text);
                self.ai.meal_plan = None;
                self.meal_plan_scroll = 0;
                self.set_success_message("Meal plan ready".to_string());
            }
            (_, Err(error)) => {
                warn!(error = %error, "AI request failed");
                self.set_error_message(error);
            }
            (task, Ok(_)) => {
                warn!(?task, "AI result does not match the request");
            }
        }
    }

    // Messages

    pub fn set_error_message(&mut self, message: String) {
        self.error_message = Some(message);
        self.success_message = None;
    }

    pub fn set_success_message(&mut self, message: String) {
        self.success_message = Some(message);
        self.error_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }
}

fn clamp(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}
