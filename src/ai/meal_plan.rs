//! Weekly meal plans
//!
//! Two incompatible flow versions exist and both stay available: the
//! structured plan (v2) returns day-by-day meals, the free-text plan (v1)
//! returns one block of prose.

use crate::AiError;
use crate::ai::{AiClient, ImageModel, TextModel, Validate, require_text};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanInput {
    /// Comma-separated ingredient list
    pub ingredients: String,
    pub dietary_preferences: String,
}

impl MealPlanInput {
    /// Blank preferences are sent as "None"
    pub fn new(ingredients: impl Into<String>, dietary_preferences: Option<&str>) -> Self {
        let dietary_preferences = dietary_preferences
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("None")
            .to_string();

        Self {
            ingredients: ingredients.into(),
            dietary_preferences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    /// Short recipe or preparation steps
    pub recipe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: String,
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
}

impl DailyPlan {
    pub fn meals(&self) -> [(&'static str, &Meal); 3] {
        [
            ("Breakfast", &self.breakfast),
            ("Lunch", &self.lunch),
            ("Dinner", &self.dinner),
        ]
    }
}

pub const DAYS_IN_PLAN: usize = 7;

/// Structured plan (v2), one entry per day from Monday to Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMealPlan {
    pub meal_plan: Vec<DailyPlan>,
}

/// Free-text plan (v1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanText {
    pub meal_plan: String,
}

impl Validate for MealPlanInput {
    fn validate(&self) -> Result<(), AiError> {
        require_text("ingredients", &self.ingredients)
    }
}

impl Validate for WeeklyMealPlan {
    fn validate(&self) -> Result<(), AiError> {
        if self.meal_plan.len() != DAYS_IN_PLAN {
            return Err(AiError::Validation(format!(
                "mealPlan must cover {} days, got {}",
                DAYS_IN_PLAN,
                self.meal_plan.len()
            )));
        }
        for day in &self.meal_plan {
            require_text("mealPlan[].day", &day.day)?;
            for (slot, meal) in day.meals() {
                require_text(&format!("{} name on {}", slot, day.day), &meal.name)?;
            }
        }
        Ok(())
    }
}

impl Validate for MealPlanText {
    fn validate(&self) -> Result<(), AiError> {
        require_text("mealPlan", &self.meal_plan)
    }
}

const PLAN_INTRO: &str = "You are a master chef and meal planning assistant. Your task is to \
generate a complete 7-day meal plan based on the ingredients a user has available and their \
stated dietary preferences.\n\n\
You need to create a plan for Breakfast, Lunch, and Dinner for each day of the week, from \
Monday to Sunday.\n\n\
- Use the provided ingredients creatively.\n\
- Supplement with common pantry staples if necessary, but prioritize the user's ingredients.\n\
- Adhere strictly to the dietary preferences.\n";

fn render_structured_prompt(input: &MealPlanInput) -> String {
    format!(
        "{}- For each meal, provide a simple name and a brief recipe or preparation steps.\n\n\
         Available Ingredients: {}\n\
         Dietary Preferences: {}\n\n\
         Respond with only a JSON object of the form {{\"mealPlan\": [{{\"day\": \"Monday\", \
         \"breakfast\": {{\"name\": \"...\", \"recipe\": \"...\"}}, \"lunch\": {{...}}, \
         \"dinner\": {{...}}}}]}}.",
        PLAN_INTRO, input.ingredients, input.dietary_preferences
    )
}

fn render_text_prompt(input: &MealPlanInput) -> String {
    format!(
        "{}- Write the plan as readable text, one section per day.\n\n\
         Available Ingredients: {}\n\
         Dietary Preferences: {}\n\n\
         Respond with only a JSON object of the form {{\"mealPlan\": \"...\"}}.",
        PLAN_INTRO, input.ingredients, input.dietary_preferences
    )
}

impl<T: TextModel, I: ImageModel> AiClient<T, I> {
    pub async fn generate_meal_plan(
        &self,
        input: &MealPlanInput,
    ) -> Result<WeeklyMealPlan, AiError> {
        input.validate()?;
        self.run_prompt("generate_meal_plan", &render_structured_prompt(input))
            .await
    }

    pub async fn generate_meal_plan_text(
        &self,
        input: &MealPlanInput,
    ) -> Result<MealPlanText, AiError> {
        input.validate()?;
        self.run_prompt("generate_meal_plan_text", &render_text_prompt(input))
            .await
    }
}
