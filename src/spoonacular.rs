//! Spoonacular recipe API client.
//!
//! Covers the three endpoints pantrybot uses: `findByIngredients` for
//! pantry-driven suggestions, `complexSearch` for name lookups, and
//! `/recipes/{id}/information` for full details. Search results are
//! condensed to what the model needs, scored by [`match_percentage`], and
//! sorted best-match-first.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Failures reported by the Spoonacular client.
#[derive(Debug, thiserror::Error)]
pub enum SpoonacularError {
    #[error("Spoonacular API key not configured")]
    MissingApiKey,
    #[error("Spoonacular API error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// A condensed search hit, shaped for the model and the chat frontend.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    #[serde(rename = "usedIngredients")]
    pub used_ingredients: usize,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: f64,
    #[serde(rename = "missedIngredients")]
    pub missed_ingredients: Vec<String>,
}

/// Full recipe details with flattened ingredients and numbered steps.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetails {
    pub title: String,
    pub image: Option<String>,
    pub servings: Option<i64>,
    pub ready_in_minutes: Option<i64>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub source_url: Option<String>,
}

#[derive(Deserialize)]
struct FindByIngredientsHit {
    id: i64,
    title: String,
    image: Option<String>,
    #[serde(default, rename = "usedIngredients")]
    used_ingredients: Vec<IngredientRef>,
    #[serde(default, rename = "missedIngredients")]
    missed_ingredients: Vec<IngredientRef>,
}

#[derive(Deserialize)]
struct IngredientRef {
    name: Option<String>,
}

/// Share of a recipe's ingredients already on hand, as a percentage
/// rounded to one decimal. Zero when the recipe lists no ingredients.
pub fn match_percentage(used: usize, missed: usize) -> f64 {
    let total = used + missed;
    if total == 0 {
        return 0.0;
    }
    let pct = used as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// A configured Spoonacular API client.
pub struct SpoonacularClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(crate::constants::SPOONACULAR_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(crate::constants::ADAPTER_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, SpoonacularError> {
        self.api_key.as_deref().ok_or(SpoonacularError::MissingApiKey)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SpoonacularError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(SpoonacularError::Status { status, body })
        }
    }

    /// Searches recipes by available ingredients, ranked to maximize the
    /// ingredients used, then condensed and sorted by match percentage.
    pub async fn find_by_ingredients(
        &self,
        ingredients: &str,
        number: u32,
    ) -> Result<Vec<RecipeSummary>, SpoonacularError> {
        let api_key = self.api_key()?;
        let number = number.to_string();
        let resp = self
            .http
            .get(format!("{}/recipes/findByIngredients", self.base_url))
            .query(&[
                ("apiKey", api_key),
                ("ingredients", ingredients),
                ("number", number.as_str()),
                ("ranking", "2"),
                ("ignorePantry", "false"),
            ])
            .send()
            .await?;
        let hits: Vec<FindByIngredientsHit> = Self::check(resp).await?.json().await?;
        Ok(summarize_hits(hits))
    }

    /// Searches recipes by name. Hits carry a fixed 100% match since there
    /// is no pantry comparison on this path.
    pub async fn search_by_name(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<Value>, SpoonacularError> {
        let api_key = self.api_key()?;
        let number = number.to_string();
        let resp = self
            .http
            .get(format!("{}/recipes/complexSearch", self.base_url))
            .query(&[
                ("apiKey", api_key),
                ("query", query),
                ("number", number.as_str()),
                ("addRecipeInformation", "true"),
                ("fillIngredients", "true"),
                ("instructionsRequired", "true"),
            ])
            .send()
            .await?;
        let data: Value = Self::check(resp).await?.json().await?;
        let results = data
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(results
            .iter()
            .map(|recipe| {
                serde_json::json!({
                    "id": recipe.get("id"),
                    "title": recipe.get("title"),
                    "image": recipe.get("image"),
                    "readyInMinutes": recipe.get("readyInMinutes"),
                    "servings": recipe.get("servings"),
                    "matchPercentage": 100,
                    "usedIngredients": 0,
                    "missedIngredients": [],
                })
            })
            .collect())
    }

    /// Fetches full details for one recipe.
    pub async fn recipe_information(&self, recipe_id: i64) -> Result<RecipeDetails, SpoonacularError> {
        let api_key = self.api_key()?;
        let resp = self
            .http
            .get(format!("{}/recipes/{}/information", self.base_url, recipe_id))
            .query(&[("apiKey", api_key), ("includeNutrition", "false")])
            .send()
            .await?;
        let recipe: Value = Self::check(resp).await?.json().await?;
        Ok(shape_details(&recipe))
    }
}

fn summarize_hits(hits: Vec<FindByIngredientsHit>) -> Vec<RecipeSummary> {
    let mut summaries: Vec<RecipeSummary> = hits
        .into_iter()
        .map(|hit| {
            let used = hit.used_ingredients.len();
            let missed = hit.missed_ingredients.len();
            RecipeSummary {
                id: hit.id,
                title: hit.title,
                image: hit.image,
                used_ingredients: used,
                match_percentage: match_percentage(used, missed),
                missed_ingredients: hit
                    .missed_ingredients
                    .into_iter()
                    .filter_map(|i| i.name)
                    .collect(),
            }
        })
        .collect();
    // Stable sort: source order breaks percentage ties.
    summaries.sort_by(|a, b| {
        b.match_percentage
            .partial_cmp(&a.match_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

fn shape_details(recipe: &Value) -> RecipeDetails {
    let ingredients = recipe
        .get("extendedIngredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.get("original").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let mut instructions: Vec<String> = recipe
        .get("analyzedInstructions")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("steps"))
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .map(|step| {
                    format!(
                        "{}. {}",
                        step.get("number").and_then(Value::as_i64).unwrap_or_default(),
                        step.get("step").and_then(Value::as_str).unwrap_or_default()
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    if instructions.is_empty() {
        if let Some(text) = recipe.get("instructions").and_then(Value::as_str) {
            if !text.is_empty() {
                instructions = vec![text.to_string()];
            }
        }
    }

    RecipeDetails {
        title: recipe
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        image: recipe.get("image").and_then(Value::as_str).map(String::from),
        servings: recipe.get("servings").and_then(Value::as_i64),
        ready_in_minutes: recipe.get("readyInMinutes").and_then(Value::as_i64),
        ingredients,
        instructions,
        source_url: recipe.get("sourceUrl").and_then(Value::as_str).map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_percentage_zero_when_no_ingredients() {
        assert_eq!(match_percentage(0, 0), 0.0);
    }

    #[test]
    fn match_percentage_full_when_nothing_missed() {
        assert_eq!(match_percentage(1, 0), 100.0);
        assert_eq!(match_percentage(7, 0), 100.0);
    }

    #[test]
    fn match_percentage_rounds_to_one_decimal() {
        // 2 of 3 ingredients on hand.
        assert_eq!(match_percentage(2, 1), 66.7);
    }

    #[test]
    fn match_percentage_monotonic_in_used() {
        let mut last = 0.0;
        for used in 0..20 {
            let pct = match_percentage(used, 5);
            assert!(pct >= last, "pct regressed at used={}", used);
            last = pct;
        }
    }

    fn hit(id: i64, title: &str, used: usize, missed: usize) -> FindByIngredientsHit {
        FindByIngredientsHit {
            id,
            title: title.to_string(),
            image: None,
            used_ingredients: (0..used).map(|_| IngredientRef { name: None }).collect(),
            missed_ingredients: (0..missed)
                .map(|i| IngredientRef {
                    name: Some(format!("missing-{}", i)),
                })
                .collect(),
        }
    }

    #[test]
    fn summaries_sort_descending_with_stable_ties() {
        let summaries = summarize_hits(vec![
            hit(1, "half", 1, 1),
            hit(2, "full", 3, 0),
            hit(3, "also-half", 2, 2),
        ]);
        let titles: Vec<&str> = summaries.iter().map(|s| s.title.as_str()).collect();
        // Ties (50%) keep source order: "half" before "also-half".
        assert_eq!(titles, vec!["full", "half", "also-half"]);
    }

    #[test]
    fn details_fall_back_to_plain_instructions() {
        let details = shape_details(&serde_json::json!({
            "title": "Toast",
            "instructions": "Toast the bread.",
            "extendedIngredients": [{"original": "1 slice bread"}],
        }));
        assert_eq!(details.instructions, vec!["Toast the bread.".to_string()]);
        assert_eq!(details.ingredients, vec!["1 slice bread".to_string()]);
    }
}
