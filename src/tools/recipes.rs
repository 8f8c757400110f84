//! Recipe search tools backed by Spoonacular.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::spoonacular::SpoonacularClient;

pub struct SearchRecipesByIngredientsTool {
    spoonacular: Arc<SpoonacularClient>,
    spec: ToolSpec,
}

impl SearchRecipesByIngredientsTool {
    pub fn new(spoonacular: Arc<SpoonacularClient>) -> Self {
        Self {
            spoonacular,
            spec: ToolSpec {
                name: "search_recipes_by_ingredients",
                description: "Search for recipes using available ingredients via Spoonacular API. \
                              Returns recipe suggestions instantly.",
                params: vec![
                    ParamSpec::required(
                        "ingredients",
                        ParamKind::String,
                        "Comma-separated list of ingredients (e.g., 'salmon,lemon,dill')",
                    ),
                    ParamSpec::with_default(
                        "number",
                        ParamKind::Integer,
                        "Number of recipes to return (default 3, max 5)",
                        json!(3),
                    ),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct SearchByIngredientsInput {
    ingredients: String,
    number: u32,
}

#[async_trait::async_trait]
impl Tool for SearchRecipesByIngredientsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: SearchByIngredientsInput = serde_json::from_value(params)?;
        info!(ingredients = %input.ingredients, "searching recipes by ingredients");

        let recipes = self
            .spoonacular
            .find_by_ingredients(&input.ingredients, input.number.min(5))
            .await?;
        Ok(json!({
            "success": true,
            "total_recipes": recipes.len(),
            "recipes": recipes,
        }))
    }
}

pub struct GetRecipeDetailsTool {
    spoonacular: Arc<SpoonacularClient>,
    spec: ToolSpec,
}

impl GetRecipeDetailsTool {
    pub fn new(spoonacular: Arc<SpoonacularClient>) -> Self {
        Self {
            spoonacular,
            spec: ToolSpec {
                name: "get_recipe_details",
                description: "Get full recipe details including ingredients and instructions \
                              for a specific recipe by ID",
                params: vec![ParamSpec::required(
                    "recipe_id",
                    ParamKind::Integer,
                    "The Spoonacular recipe ID from search results",
                )],
            },
        }
    }
}

#[derive(Deserialize)]
struct GetRecipeDetailsInput {
    recipe_id: i64,
}

#[async_trait::async_trait]
impl Tool for GetRecipeDetailsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: GetRecipeDetailsInput = serde_json::from_value(params)?;
        info!(recipe_id = input.recipe_id, "fetching recipe details");

        let details = self.spoonacular.recipe_information(input.recipe_id).await?;
        Ok(json!({
            "success": true,
            "title": details.title,
            "image": details.image,
            "servings": details.servings,
            "ready_in_minutes": details.ready_in_minutes,
            "ingredients": details.ingredients,
            "instructions": details.instructions,
            "source_url": details.source_url,
        }))
    }
}

pub struct SearchRecipesByNameTool {
    spoonacular: Arc<SpoonacularClient>,
    spec: ToolSpec,
}

impl SearchRecipesByNameTool {
    pub fn new(spoonacular: Arc<SpoonacularClient>) -> Self {
        Self {
            spoonacular,
            spec: ToolSpec {
                name: "search_recipes_by_name",
                description: "Search for recipes by name or dish type via Spoonacular API. \
                              Use when the user asks for a specific dish rather than \
                              what their ingredients can make.",
                params: vec![
                    ParamSpec::required(
                        "query",
                        ParamKind::String,
                        "Recipe name or dish to search for (e.g., 'chicken parmesan')",
                    ),
                    ParamSpec::with_default(
                        "number",
                        ParamKind::Integer,
                        "Number of recipes to return",
                        json!(5),
                    ),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct SearchByNameInput {
    query: String,
    number: u32,
}

#[async_trait::async_trait]
impl Tool for SearchRecipesByNameTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: SearchByNameInput = serde_json::from_value(params)?;
        info!(query = %input.query, "searching recipes by name");

        let recipes = self.spoonacular.search_by_name(&input.query, input.number).await?;
        Ok(json!({
            "success": true,
            "total_recipes": recipes.len(),
            "recipes": recipes,
        }))
    }
}
