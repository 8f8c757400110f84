//! Saved-recipe tools backed by the local [`RecipeStore`].

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::recipes::RecipeStore;

pub struct SaveRecipeTool {
    store: Arc<RecipeStore>,
    spec: ToolSpec,
}

impl SaveRecipeTool {
    pub fn new(store: Arc<RecipeStore>) -> Self {
        Self {
            store,
            spec: ToolSpec {
                name: "save_recipe",
                description: "Save a recipe to the filesystem for later reference",
                params: vec![
                    ParamSpec::required(
                        "recipe_name",
                        ParamKind::String,
                        "Name for the recipe file (e.g., 'Salmon Cakes')",
                    ),
                    ParamSpec::required(
                        "recipe_content",
                        ParamKind::String,
                        "Full recipe content including ingredients and instructions",
                    ),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct SaveRecipeInput {
    recipe_name: String,
    recipe_content: String,
}

#[async_trait::async_trait]
impl Tool for SaveRecipeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: SaveRecipeInput = serde_json::from_value(params)?;
        let path = self.store.save(&input.recipe_name, &input.recipe_content)?;
        Ok(json!({
            "success": true,
            "message": "Recipe saved successfully",
            "file_path": path.display().to_string(),
            "recipe_name": input.recipe_name,
        }))
    }
}

pub struct GetRecipeTool {
    store: Arc<RecipeStore>,
    spec: ToolSpec,
}

impl GetRecipeTool {
    pub fn new(store: Arc<RecipeStore>) -> Self {
        Self {
            store,
            spec: ToolSpec {
                name: "get_recipe",
                description: "Retrieve a previously saved recipe by name",
                params: vec![ParamSpec::required(
                    "recipe_name",
                    ParamKind::String,
                    "Name of the recipe to retrieve",
                )],
            },
        }
    }
}

#[derive(Deserialize)]
struct GetRecipeInput {
    recipe_name: String,
}

#[async_trait::async_trait]
impl Tool for GetRecipeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: GetRecipeInput = serde_json::from_value(params)?;
        match self.store.get(&input.recipe_name)? {
            Some(content) => Ok(json!({
                "success": true,
                "recipe_name": input.recipe_name,
                "content": content,
            })),
            None => Ok(json!({
                "success": false,
                "error": format!("Recipe '{}' not found", input.recipe_name),
                "available_recipes": self.store.available_names()?,
            })),
        }
    }
}

pub struct ListRecipesTool {
    store: Arc<RecipeStore>,
    spec: ToolSpec,
}

impl ListRecipesTool {
    pub fn new(store: Arc<RecipeStore>) -> Self {
        Self {
            store,
            spec: ToolSpec {
                name: "list_recipes",
                description: "List all saved recipes",
                params: vec![],
            },
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListRecipesTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _params: Value) -> Result<Value> {
        let recipes = self.store.list()?;
        Ok(json!({
            "success": true,
            "total_recipes": recipes.len(),
            "recipes": recipes,
        }))
    }
}
