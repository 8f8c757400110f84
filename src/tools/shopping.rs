//! Shopping list tools.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::grocy::GrocyClient;

pub struct AddToShoppingListTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl AddToShoppingListTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "add_to_shopping_list",
                description: "Add items to the Grocy shopping list. \
                              Use this when the user wants to remember to buy something.",
                params: vec![
                    ParamSpec::required(
                        "product_name",
                        ParamKind::String,
                        "Name of the product to add to shopping list",
                    ),
                    ParamSpec::with_default(
                        "amount",
                        ParamKind::Number,
                        "Amount to add to shopping list",
                        json!(1),
                    ),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct AddToShoppingListInput {
    product_name: String,
    amount: f64,
}

#[async_trait::async_trait]
impl Tool for AddToShoppingListTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: AddToShoppingListInput = serde_json::from_value(params)?;
        info!(product = %input.product_name, amount = input.amount, "adding to shopping list");

        let product = self.grocy.resolve_product(&input.product_name).await?;
        self.grocy.add_to_shopping_list(product.id, input.amount).await?;

        Ok(json!({
            "success": true,
            "message": format!("Added {} of '{}' to shopping list", input.amount, product.name),
            "product_name": product.name,
            "amount": input.amount,
        }))
    }
}

pub struct GetShoppingListTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl GetShoppingListTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "get_shopping_list",
                description: "Get the current shopping list from Grocy",
                params: vec![],
            },
        }
    }
}

#[async_trait::async_trait]
impl Tool for GetShoppingListTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _params: Value) -> Result<Value> {
        let list = self.grocy.shopping_list().await?;
        let items: Vec<Value> = list
            .iter()
            .map(|item| {
                json!({
                    "product_id": item.product_id,
                    "amount": item.amount,
                    "note": item.note.as_deref().unwrap_or(""),
                })
            })
            .collect();
        Ok(json!({
            "success": true,
            "total_items": items.len(),
            "items": items,
        }))
    }
}
