//! Stock mutation tools. Both resolve the free-text product name to exactly
//! one Grocy product before touching inventory, and report the resolved
//! exact name back rather than the raw user text.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::grocy::{GrocyClient, GrocyError};

pub struct ConsumeStockTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl ConsumeStockTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "consume_stock",
                description: "Remove/consume items from pantry inventory in Grocy. \
                              Use this when the user says they used ingredients or made a recipe.",
                params: vec![
                    ParamSpec::required(
                        "product_name",
                        ParamKind::String,
                        "Name of the product to consume (e.g., 'salmon', 'canned salmon')",
                    ),
                    ParamSpec::required(
                        "amount",
                        ParamKind::Number,
                        "Amount to consume/remove from inventory",
                    ),
                    ParamSpec::with_default(
                        "spoiled",
                        ParamKind::Boolean,
                        "Whether the item was spoiled",
                        json!(false),
                    ),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct ConsumeStockInput {
    product_name: String,
    amount: f64,
    spoiled: bool,
}

#[async_trait::async_trait]
impl Tool for ConsumeStockTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: ConsumeStockInput = serde_json::from_value(params)?;
        info!(product = %input.product_name, amount = input.amount, spoiled = input.spoiled, "consuming stock");

        let product = self.grocy.resolve_product(&input.product_name).await?;
        self.grocy.consume(product.id, input.amount, input.spoiled).await?;

        Ok(json!({
            "success": true,
            "message": format!("Successfully consumed {} of '{}'", input.amount, product.name),
            "product_name": product.name,
            "amount": input.amount,
            "spoiled": input.spoiled,
        }))
    }
}

pub struct AddStockTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl AddStockTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "add_stock",
                description: "Add items to pantry inventory in Grocy. \
                              Use this when the user says they bought groceries or restocked items.",
                params: vec![
                    ParamSpec::required(
                        "product_name",
                        ParamKind::String,
                        "Name of the product to add (e.g., 'salmon', 'canned salmon')",
                    ),
                    ParamSpec::required("amount", ParamKind::Number, "Amount to add to inventory"),
                    ParamSpec::optional(
                        "best_before_date",
                        ParamKind::String,
                        "Best before date in YYYY-MM-DD format (optional)",
                    ),
                    ParamSpec::optional("price", ParamKind::Number, "Price paid for the item (optional)"),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct AddStockInput {
    product_name: String,
    amount: f64,
    best_before_date: Option<String>,
    price: Option<f64>,
}

#[async_trait::async_trait]
impl Tool for AddStockTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: AddStockInput = serde_json::from_value(params)?;
        info!(product = %input.product_name, amount = input.amount, "adding stock");

        // An unknown product is created on the fly; ambiguity is still refused.
        let product = match self.grocy.resolve_product(&input.product_name).await {
            Ok(product) => product,
            Err(GrocyError::ProductNotFound(_)) => {
                info!(product = %input.product_name, "product not found, creating it");
                self.grocy.create_product(&input.product_name).await?;
                self.grocy.resolve_product(&input.product_name).await?
            }
            Err(err) => return Err(err.into()),
        };

        self.grocy
            .add(
                product.id,
                input.amount,
                input.best_before_date.as_deref(),
                input.price,
            )
            .await?;

        Ok(json!({
            "success": true,
            "message": format!("Successfully added {} of '{}' to inventory", input.amount, product.name),
            "product_name": product.name,
            "amount": input.amount,
            "best_before_date": input.best_before_date,
            "price": input.price,
        }))
    }
}
