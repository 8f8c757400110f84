//! Read-only pantry tools backed by the Grocy stock overview.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::grocy::{GrocyClient, StockEntry};

/// A condensed stock row handed to the model.
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct PantryItem {
    pub name: String,
    pub amount: f64,
    pub best_before: String,
}

/// Applies the `category` filter to the stock overview. Categories are
/// `all`, `expiring_soon` (within [`crate::constants::EXPIRING_SOON_DAYS`]
/// of `today`, including already expired), `low_stock`, or a free-text name
/// filter. Zero-amount entries never appear.
pub fn filter_stock(entries: &[StockEntry], category: &str, today: NaiveDate) -> Vec<PantryItem> {
    let mut items = Vec::new();
    for entry in entries {
        if entry.amount_aggregated <= 0.0 {
            continue;
        }
        let best_before = entry.best_before_date.as_deref().unwrap_or("");
        if category != "all" {
            if category == "expiring_soon" {
                if let Ok(date) = NaiveDate::parse_from_str(best_before, "%Y-%m-%d") {
                    if (date - today).num_days() > crate::constants::EXPIRING_SOON_DAYS {
                        continue;
                    }
                }
            } else if category == "low_stock" {
                if entry.amount_aggregated >= entry.product.min_stock_amount {
                    continue;
                }
            } else if !entry
                .product
                .name
                .to_lowercase()
                .contains(&category.to_lowercase())
            {
                continue;
            }
        }
        items.push(PantryItem {
            name: entry.product.name.clone(),
            amount: entry.amount_aggregated,
            best_before: if best_before.is_empty() {
                "N/A".to_string()
            } else {
                best_before.to_string()
            },
        });
    }
    items
}

pub struct GetPantryItemsTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl GetPantryItemsTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "get_pantry_items",
                description: "Get condensed list of items currently in pantry from Grocy. \
                              Use this to check what ingredients are available.",
                params: vec![ParamSpec::with_default(
                    "category",
                    ParamKind::String,
                    "Filter by category: 'all', 'expiring_soon', 'low_stock', or a product name to search for",
                    json!("all"),
                )],
            },
        }
    }
}

#[derive(Deserialize)]
struct GetPantryItemsInput {
    category: String,
}

#[async_trait::async_trait]
impl Tool for GetPantryItemsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: GetPantryItemsInput = serde_json::from_value(params)?;
        let stock = self.grocy.stock().await?;
        let items = filter_stock(&stock, &input.category, chrono::Local::now().date_naive());
        Ok(json!({
            "success": true,
            "total_products": items.len(),
            "items": items,
        }))
    }
}

pub struct GetProductInfoTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl GetProductInfoTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "get_product_info",
                description: "Get detailed information about a specific product in the pantry",
                params: vec![ParamSpec::required(
                    "product_name",
                    ParamKind::String,
                    "Name of the product to search for",
                )],
            },
        }
    }
}

#[derive(Deserialize)]
struct GetProductInfoInput {
    product_name: String,
}

#[async_trait::async_trait]
impl Tool for GetProductInfoTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: GetProductInfoInput = serde_json::from_value(params)?;
        let stock = self.grocy.stock().await?;
        let needle = input.product_name.to_lowercase();
        let matches: Vec<Value> = stock
            .iter()
            .filter(|entry| entry.product.name.to_lowercase().contains(&needle))
            .map(|entry| {
                json!({
                    "name": entry.product.name,
                    "amount": entry.amount_aggregated,
                    "amount_opened": entry.amount_opened_aggregated,
                    "best_before": entry.best_before_date.as_deref().unwrap_or("N/A"),
                    "min_stock_amount": entry.product.min_stock_amount,
                })
            })
            .collect();

        if matches.is_empty() {
            Ok(json!({
                "found": false,
                "message": format!("No products found matching '{}'", input.product_name),
            }))
        } else {
            Ok(json!({"found": true, "matches": matches}))
        }
    }
}

pub struct GetExpiringSoonTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl GetExpiringSoonTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "get_expiring_soon",
                description: "Get products that are expiring soon or already expired, \
                              from Grocy's volatile stock report",
                params: vec![ParamSpec::with_default(
                    "days",
                    ParamKind::Integer,
                    "Number of days to look ahead",
                    json!(crate::constants::EXPIRING_SOON_DAYS),
                )],
            },
        }
    }
}

#[async_trait::async_trait]
impl Tool for GetExpiringSoonTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _params: Value) -> Result<Value> {
        let volatile = self.grocy.volatile().await?;
        let expiring = volatile
            .get("expiring_products")
            .cloned()
            .unwrap_or_else(|| json!([]));
        let expired = volatile
            .get("expired_products")
            .cloned()
            .unwrap_or_else(|| json!([]));
        let total = expiring.as_array().map_or(0, Vec::len)
            + expired.as_array().map_or(0, Vec::len);
        Ok(json!({
            "success": true,
            "expiring_soon": expiring,
            "already_expired": expired,
            "total_items": total,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grocy::StockProduct;

    fn entry(name: &str, amount: f64, min_stock: f64, best_before: Option<&str>) -> StockEntry {
        StockEntry {
            product: StockProduct {
                name: name.to_string(),
                min_stock_amount: min_stock,
            },
            amount_aggregated: amount,
            amount_opened_aggregated: 0.0,
            best_before_date: best_before.map(String::from),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn zero_amounts_are_skipped() {
        let stock = vec![entry("Rice", 0.0, 0.0, None), entry("Salt", 1.0, 0.0, None)];
        let items = filter_stock(&stock, "all", today());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Salt");
        assert_eq!(items[0].best_before, "N/A");
    }

    #[test]
    fn expiring_soon_keeps_near_and_past_dates() {
        let stock = vec![
            entry("Milk", 1.0, 0.0, Some("2026-03-05")),
            entry("Yogurt", 1.0, 0.0, Some("2026-02-20")),
            entry("Flour", 1.0, 0.0, Some("2026-09-01")),
        ];
        let names: Vec<String> = filter_stock(&stock, "expiring_soon", today())
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Milk".to_string(), "Yogurt".to_string()]);
    }

    #[test]
    fn low_stock_compares_against_minimum() {
        let stock = vec![
            entry("Rice", 1.0, 3.0, None),
            entry("Beans", 5.0, 3.0, None),
        ];
        let items = filter_stock(&stock, "low_stock", today());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Rice");
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let stock = vec![
            entry("Canned Salmon", 2.0, 0.0, None),
            entry("Rice", 1.0, 0.0, None),
        ];
        let items = filter_stock(&stock, "salmon", today());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Canned Salmon");
    }
}
