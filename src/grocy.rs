//! Grocy REST API client.
//!
//! Wraps the Grocy endpoints pantrybot needs: stock overview, product
//! lookup, stock mutation, shopping list, and the volatile (expiring /
//! missing) report, plus a generic passthrough for everything else. All
//! calls carry a bounded timeout and map remote failures to [`GrocyError`]
//! so callers never hang or see a raw transport fault.
//!
//! Free-text product names are resolved to exactly one product via
//! [`resolve_by_name`]: case-insensitive substring match, refusing to guess
//! when more than one product matches.

use reqwest::Client;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

/// Failures reported by the Grocy client.
#[derive(Debug, thiserror::Error)]
pub enum GrocyError {
    #[error("Grocy API error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Product '{0}' not found in Grocy")]
    ProductNotFound(String),
    #[error("Multiple products found: {}. Please be more specific.", candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// One entry in the Grocy stock overview (`/stock`).
#[derive(Debug, Clone, Deserialize)]
pub struct StockEntry {
    #[serde(default)]
    pub product: StockProduct,
    #[serde(default, deserialize_with = "stringly_f64")]
    pub amount_aggregated: f64,
    #[serde(default, deserialize_with = "stringly_f64")]
    pub amount_opened_aggregated: f64,
    #[serde(default)]
    pub best_before_date: Option<String>,
}

/// Product details embedded in a stock entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "stringly_f64")]
    pub min_stock_amount: f64,
}

/// A product row from `/objects/products`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "stringly_i64")]
    pub id: i64,
    pub name: String,
}

/// A shopping list row from `/objects/shopping_list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShoppingListItem {
    #[serde(default)]
    pub product_id: Option<Value>,
    #[serde(default, deserialize_with = "stringly_f64")]
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Outcome of resolving a free-text name against the product catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NotFound,
    /// More than one product matched; never auto-resolved.
    Ambiguous(Vec<String>),
    One(Product),
}

/// Case-insensitive substring match of `query` against all product names.
pub fn resolve_by_name(products: &[Product], query: &str) -> Resolution {
    let needle = query.to_lowercase();
    let matches: Vec<&Product> = products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [] => Resolution::NotFound,
        [one] => Resolution::One((*one).clone()),
        many => Resolution::Ambiguous(many.iter().map(|p| p.name.clone()).collect()),
    }
}

/// Grocy numeric fields arrive as either JSON numbers or decimal strings.
fn stringly_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| D::Error::custom("number out of range")),
        Value::String(s) => s.parse().map_err(D::Error::custom),
        Value::Null => Ok(0.0),
        other => Err(D::Error::custom(format!("expected number, got {}", other))),
    }
}

fn stringly_i64<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match Value::deserialize(de)? {
        Value::Number(n) => n.as_i64().ok_or_else(|| D::Error::custom("integer out of range")),
        Value::String(s) => s.parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected integer, got {}", other))),
    }
}

/// A configured Grocy API client.
pub struct GrocyClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GrocyClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
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

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.http.request(method, url).header("accept", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("GROCY-API-KEY", key.as_str());
        }
        req
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, GrocyError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(GrocyError::Status { status, body })
        }
    }

    /// The full stock overview.
    pub async fn stock(&self) -> Result<Vec<StockEntry>, GrocyError> {
        let resp = self.request(reqwest::Method::GET, "/stock").send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// All known products.
    pub async fn products(&self) -> Result<Vec<Product>, GrocyError> {
        let resp = self
            .request(reqwest::Method::GET, "/objects/products")
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Resolves a free-text name to exactly one product, or fails.
    pub async fn resolve_product(&self, query: &str) -> Result<Product, GrocyError> {
        let products = self.products().await?;
        match resolve_by_name(&products, query) {
            Resolution::One(product) => Ok(product),
            Resolution::NotFound => Err(GrocyError::ProductNotFound(query.to_string())),
            Resolution::Ambiguous(candidates) => Err(GrocyError::Ambiguous { candidates }),
        }
    }

    /// Consumes stock of a resolved product.
    pub async fn consume(&self, product_id: i64, amount: f64, spoiled: bool) -> Result<(), GrocyError> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/stock/products/{}/consume", product_id),
            )
            .json(&serde_json::json!({
                "amount": amount,
                "spoiled": spoiled,
                "transaction_type": "consume",
            }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Adds stock of a resolved product.
    pub async fn add(
        &self,
        product_id: i64,
        amount: f64,
        best_before_date: Option<&str>,
        price: Option<f64>,
    ) -> Result<(), GrocyError> {
        let mut body = serde_json::json!({
            "amount": amount,
            "transaction_type": "purchase",
        });
        if let Some(date) = best_before_date {
            body["best_before_date"] = Value::String(date.to_string());
        }
        if let Some(price) = price {
            body["price"] = serde_json::json!(price);
        }
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/stock/products/{}/add", product_id),
            )
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Puts a resolved product on the shopping list.
    pub async fn add_to_shopping_list(&self, product_id: i64, amount: f64) -> Result<(), GrocyError> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/stock/products/{}/add-to-shopping-list", product_id),
            )
            .json(&serde_json::json!({
                "product_id": product_id,
                "amount": amount,
            }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// The current shopping list.
    pub async fn shopping_list(&self) -> Result<Vec<ShoppingListItem>, GrocyError> {
        let resp = self
            .request(reqwest::Method::GET, "/objects/shopping_list")
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// The volatile stock report: expiring, expired, and missing products.
    pub async fn volatile(&self) -> Result<Value, GrocyError> {
        let resp = self
            .request(reqwest::Method::GET, "/stock/volatile")
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Creates a product with sane defaults and a zero-quantity stock entry
    /// so it appears in the stock overview immediately.
    pub async fn create_product(&self, name: &str) -> Result<i64, GrocyError> {
        let resp = self
            .request(reqwest::Method::POST, "/objects/products")
            .json(&serde_json::json!({
                "name": name,
                "location_id": 1,
                "qu_id_purchase": 1,
                "qu_id_stock": 1,
                "min_stock_amount": 0,
                "description": "Auto-created by PantryBot",
            }))
            .send()
            .await?;
        let created: Value = Self::check(resp).await?.json().await?;
        let product_id = created
            .get("created_object_id")
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or_default();

        let a_year_out = (chrono::Local::now() + chrono::Duration::days(365))
            .format("%Y-%m-%d")
            .to_string();
        self.add(product_id, 0.0, Some(&a_year_out), Some(0.0)).await?;
        Ok(product_id)
    }

    /// Generic passthrough for any Grocy endpoint. Remote error statuses are
    /// normalized to [`GrocyError::Status`] like every other call.
    pub async fn raw(
        &self,
        endpoint: &str,
        method: &str,
        body: Option<&Value>,
    ) -> Result<Value, GrocyError> {
        let method = match method.to_uppercase().as_str() {
            "GET" => reqwest::Method::GET,
            "POST" => reqwest::Method::POST,
            "PUT" => reqwest::Method::PUT,
            "DELETE" => reqwest::Method::DELETE,
            other => return Err(GrocyError::UnsupportedMethod(other.to_string())),
        };
        let mut req = self.request(method, endpoint);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = Self::check(req.send().await?).await?;
        let text = resp.text().await?;
        if text.is_empty() {
            Ok(serde_json::json!({"success": true}))
        } else {
            Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn resolve_is_case_insensitive_substring() {
        let products = vec![product(1, "Canned Salmon"), product(2, "Rice")];
        match resolve_by_name(&products, "canned salmon") {
            Resolution::One(p) => assert_eq!(p.name, "Canned Salmon"),
            other => panic!("expected unique match, got {:?}", other),
        }
    }

    #[test]
    fn resolve_refuses_ambiguity() {
        let products = vec![product(1, "Salmon"), product(2, "Canned Salmon")];
        match resolve_by_name(&products, "salmon") {
            Resolution::Ambiguous(names) => {
                assert_eq!(names, vec!["Salmon".to_string(), "Canned Salmon".to_string()]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn resolve_reports_not_found() {
        let products = vec![product(1, "Rice")];
        assert_eq!(resolve_by_name(&products, "salmon"), Resolution::NotFound);
    }

    #[test]
    fn stock_entry_accepts_stringly_numbers() {
        let entry: StockEntry = serde_json::from_value(serde_json::json!({
            "product": {"name": "Rice", "min_stock_amount": "2"},
            "amount_aggregated": "3.5",
            "best_before_date": "2026-01-01",
        }))
        .unwrap();
        assert_eq!(entry.amount_aggregated, 3.5);
        assert_eq!(entry.product.min_stock_amount, 2.0);
    }

    #[test]
    fn ambiguity_error_lists_candidates() {
        let err = GrocyError::Ambiguous {
            candidates: vec!["Salmon".into(), "Canned Salmon".into()],
        };
        assert_eq!(
            err.to_string(),
            "Multiple products found: Salmon, Canned Salmon. Please be more specific."
        );
    }
}
