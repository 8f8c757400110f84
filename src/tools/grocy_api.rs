//! Generic Grocy API passthrough tool.
//!
//! Lets the model reach endpoints without a purpose-built tool (chores,
//! tasks, batteries, locations, units, ...). Unlike the upstream service's
//! ad hoc error JSON, remote failures are normalized to the same error
//! envelope every other tool uses; successful payloads pass through
//! verbatim for the model to interpret.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{ParamKind, ParamSpec, Tool, ToolSpec};
use crate::grocy::GrocyClient;

pub struct GrocyApiTool {
    grocy: Arc<GrocyClient>,
    spec: ToolSpec,
}

impl GrocyApiTool {
    pub fn new(grocy: Arc<GrocyClient>) -> Self {
        Self {
            grocy,
            spec: ToolSpec {
                name: "grocy_api",
                description: "Generic Grocy API access for any endpoint. Common endpoints: \
                              /stock, /objects/chores, /chores/{id}/execute, /objects/batteries, \
                              /objects/tasks, /tasks/{id}/complete, /objects/products, \
                              /objects/locations, /objects/quantity_units",
                params: vec![
                    ParamSpec::required(
                        "endpoint",
                        ParamKind::String,
                        "API endpoint (e.g., '/objects/chores')",
                    ),
                    ParamSpec::with_default(
                        "method",
                        ParamKind::String,
                        "HTTP method (GET, POST, PUT, DELETE)",
                        json!("GET"),
                    ),
                    ParamSpec::optional("body", ParamKind::Object, "Optional request body for POST/PUT"),
                ],
            },
        }
    }
}

#[derive(Deserialize)]
struct GrocyApiInput {
    endpoint: String,
    method: String,
    body: Option<Value>,
}

#[async_trait::async_trait]
impl Tool for GrocyApiTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let input: GrocyApiInput = serde_json::from_value(params)?;
        info!(endpoint = %input.endpoint, method = %input.method, "raw Grocy API call");
        let payload = self
            .grocy
            .raw(&input.endpoint, &input.method, input.body.as_ref())
            .await?;
        Ok(payload)
    }
}
