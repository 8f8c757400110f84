pub mod grocy_api;
pub mod pantry;
pub mod recipe_box;
pub mod recipes;
pub mod shopping;
pub mod stock;

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::grocy::GrocyClient;
use crate::recipes::RecipeStore;
use crate::spoonacular::SpoonacularClient;

/// The result of executing a tool: a JSON payload plus an error flag. This
/// is the only shape that crosses the executor boundary — failures of any
/// kind are folded into it rather than propagated.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Value,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: Value) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: json!({"success": false, "error": message.into()}),
            is_error: true,
        }
    }
}

/// Validation and routing failures surfaced by the registry.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing required parameter '{name}'")]
    MissingParameter { name: String },
    #[error("Parameter '{name}' is not a valid {expected}")]
    InvalidParameter { name: String, expected: &'static str },
}

/// Parameter value types a tool schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Object => "object",
        }
    }
}

/// One named, typed parameter of a tool.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
        }
    }

    pub fn with_default(
        name: &'static str,
        kind: ParamKind,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// Static description of one callable tool: the single source of truth for
/// the model-facing declaration and for parameter validation.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    /// The JSON-Schema-like `input_schema` object sent to the model.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(param.kind.json_type()));
            prop.insert("description".into(), json!(param.description));
            if let Some(default) = &param.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(param.name.to_string(), Value::Object(prop));
            if param.required {
                required.push(json!(param.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Checks raw parameters against this spec: fills defaults for omitted
    /// optional parameters, rejects missing required ones, and coerces
    /// loosely-typed values (numeric strings, stringly booleans).
    pub fn validate(&self, raw: &Value) -> Result<Map<String, Value>, ToolError> {
        let raw = match raw {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => Map::new(),
        };
        let mut validated = Map::new();
        for param in &self.params {
            match raw.get(param.name) {
                Some(Value::Null) | None => {
                    if let Some(default) = &param.default {
                        validated.insert(param.name.to_string(), default.clone());
                    } else if param.required {
                        return Err(ToolError::MissingParameter {
                            name: param.name.to_string(),
                        });
                    }
                }
                Some(value) => {
                    validated.insert(param.name.to_string(), coerce(param, value)?);
                }
            }
        }
        Ok(validated)
    }
}

/// Best-effort coercion into the declared kind. A value that cannot be
/// coerced is an error, never silently dropped.
fn coerce(param: &ParamSpec, value: &Value) -> Result<Value, ToolError> {
    let invalid = || ToolError::InvalidParameter {
        name: param.name.to_string(),
        expected: param.kind.json_type(),
    };
    match param.kind {
        ParamKind::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(invalid()),
        },
        ParamKind::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| json!(f as i64))
                .ok_or_else(invalid),
            Value::String(s) => s.trim().parse::<i64>().map(|i| json!(i)).map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        ParamKind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s.trim().parse::<f64>().map(|f| json!(f)).map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        ParamKind::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Ok(json!(true)),
                "false" => Ok(json!(false)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        },
        ParamKind::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(invalid()),
        },
    }
}

/// Definition sent to the model so it knows what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// The static spec: name, description, and parameter table.
    fn spec(&self) -> &ToolSpec;

    /// Execute with validated parameters. An `Err` is folded into an
    /// error-flagged [`ToolResult`] by the registry.
    async fn execute(&self, params: Value) -> anyhow::Result<Value>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup; registration order is the
    /// order declarations are advertised in.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Produce declarations for the model, in registration order. Rebuilt
    /// on every call — the declaration is cheap to construct.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .iter()
            .map(|t| {
                let spec = t.spec();
                ToolDeclaration {
                    name: spec.name.to_string(),
                    description: spec.description.to_string(),
                    input_schema: spec.input_schema(),
                }
            })
            .collect()
    }

    /// Whether a tool of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.spec().name == name)
    }

    /// The specs of every registered tool, in registration order.
    pub fn specs(&self) -> Vec<&ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// How many tools are registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate raw parameters for the named tool.
    pub fn validate(&self, name: &str, raw: &Value) -> Result<Map<String, Value>, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.spec().name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.spec().validate(raw)
    }

    /// Validate and execute the named tool, folding every failure into the
    /// result envelope. This is the executor boundary: it never returns an
    /// error and never panics on bad input.
    pub async fn run(&self, name: &str, raw: &Value) -> ToolResult {
        let params = match self.validate(name, raw) {
            Ok(params) => params,
            Err(err) => return ToolResult::error(err.to_string()),
        };
        let Some(tool) = self.tools.iter().find(|t| t.spec().name == name) else {
            return ToolResult::error(ToolError::UnknownTool(name.to_string()).to_string());
        };
        match tool.execute(Value::Object(params)).await {
            Ok(payload) => ToolResult::success(payload),
            Err(err) => ToolResult::error(err.to_string()),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry with the full pantrybot tool set.
    pub fn with_builtins(
        grocy: Arc<GrocyClient>,
        spoonacular: Arc<SpoonacularClient>,
        recipe_store: Arc<RecipeStore>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(pantry::GetPantryItemsTool::new(Arc::clone(&grocy))));
        registry.register(Box::new(recipes::SearchRecipesByIngredientsTool::new(
            Arc::clone(&spoonacular),
        )));
        registry.register(Box::new(recipes::GetRecipeDetailsTool::new(Arc::clone(
            &spoonacular,
        ))));
        registry.register(Box::new(recipes::SearchRecipesByNameTool::new(spoonacular)));
        registry.register(Box::new(recipe_box::SaveRecipeTool::new(Arc::clone(
            &recipe_store,
        ))));
        registry.register(Box::new(recipe_box::ListRecipesTool::new(Arc::clone(
            &recipe_store,
        ))));
        registry.register(Box::new(recipe_box::GetRecipeTool::new(recipe_store)));
        registry.register(Box::new(pantry::GetProductInfoTool::new(Arc::clone(&grocy))));
        registry.register(Box::new(stock::ConsumeStockTool::new(Arc::clone(&grocy))));
        registry.register(Box::new(stock::AddStockTool::new(Arc::clone(&grocy))));
        registry.register(Box::new(shopping::AddToShoppingListTool::new(Arc::clone(
            &grocy,
        ))));
        registry.register(Box::new(shopping::GetShoppingListTool::new(Arc::clone(
            &grocy,
        ))));
        registry.register(Box::new(pantry::GetExpiringSoonTool::new(Arc::clone(&grocy))));
        registry.register(Box::new(grocy_api::GrocyApiTool::new(grocy)));
        registry
    }
}

#[cfg(test)]
mod tests;
