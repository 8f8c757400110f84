use super::*;
use serde_json::json;

fn test_registry(recipe_dir: &std::path::Path) -> ToolRegistry {
    let grocy = Arc::new(GrocyClient::new("http://localhost:1/api", None));
    let spoonacular = Arc::new(SpoonacularClient::new(None));
    let store = Arc::new(RecipeStore::new(recipe_dir).unwrap());
    ToolRegistry::with_builtins(grocy, spoonacular, store)
}

#[tokio::test]
async fn registry_with_builtins_advertises_all_tools() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    assert_eq!(registry.len(), 14);
    assert!(!registry.is_empty());

    let decls = registry.declarations();
    assert_eq!(decls.len(), 14);
    assert_eq!(decls[0].name, "get_pantry_items");
    assert!(registry.contains("consume_stock"));
    assert!(registry.contains("grocy_api"));
    assert!(!registry.contains("nonexistent_tool"));

    // Declarations carry the JSON-Schema-like input shape.
    let schema = &decls[0].input_schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["category"]["type"], "string");
    assert_eq!(schema["properties"]["category"]["default"], "all");
}

#[tokio::test]
async fn validate_fills_declared_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let params = registry
        .validate("add_to_shopping_list", &json!({"product_name": "milk"}))
        .unwrap();
    assert_eq!(params["amount"], json!(1));
    assert_eq!(params["product_name"], json!("milk"));
}

#[tokio::test]
async fn validate_rejects_missing_required() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let err = registry
        .validate("consume_stock", &json!({"product_name": "milk"}))
        .unwrap_err();
    assert!(matches!(err, ToolError::MissingParameter { ref name } if name == "amount"));
}

#[tokio::test]
async fn validate_rejects_unknown_tool() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let err = registry.validate("launch_rocket", &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "Unknown tool: launch_rocket");
}

#[tokio::test]
async fn validate_coerces_numeric_strings() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());

    let params = registry
        .validate("get_recipe_details", &json!({"recipe_id": "42"}))
        .unwrap();
    assert_eq!(params["recipe_id"], json!(42));

    let params = registry
        .validate(
            "consume_stock",
            &json!({"product_name": "milk", "amount": "1.5", "spoiled": "true"}),
        )
        .unwrap();
    assert_eq!(params["amount"], json!(1.5));
    assert_eq!(params["spoiled"], json!(true));

    let err = registry
        .validate("consume_stock", &json!({"product_name": "milk", "amount": "abc"}))
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameter { .. }));
}

#[tokio::test]
async fn run_folds_unknown_tool_into_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let result = registry.run("nonexistent_tool", &json!({})).await;
    assert!(result.is_error);
    assert_eq!(
        result.content["error"],
        json!("Unknown tool: nonexistent_tool")
    );
}

#[tokio::test]
async fn run_folds_validation_failure_into_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let result = registry.run("save_recipe", &json!({"recipe_name": "chili"})).await;
    assert!(result.is_error);
    assert!(result.content["error"]
        .as_str()
        .unwrap()
        .contains("recipe_content"));
}

#[tokio::test]
async fn run_executes_recipe_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());

    let saved = registry
        .run(
            "save_recipe",
            &json!({"recipe_name": "Salmon Cakes", "recipe_content": "Mix and fry."}),
        )
        .await;
    assert!(!saved.is_error);
    assert_eq!(saved.content["success"], json!(true));

    let fetched = registry
        .run("get_recipe", &json!({"recipe_name": "salmon cakes"}))
        .await;
    assert!(!fetched.is_error);
    assert!(fetched.content["content"]
        .as_str()
        .unwrap()
        .contains("Mix and fry."));

    let listing = registry.run("list_recipes", &json!({})).await;
    assert_eq!(listing.content["total_recipes"], json!(1));
}

#[tokio::test]
async fn run_reports_missing_recipe_in_payload() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let result = registry
        .run("get_recipe", &json!({"recipe_name": "nothing"}))
        .await;
    // Not-found is a payload the model reasons about, not an executor fault.
    assert!(!result.is_error);
    assert_eq!(result.content["success"], json!(false));
}

#[tokio::test]
async fn run_converts_adapter_failure_to_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    // Port 1 refuses connections, so the Grocy call fails fast.
    let result = registry.run("get_shopping_list", &json!({})).await;
    assert!(result.is_error);
    assert!(result.content["error"].as_str().is_some());
}

#[tokio::test]
async fn recipe_search_without_api_key_is_an_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let registry = test_registry(dir.path());
    let result = registry
        .run("search_recipes_by_ingredients", &json!({"ingredients": "salmon"}))
        .await;
    assert!(result.is_error);
    assert_eq!(
        result.content["error"],
        json!("Spoonacular API key not configured")
    );
}
