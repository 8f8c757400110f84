//! HTTP service assembly for `pantrybot serve`.
//!
//! Builds the adapters, the tool registry, and the axum router, then serves
//! the endpoints: `/` (health), `/chat`, `/tools/execute`, `/tools/list`,
//! and the OpenAI-compatible `/v1/models` and `/v1/chat/completions`.

mod dto;
mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::grocy::GrocyClient;
use crate::provider::{AnthropicClient, ModelClient};
use crate::recipes::RecipeStore;
use crate::spoonacular::SpoonacularClient;
use crate::store::ConversationStore;
use crate::tools::ToolRegistry;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub tools: Arc<ToolRegistry>,
    pub store: Arc<ConversationStore>,
    pub grocy_url: String,
    pub model_name: String,
    pub recipe_dir: String,
}

/// Builds the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/tools/execute", post(handlers::execute_tool))
        .route("/tools/list", get(handlers::list_tools))
        .route("/v1/models", get(handlers::openai_models))
        .route("/v1/chat/completions", post(handlers::openai_completions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the HTTP server until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantrybot=info,tower_http=info".into()),
        )
        .init();

    let model = AnthropicClient::from_config(&config)?;
    let model_name = model.model().to_string();

    let grocy = Arc::new(GrocyClient::new(
        config.grocy.api_url.clone(),
        config.grocy.api_key.clone(),
    ));
    let spoonacular = Arc::new(SpoonacularClient::new(config.spoonacular.api_key.clone()));
    let recipe_store = Arc::new(RecipeStore::new(&config.recipe_dir)?);

    let state = AppState {
        model: Arc::new(model),
        tools: Arc::new(ToolRegistry::with_builtins(
            grocy,
            spoonacular,
            Arc::clone(&recipe_store),
        )),
        store: Arc::new(ConversationStore::new()),
        grocy_url: config.grocy.api_url.clone(),
        model_name,
        recipe_dir: recipe_store.dir().display().to_string(),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, grocy = %state.grocy_url, model = %state.model_name, "pantrybot listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
