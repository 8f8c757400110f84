//! Entry point for pantrybot, a pantry-aware meal planning assistant.
//!
//! This binary loads environment variables, parses CLI arguments via
//! [`cli`], and dispatches to the appropriate subcommand handler.

mod agent;
mod chat;
mod cli;
mod client;
mod config;
mod constants;
mod grocy;
mod message;
mod provider;
mod recipes;
mod server;
mod spoonacular;
mod store;
mod tools;

use anyhow::Result;

/// Runs the pantrybot CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches the chosen
/// subcommand via [`cli::run`].
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    cli::run(cli).await
}
