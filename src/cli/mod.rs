//! Command-line interface definition and dispatch for pantrybot.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler: `serve` runs the HTTP service, everything else is
//! a client-side convenience against a running server.

use crate::{chat, client::ApiClient, config::Config, recipes::RecipeStore, server};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Top-level CLI structure for pantrybot.
#[derive(Parser)]
#[command(name = "pantrybot", about = "A pantry-aware meal planning assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the pantrybot CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by
/// clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the pantrybot HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start an interactive chat session against a running server
    Chat {
        /// Server URL
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: Vec<String>,
        /// Server URL
        #[arg(short, long)]
        server: Option<String>,
    },
    /// List the server's available tools
    Tools {
        /// Server URL
        #[arg(short, long)]
        server: Option<String>,
    },
    /// List locally saved recipes
    Recipes,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

fn server_url(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| crate::constants::DEFAULT_SERVER_URL.to_string())
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(config).await
        }
        Commands::Chat { server } => chat::run_chat(config, server_url(server)).await,
        Commands::Ask { message, server } => {
            let message = message.join(" ");
            if message.is_empty() {
                anyhow::bail!("No message provided. Usage: pantrybot ask \"your question here\"");
            }
            let mut client = ApiClient::new(server_url(server));
            let reply = client.chat(&message).await?;
            if let Some(error) = reply.error {
                anyhow::bail!(error);
            }
            println!("{}", reply.response.unwrap_or_default());
            Ok(())
        }
        Commands::Tools { server } => {
            let client = ApiClient::new(server_url(server));
            let tools = client.tools().await?;
            println!("{}", "Available tools:".bold());
            for tool in tools {
                println!("  {} {}", "•".cyan(), tool.name.bold());
                println!("    {}", tool.description);
                if !tool.parameters.is_empty() {
                    println!("    Parameters: {}", tool.parameters.join(", ").dimmed());
                }
            }
            Ok(())
        }
        Commands::Recipes => {
            let store = RecipeStore::new(&config.recipe_dir)?;
            let recipes = store.list()?;
            println!("You have {} saved recipes:", recipes.len());
            for recipe in recipes {
                println!(
                    "  {} {} (modified: {})",
                    "•".cyan(),
                    recipe.name,
                    recipe.modified
                );
            }
            Ok(())
        }
    }
}
