//! Interactive chat REPL for pantrybot.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Messages go to a running pantrybot
//! server over HTTP; the server owns the transcript, so the REPL only has
//! to carry the conversation id between turns.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::client::ApiClient;
use crate::config::Config;
use crate::recipes::RecipeStore;

/// Runs the interactive chat REPL against `server_url`.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly
/// - Readline history is persisted under the cache directory
pub async fn run_chat(config: Config, server_url: String) -> Result<()> {
    let mut client = ApiClient::new(server_url);

    println!(
        "{} [server: {}]",
        "pantrybot chat".bold().cyan(),
        client.server_url().yellow(),
    );
    println!("Commands: /tools /recipes /new /help /quit — or just type your message. (Ctrl+D to exit)");
    println!();

    match client.info().await {
        Ok(info) => {
            println!("{} {}", "connected:".green(), info.service);
            println!("  Grocy: {}", info.grocy_url);
            println!("  Model: {}", info.ai_model);
            println!("  Recipes: {}", info.recipe_dir);
            println!();
        }
        Err(err) => {
            println!("{} {}", "warning:".yellow(), err);
            println!("Continuing anyway, but requests may fail...");
            println!();
        }
    }

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if line.starts_with('/') {
                    match line.as_str() {
                        "/quit" | "/exit" | "/q" => break,
                        "/new" => {
                            client.reset_conversation();
                            println!("{}", "Started new conversation".cyan());
                            continue;
                        }
                        "/tools" => {
                            print_tools(&client).await;
                            continue;
                        }
                        "/recipes" => {
                            print_recipes(&config);
                            continue;
                        }
                        "/help" => {
                            println!("Ask questions naturally, for example:");
                            println!("  - What's in my pantry?");
                            println!("  - What can I make with beef tonight?");
                            println!("  - Show me my saved recipes");
                            println!("  - Save this recipe as 'chili'");
                            continue;
                        }
                        other => {
                            println!("{} Unknown command: {}", "?".yellow(), other);
                            continue;
                        }
                    }
                }

                println!("{}", "thinking...".dimmed());
                match client.chat(&line).await {
                    Ok(reply) => {
                        if let Some(error) = reply.error {
                            println!("{} {}", "error:".red(), error);
                        } else {
                            println!();
                            println!("{}", reply.response.unwrap_or_default());
                            if reply.tool_used {
                                println!("{}", "(used pantry tools)".dimmed());
                            }
                            println!();
                        }
                    }
                    Err(err) => {
                        println!("{} {}", "error:".red(), err);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("{} {}", "error:".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    println!("goodbye.");
    Ok(())
}

async fn print_tools(client: &ApiClient) {
    match client.tools().await {
        Ok(tools) => {
            println!();
            println!("{}", "Available tools:".bold());
            for tool in tools {
                println!("  {} {}", "•".cyan(), tool.name.bold());
                println!("    {}", tool.description);
                if !tool.parameters.is_empty() {
                    println!("    Parameters: {}", tool.parameters.join(", ").dimmed());
                }
            }
            println!();
        }
        Err(err) => println!("{} {}", "error:".red(), err),
    }
}

fn print_recipes(config: &Config) {
    let store = match RecipeStore::new(&config.recipe_dir) {
        Ok(store) => store,
        Err(err) => {
            println!("{} {}", "error:".red(), err);
            return;
        }
    };
    match store.list() {
        Ok(recipes) => {
            println!();
            println!("You have {} saved recipes:", recipes.len());
            for recipe in recipes {
                println!("  {} {} (modified: {})", "•".cyan(), recipe.name, recipe.modified);
            }
            println!();
        }
        Err(err) => println!("{} {}", "error:".red(), err),
    }
}
