//! Configuration loading for pantrybot.
//!
//! Settings live as TOML at the platform's XDG config path
//! (e.g. `~/.config/pantrybot/config.toml` on Linux). Environment variables
//! override file values so container deployments can configure everything
//! through the environment alone, as the upstream services expect
//! (`GROCY_API_URL`, `SPOONACULAR_API_KEY`, `CLAUDE_API_KEY`, ...).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Root configuration for pantrybot, deserialized from `config.toml`.
///
/// Fields use serde defaults so pantrybot can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Claude model identifier used for all completions.
    #[serde(default = "default_model")]
    pub model: String,
    /// Bind address for `pantrybot serve`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port for `pantrybot serve`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory where saved recipes are written.
    #[serde(default = "default_recipe_dir")]
    pub recipe_dir: PathBuf,
    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    /// Grocy instance settings.
    #[serde(default)]
    pub grocy: GrocyConfig,
    /// Spoonacular API settings.
    #[serde(default)]
    pub spoonacular: SpoonacularConfig,
}

/// Connection details for the Anthropic API.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AnthropicConfig {
    /// API key. Can also be set via `ANTHROPIC_API_KEY` or `CLAUDE_API_KEY`.
    pub api_key: Option<String>,
    /// Custom base URL (useful for proxies).
    pub base_url: Option<String>,
}

/// Connection details for the Grocy instance.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GrocyConfig {
    /// Grocy API base URL, including the `/api` suffix.
    #[serde(default = "default_grocy_url")]
    pub api_url: String,
    /// Grocy API key. Optional for unauthenticated instances.
    pub api_key: Option<String>,
}

/// Credentials for the Spoonacular recipe API.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SpoonacularConfig {
    /// API key. Recipe search tools report an error when unset.
    pub api_key: Option<String>,
}

fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

fn default_host() -> String {
    crate::constants::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    crate::constants::DEFAULT_PORT
}

fn default_recipe_dir() -> PathBuf {
    PathBuf::from(crate::constants::DEFAULT_RECIPE_DIR)
}

fn default_grocy_url() -> String {
    crate::constants::GROCY_DEFAULT_URL.to_string()
}

impl Default for GrocyConfig {
    fn default() -> Self {
        Self {
            api_url: default_grocy_url(),
            api_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            host: default_host(),
            port: default_port(),
            recipe_dir: default_recipe_dir(),
            anthropic: AnthropicConfig::default(),
            grocy: GrocyConfig::default(),
            spoonacular: SpoonacularConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config at {:?}", path))?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Returns the path to `config.toml` under the XDG config directory.
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(crate::constants::APP_NAME);
        Ok(dir.join(crate::constants::CONFIG_FILENAME))
    }

    /// Returns the cache directory, creating it if needed.
    pub fn cache_dir() -> Result<PathBuf> {
        let dir = dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join(crate::constants::APP_NAME);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache dir {:?}", dir))?;
        Ok(dir)
    }

    /// Environment variables win over file values.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("CLAUDE_MODEL") {
            self.model = v;
        }
        if let Ok(v) = std::env::var("HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("RECIPE_DIR") {
            self.recipe_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ANTHROPIC_API_KEY").or_else(|_| std::env::var("CLAUDE_API_KEY")) {
            self.anthropic.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("GROCY_API_URL") {
            self.grocy.api_url = v;
        }
        if let Ok(v) = std::env::var("GROCY_API_KEY") {
            if !v.is_empty() {
                self.grocy.api_key = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SPOONACULAR_API_KEY") {
            if !v.is_empty() {
                self.spoonacular.api_key = Some(v);
            }
        }
    }

    /// The Anthropic API key, required for `serve`.
    pub fn anthropic_api_key(&self) -> Result<&str> {
        self.anthropic
            .api_key
            .as_deref()
            .context("No Anthropic API key found. Set ANTHROPIC_API_KEY (or CLAUDE_API_KEY) or configure it in config.toml")
    }
}
