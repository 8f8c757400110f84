//! Centralized constants for pantrybot.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "pantrybot";

/// Default Claude model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Maximum tokens for model completions.
pub const MAX_TOKENS: u64 = 4096;

/// Maximum number of model/tool rounds per chat request.
pub const MAX_TOOL_ROUNDS: usize = 10;

/// Final assistant reply when the round ceiling is hit while tools are
/// still being requested.
pub const EXHAUSTED_REPLY: &str =
    "I apologize, but I encountered an issue processing your request. Please try again.";

/// Conversation id used when the caller does not supply one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

// --- Server defaults ---

/// Default bind address for `pantrybot serve`.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for `pantrybot serve`.
pub const DEFAULT_PORT: u16 = 8000;

/// Server URL the CLI client targets when none is given.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Model id advertised at the OpenAI-compatible endpoints.
pub const OPENAI_MODEL_ID: &str = "pantrybot-claude";

// --- Remote API defaults ---

/// Base URL for the Anthropic Messages API.
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Default Grocy API base URL.
pub const GROCY_DEFAULT_URL: &str = "http://localhost:9283/api";

/// Base URL for the Spoonacular recipe API.
pub const SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

/// Per-call timeout for Grocy and Spoonacular requests, in seconds.
pub const ADAPTER_TIMEOUT_SECS: u64 = 10;

/// Timeout for model API calls, in seconds.
pub const MODEL_TIMEOUT_SECS: u64 = 120;

/// Timeout for CLI client chat requests, in seconds.
pub const CLIENT_CHAT_TIMEOUT_SECS: u64 = 300;

// --- Pantry defaults ---

/// Days ahead that count as "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Default recipe directory when none is configured.
pub const DEFAULT_RECIPE_DIR: &str = "/app/recipes";

// --- System prompts ---

/// System prompt for the stateful `/chat` endpoint.
pub const CHAT_SYSTEM_PROMPT: &str = "\
You are PantryBot, a helpful cooking assistant for a busy family.

You have access to:
- The family's real pantry inventory (via Grocy)
- Recipe search (via Spoonacular API)
- Saved family recipes

When someone asks \"What can I make for supper?\":
1. Check their pantry to see what's available
2. Search for 3 practical, family-friendly recipes using those ingredients
3. Present the options clearly and ask which they'd like
4. When they choose, get the full recipe details
5. Offer to save recipes they like

Be practical, helpful, and conversational. This tool helps a busy \
stay-at-home mom plan meals easily.";

/// System prompt for the OpenAI-compatible endpoint, with stricter
/// formatting guidance for chat frontends.
pub const OPENAI_SYSTEM_PROMPT: &str = "\
You are PantryBot, a helpful cooking assistant for a busy stay-at-home mom.

You have access to:
- The family's real pantry inventory (via Grocy)
- Recipe search (via Spoonacular API)
- Saved family recipes

CRITICAL INSTRUCTIONS:
When someone asks about recipes or \"what can I make?\":
1. Use get_pantry_items to check what they have available
2. Use search_recipes_by_ingredients ONCE with 3-5 main ingredients to find recipe options
   (Don't do multiple searches - just pick the key ingredients like \"salmon, rice, tomatoes\")
3. IMMEDIATELY present all recipe options with:
   - Recipe title
   - Match percentage (e.g., \"92% match\" - this shows how much of the recipe they can make with current ingredients)
   - What missing ingredients they'd need to buy (if any)
   - Brief description of why it's a good choice
4. Sort your presentation by match percentage (highest first) so best options are at the top
5. When they choose one, use get_recipe_details to get the full recipe with instructions
6. Present the complete recipe clearly (ingredients + step-by-step instructions)

The match percentage helps users decide if they can make it NOW or need to shop first.

Be warm, practical, and conversational. This is for busy meal planning, so \
keep it simple and helpful.";
