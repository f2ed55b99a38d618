//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Prefix for bridge management commands. Defaults to "!".
    pub command_prefix: Option<String>,
}

impl Config {
    pub fn command_prefix(&self) -> &str {
        self.discord.command_prefix.as_deref().unwrap_or("!")
    }
}
