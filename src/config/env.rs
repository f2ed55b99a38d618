//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `FERRYMAN_DISCORD_TOKEN` - Discord bot token
//! - `FERRYMAN_DISCORD_COMMAND_PREFIX` - Command prefix
//! - `FERRYMAN_CONFIG` - Path to the configuration file

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "FERRYMAN";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like the bot token to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }

    if let Ok(prefix) = env::var(format!("{}_DISCORD_COMMAND_PREFIX", ENV_PREFIX)) {
        config.discord.command_prefix = Some(prefix);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `FERRYMAN_CONFIG`, otherwise returns "ferryman.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "ferryman.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DiscordConfig;

    fn make_test_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "original_token".to_string(),
                command_prefix: None,
            },
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "FERRYMAN");
    }

    #[test]
    fn test_get_config_path_default() {
        // Clear the env var first
        env::remove_var("FERRYMAN_CONFIG");
        assert_eq!(get_config_path(), "ferryman.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("FERRYMAN_DISCORD_TOKEN");
        env::remove_var("FERRYMAN_DISCORD_COMMAND_PREFIX");

        let config = make_test_config();
        let result = apply_env_overrides(config);

        // Should remain unchanged
        assert_eq!(result.discord.token, "original_token");
        assert!(result.discord.command_prefix.is_none());
    }
}
