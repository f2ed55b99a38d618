//! Discord bot commands (!bridge create/add/remove/list/show).
//!
//! A thin layer over the bridge registry: argument parsing and response
//! rendering only. Every command either confirms or explains; there is no
//! silent failure.

use std::sync::Arc;

use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{debug, info};

use crate::bridge::{ChannelInfo, Relay};
use crate::common::error::RegistryError;

/// Command handler for the bridge management surface.
pub struct CommandHandler {
    relay: Arc<Relay>,
    prefix: String,
}

impl CommandHandler {
    pub fn new(relay: Arc<Relay>, prefix: String) -> Self {
        Self { relay, prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse and execute a command from Discord.
    ///
    /// Returns `true` if the message was a bridge command, `false` otherwise.
    pub async fn handle_command(
        &self,
        ctx: &Context,
        msg: &Message,
        content: &str,
    ) -> anyhow::Result<bool> {
        if content.len() > 100 {
            return Ok(false);
        }
        let Some(rest) = content.strip_prefix(self.prefix.as_str()) else {
            return Ok(false);
        };

        let mut parts = rest.split_whitespace();
        if parts.next() != Some("bridge") {
            return Ok(false);
        }
        let subcommand = parts.next().unwrap_or("help").to_lowercase();
        let arg = parts.next().map(str::to_string);

        debug!(command = %subcommand, ?arg, "Processing bridge command");

        match subcommand.as_str() {
            "create" => self.handle_create(ctx, msg, arg).await?,
            "add" => self.handle_add(ctx, msg, arg).await?,
            "remove" => self.handle_remove(ctx, msg, arg).await?,
            "list" => self.handle_list(ctx, msg).await?,
            "show" => self.handle_show(ctx, msg, arg).await?,
            "help" => self.handle_help(ctx, msg).await?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Handle !bridge create <name>.
    async fn handle_create(
        &self,
        ctx: &Context,
        msg: &Message,
        arg: Option<String>,
    ) -> anyhow::Result<()> {
        let Some(name) = arg else {
            msg.channel_id
                .say(&ctx.http, format!("Usage: `{}bridge create <name>`", self.prefix))
                .await?;
            return Ok(());
        };

        info!("!bridge create '{}' from {}", name, msg.author.name);
        let reply = match self
            .relay
            .registry()
            .create_bridge(&name, msg.author.id.get())
            .await
        {
            Ok(_) => format!(
                "Created bridge '{}'. Run `{}bridge add {}` in each channel to connect it.",
                name, self.prefix, name
            ),
            Err(err) => rejection(&err),
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridge add <name> — adds the current channel to the bridge.
    async fn handle_add(
        &self,
        ctx: &Context,
        msg: &Message,
        arg: Option<String>,
    ) -> anyhow::Result<()> {
        let Some(name) = arg else {
            msg.channel_id
                .say(&ctx.http, format!("Usage: `{}bridge add <name>`", self.prefix))
                .await?;
            return Ok(());
        };

        let channel_name = msg.channel_id.name(ctx).await.unwrap_or_default();
        let server_name = msg
            .guild(&ctx.cache)
            .map(|guild| guild.name.clone())
            .unwrap_or_default();

        let info = ChannelInfo {
            id: msg.channel_id.get(),
            name: channel_name.clone(),
            server_id: msg.guild_id.map(|id| id.get()).unwrap_or_default(),
            server_name,
            jump_url: msg.link(),
        };

        info!("!bridge add '{}' from #{}", name, channel_name);
        let reply = match self
            .relay
            .registry()
            .add_channel(&name, msg.author.id.get(), info)
            .await
        {
            Ok(bridge) => format!(
                "Added #{} to bridge '{}' ({} member channels).",
                channel_name,
                name,
                bridge.channel_ids.len()
            ),
            Err(err) => rejection(&err),
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridge remove <name> — removes the current channel.
    async fn handle_remove(
        &self,
        ctx: &Context,
        msg: &Message,
        arg: Option<String>,
    ) -> anyhow::Result<()> {
        let Some(name) = arg else {
            msg.channel_id
                .say(&ctx.http, format!("Usage: `{}bridge remove <name>`", self.prefix))
                .await?;
            return Ok(());
        };

        let reply = match self
            .relay
            .registry()
            .remove_channel(&name, msg.channel_id.get(), msg.author.id.get())
            .await
        {
            Ok(bridge) => format!(
                "Removed this channel from bridge '{}' ({} member channels remain).",
                name,
                bridge.channel_ids.len()
            ),
            Err(err) => rejection(&err),
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridge list — bridges owned by the caller.
    async fn handle_list(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let reply = match self.relay.registry().list_bridges(msg.author.id.get()).await {
            Ok(bridges) if bridges.is_empty() => "You have no bridges.".to_string(),
            Ok(bridges) => {
                let lines: Vec<String> = bridges
                    .iter()
                    .map(|b| format!("• `{}` — {} channels", b.name, b.channel_ids.len()))
                    .collect();
                format!("**Your bridges:**\n{}", lines.join("\n"))
            }
            Err(err) => rejection(&err),
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridge show <name> — member channels of a bridge.
    async fn handle_show(
        &self,
        ctx: &Context,
        msg: &Message,
        arg: Option<String>,
    ) -> anyhow::Result<()> {
        let Some(name) = arg else {
            msg.channel_id
                .say(&ctx.http, format!("Usage: `{}bridge show <name>`", self.prefix))
                .await?;
            return Ok(());
        };

        let reply = match self.relay.registry().channels_of(&name).await {
            Ok(channels) if channels.is_empty() => {
                format!("Bridge '{}' has no member channels yet.", name)
            }
            Ok(channels) => {
                let lines: Vec<String> = channels
                    .iter()
                    .map(|c| format!("• #{} ({})", c.name, c.server_name))
                    .collect();
                format!("**Bridge '{}':**\n{}", name, lines.join("\n"))
            }
            Err(err) => rejection(&err),
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Handle !bridge help.
    async fn handle_help(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let p = &self.prefix;
        let help_text = format!(
            r#"**Bridge commands:**
• `{p}bridge create <name>` - Create a bridge you own
• `{p}bridge add <name>` - Add this channel to a bridge
• `{p}bridge remove <name>` - Remove this channel from a bridge
• `{p}bridge list` - List your bridges
• `{p}bridge show <name>` - Show a bridge's member channels"#
        );
        msg.channel_id.say(&ctx.http, help_text).await?;
        Ok(())
    }
}

/// Plain rejection text for a failed command.
fn rejection(err: &RegistryError) -> String {
    match err {
        RegistryError::Store(err) => format!("Something went wrong, try again later ({err})."),
        other => format!("{other}."),
    }
}
