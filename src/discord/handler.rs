//! Discord gateway event handling.
//!
//! Turns gateway events into relay calls: message-created events are built
//! into gateway-independent [`InboundMessage`]s and dispatched, guild joins
//! are recorded, and the HTTP client is handed to the sender on ready.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::bridge::Relay;
use crate::common::types::InboundMessage;
use crate::discord::commands::CommandHandler;
use crate::discord::sender::DiscordSender;

/// Discord event handler.
pub struct BridgeHandler {
    relay: Arc<Relay>,
    sender: Arc<DiscordSender>,
    commands: CommandHandler,
}

impl BridgeHandler {
    pub fn new(relay: Arc<Relay>, sender: Arc<DiscordSender>, command_prefix: String) -> Self {
        Self {
            commands: CommandHandler::new(relay.clone(), command_prefix),
            relay,
            sender,
        }
    }

    /// Build the gateway-independent inbound event from a Discord message.
    async fn to_inbound(ctx: &Context, msg: &Message) -> InboundMessage {
        let (guild_name, guild_icon_url) = {
            msg.guild(&ctx.cache)
                .map(|guild| (guild.name.clone(), guild.icon_url()))
                .unwrap_or_default()
        };

        let channel_name = msg.channel_id.name(ctx).await.unwrap_or_default();

        // Effective display name: nickname if set.
        let author_name = msg
            .member
            .as_ref()
            .and_then(|m| m.nick.clone())
            .unwrap_or_else(|| msg.author.name.clone());

        // Attachments travel as plain links appended to the text.
        let mut content = msg.content.trim().to_string();
        for attachment in &msg.attachments {
            if !content.is_empty() {
                content.push(' ');
            }
            content.push_str(&attachment.url);
        }

        InboundMessage {
            id: msg.id.get(),
            author_id: msg.author.id.get(),
            author_name,
            author_avatar_url: msg.author.avatar_url(),
            channel_id: msg.channel_id.get(),
            channel_name,
            guild_id: msg.guild_id.map(|id| id.get()).unwrap_or_default(),
            guild_name,
            guild_icon_url,
            content,
            jump_url: msg.link(),
            reply_target_id: msg
                .message_reference
                .as_ref()
                .and_then(|reference| reference.message_id)
                .map(|id| id.get()),
        }
    }
}

#[async_trait]
impl EventHandler for BridgeHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        self.sender.attach(ctx.http.clone());
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        match self.relay.handle_guild_joined(guild.id.get(), &guild.name).await {
            Ok(server) => info!(guild = %server.name, "Tracking server"),
            Err(err) => error!("Failed to record server '{}': {}", guild.name, err),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore our own messages and other bots.
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }
        if msg.author.bot {
            return;
        }

        // Only guild messages participate in bridges.
        if msg.guild_id.is_none() {
            return;
        }

        let content = msg.content.trim();
        if content.is_empty() && msg.attachments.is_empty() {
            return;
        }

        // Check for commands first.
        if content.starts_with(self.commands.prefix()) {
            match self.commands.handle_command(&ctx, &msg, content).await {
                Ok(true) => return, // Command was handled
                Ok(false) => {}     // Not a known command, continue
                Err(err) => {
                    error!("Command handler error: {}", err);
                    return;
                }
            }
        }

        let inbound = Self::to_inbound(&ctx, &msg).await;
        match self.relay.handle_message(&inbound).await {
            Ok(outcome) => debug!(message_id = inbound.id, ?outcome, "Processed message"),
            Err(err) => error!(message_id = inbound.id, "Failed to process message: {}", err),
        }
    }
}
