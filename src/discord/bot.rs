//! Discord client construction.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serenity::prelude::*;

use crate::bridge::Relay;
use crate::discord::handler::BridgeHandler;
use crate::discord::sender::DiscordSender;

/// Build the gateway client with the relay wired in as its event handler.
pub async fn build_client(
    token: &str,
    relay: Arc<Relay>,
    sender: Arc<DiscordSender>,
    command_prefix: String,
) -> Result<Client> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(token, intents)
        .event_handler(BridgeHandler::new(relay, sender, command_prefix))
        .await
        .context("Failed to create Discord client")
}
