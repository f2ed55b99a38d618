//! Ferryman - Discord channel bridge
//!
//! A bot that relays messages between groups of Discord channels: a message
//! posted in one member channel of a bridge is copied to every other member,
//! and replies to the copies are routed back to the original channel.

mod bridge;
mod common;
mod config;
mod discord;
mod store;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};

use bridge::Relay;
use config::{env::get_config_path, load_and_validate};
use discord::{build_client, DiscordSender};
use store::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Ferryman v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Command prefix: {}", config.command_prefix());

    // Wire the relay together
    let db = Database::in_memory();
    let sender = Arc::new(DiscordSender::new());
    let relay = Arc::new(Relay::new(&db, sender.clone()));

    info!("Starting Discord bot...");
    let mut client = build_client(
        &config.discord.token,
        relay,
        sender,
        config.command_prefix().to_string(),
    )
    .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received - disconnecting...");
            shard_manager.shutdown_all().await;
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
