//! Error types for the application.

use thiserror::Error;

use crate::common::types::{ChannelId, UserId};

/// Persistence-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate primary key in '{collection}': {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    #[error("No {collection} record found with {field}={key}")]
    NotFound {
        collection: &'static str,
        field: &'static str,
        key: String,
    },

    #[error("Unknown field '{field}' in filter for '{collection}'")]
    UnknownField {
        collection: &'static str,
        field: String,
    },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Failed to encode or decode record: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Bridge membership invariant violations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No bridge named '{name}'")]
    BridgeNotFound { name: String },

    #[error("A bridge named '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Channel {channel_id} is already a member of bridge '{bridge}'")]
    AlreadyMember {
        bridge: String,
        channel_id: ChannelId,
    },

    #[error("Channel {channel_id} is not a member of bridge '{bridge}'")]
    NotMember {
        bridge: String,
        channel_id: ChannelId,
    },

    #[error("User {requester_id} does not own bridge '{bridge}'")]
    Forbidden {
        bridge: String,
        requester_id: UserId,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures reported by the outbound message-send capability.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Channel not found: {channel_id}")]
    ChannelNotFound { channel_id: ChannelId },

    #[error("Failed to send to channel {channel_id}: {message}")]
    SendFailed {
        channel_id: ChannelId,
        message: String,
    },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}
