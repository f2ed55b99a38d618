//! Persisted entity types.
//!
//! Every record carries a `created`/`updated` timestamp pair. Six logical
//! collections: users, servers, bridges, bridge_channels, bridge_messages,
//! forwarded_messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::types::{ChannelId, GuildId, MessageId, UserId};
use crate::store::entity::Entity;

/// A chat platform user, created lazily on first observed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Optional color annotation used when rendering forwarded copies.
    pub color: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            color: None,
            created: now,
            updated: now,
        }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const FIELDS: &'static [&'static str] = &["id", "name", "color", "created", "updated"];

    fn primary_key(&self) -> Value {
        Value::from(self.id)
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}

/// A guild the bot has joined; get-or-create semantics on join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: GuildId,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Server {
    pub fn new(id: GuildId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            created: now,
            updated: now,
        }
    }
}

impl Entity for Server {
    const COLLECTION: &'static str = "servers";
    const FIELDS: &'static [&'static str] = &["id", "name", "created", "updated"];

    fn primary_key(&self) -> Value {
        Value::from(self.id)
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}

/// A named group of channels whose messages are mutually relayed.
///
/// The name is the primary key and globally unique; `channel_ids` holds the
/// member channels in join order and never contains duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bridge {
    pub name: String,
    pub creator_id: UserId,
    pub channel_ids: Vec<ChannelId>,
    /// Auto-generated opaque id.
    pub id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Bridge {
    pub fn new(name: impl Into<String>, creator_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            creator_id,
            channel_ids: Vec::new(),
            id: Uuid::new_v4().to_string(),
            created: now,
            updated: now,
        }
    }
}

impl Entity for Bridge {
    const COLLECTION: &'static str = "bridges";
    const PRIMARY_KEY: &'static str = "name";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "creator_id",
        "channel_ids",
        "id",
        "created",
        "updated",
    ];

    fn primary_key(&self) -> Value {
        Value::from(self.name.clone())
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}

/// Membership fact binding one channel to one bridge.
///
/// Keyed by the channel's platform id scoped by bridge name: the same channel
/// id may key records for different bridges, so lookups filter by both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeChannel {
    pub id: ChannelId,
    pub name: String,
    pub bridge_name: String,
    pub server_id: GuildId,
    pub server_name: String,
    pub creator_id: UserId,
    pub jump_url: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BridgeChannel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ChannelId,
        name: impl Into<String>,
        bridge_name: impl Into<String>,
        server_id: GuildId,
        server_name: impl Into<String>,
        creator_id: UserId,
        jump_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            bridge_name: bridge_name.into(),
            server_id,
            server_name: server_name.into(),
            creator_id,
            jump_url: jump_url.into(),
            created: now,
            updated: now,
        }
    }
}

impl Entity for BridgeChannel {
    const COLLECTION: &'static str = "bridge_channels";
    const UNIQUE_PRIMARY_KEY: bool = false;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "bridge_name",
        "server_id",
        "server_name",
        "creator_id",
        "jump_url",
        "created",
        "updated",
    ];

    fn primary_key(&self) -> Value {
        Value::from(self.id)
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}

/// Audit record of an original message that triggered a fan-out.
/// Written once per fan-out and never read back by the forwarding path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub id: MessageId,
    pub content: String,
    pub author_id: UserId,
    pub channel_id: ChannelId,
    pub bridge_name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BridgeMessage {
    pub fn new(
        id: MessageId,
        content: impl Into<String>,
        author_id: UserId,
        channel_id: ChannelId,
        bridge_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            content: content.into(),
            author_id,
            channel_id,
            bridge_name: bridge_name.into(),
            created: now,
            updated: now,
        }
    }
}

impl Entity for BridgeMessage {
    const COLLECTION: &'static str = "bridge_messages";
    // Duplicate audit records on retry are tolerated, not deduplicated.
    const UNIQUE_PRIMARY_KEY: bool = false;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "content",
        "author_id",
        "channel_id",
        "bridge_name",
        "created",
        "updated",
    ];

    fn primary_key(&self) -> Value {
        Value::from(self.id)
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}

/// Provenance record of one delivered copy: maps the relay-posted message id
/// back to the original message and its channel.
///
/// `original_id`/`original_channel_id` are copied forward, not re-derived, at
/// each hop, so any link of a reply chain resolves to the same original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardedMessage {
    /// The relay-posted copy's own platform message id.
    pub id: MessageId,
    /// Id of the original message.
    pub original_id: MessageId,
    /// Channel the original was posted in.
    pub original_channel_id: ChannelId,
    pub bridge_name: String,
    /// Channel this copy was delivered to.
    pub channel_id: ChannelId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ForwardedMessage {
    pub fn new(
        id: MessageId,
        original_id: MessageId,
        original_channel_id: ChannelId,
        bridge_name: impl Into<String>,
        channel_id: ChannelId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            original_id,
            original_channel_id,
            bridge_name: bridge_name.into(),
            channel_id,
            created: now,
            updated: now,
        }
    }
}

impl Entity for ForwardedMessage {
    const COLLECTION: &'static str = "forwarded_messages";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "original_id",
        "original_channel_id",
        "bridge_name",
        "channel_id",
        "created",
        "updated",
    ];

    fn primary_key(&self) -> Value {
        Value::from(self.id)
    }

    fn set_updated(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }
}
