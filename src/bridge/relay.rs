//! Inbound event dispatch.
//!
//! One inbound chat event runs one logical task to completion: lazily record
//! the author, try the reply resolver, and fall through to fan-out when the
//! event is not a reply to a tracked forwarded copy.

use std::sync::Arc;

use crate::common::error::StoreError;
use crate::common::types::{GuildId, InboundMessage};
use crate::store::{Database, Server, Store, User};

use super::forward::{FanoutReport, ForwardingEngine};
use super::registry::BridgeRegistry;
use super::reply::{ReplyDelivery, ReplyResolver};
use super::MessageSender;

/// How one inbound message was processed.
#[derive(Debug)]
pub enum RelayOutcome {
    /// The message replied to a forwarded copy and was routed back to the
    /// original channel.
    Replied(ReplyDelivery),
    /// The message was fanned out; the batch is empty when the origin
    /// channel is not bridged.
    Forwarded(Vec<FanoutReport>),
}

/// Ties the registry, forwarding engine, and reply resolver together behind
/// one entrypoint per gateway event.
pub struct Relay {
    users: Store<User>,
    servers: Store<Server>,
    registry: BridgeRegistry,
    engine: ForwardingEngine,
    resolver: ReplyResolver,
}

impl Relay {
    pub fn new(db: &Database, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            users: db.users.clone(),
            servers: db.servers.clone(),
            registry: BridgeRegistry::new(db),
            engine: ForwardingEngine::new(db, sender.clone()),
            resolver: ReplyResolver::new(db, sender),
        }
    }

    /// The registry, for the command surface.
    pub fn registry(&self) -> &BridgeRegistry {
        &self.registry
    }

    /// Process one message-created event to completion.
    pub async fn handle_message(&self, msg: &InboundMessage) -> Result<RelayOutcome, StoreError> {
        // First sighting of a user creates its record; never updated after.
        self.users
            .get_or_create(User::new(msg.author_id, msg.author_name.as_str()))
            .await?;

        if let Some(reply) = self.resolver.resolve(msg).await? {
            return Ok(RelayOutcome::Replied(reply));
        }

        let reports = self.engine.forward(msg).await?;
        Ok(RelayOutcome::Forwarded(reports))
    }

    /// Record a guild the bot joined; idempotent.
    pub async fn handle_guild_joined(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Server, StoreError> {
        self.servers.get_or_create(Server::new(guild_id, name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::registry::ChannelInfo;
    use crate::bridge::testing::{inbound, inbound_reply, RecordingSender};
    use crate::common::types::ChannelId;

    fn channel_info(id: ChannelId) -> ChannelInfo {
        ChannelInfo {
            id,
            name: format!("channel-{id}"),
            server_id: 10,
            server_name: "Guild A".to_string(),
            jump_url: format!("https://discord.com/channels/10/{id}"),
        }
    }

    async fn relay_with_bridge(
        db: &Database,
        sender: Arc<RecordingSender>,
        channels: &[ChannelId],
    ) -> Relay {
        let relay = Relay::new(db, sender);
        relay.registry().create_bridge("general", 1).await.unwrap();
        for &id in channels {
            relay
                .registry()
                .add_channel("general", 1, channel_info(id))
                .await
                .unwrap();
        }
        relay
    }

    #[tokio::test]
    async fn test_end_to_end_forward_then_reply() {
        // Bridge "general" has channels [A=100, C=200, D=300].
        let db = Database::in_memory();
        let sender = Arc::new(RecordingSender::new(1000));
        let relay = relay_with_bridge(&db, sender.clone(), &[100, 200, 300]).await;

        // m1 (id=42) posted in A is forwarded to C and D only.
        let outcome = relay.handle_message(&inbound(42, 100)).await.unwrap();
        let RelayOutcome::Forwarded(reports) = outcome else {
            panic!("expected fan-out");
        };
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].deliveries.len(), 2);

        let records = db.forwarded_messages.get_all().await.unwrap();
        let delivered_to: Vec<_> = records.iter().map(|r| r.channel_id).collect();
        assert_eq!(delivered_to, vec![200, 300]);

        // A reply in C to the copy delivered there goes back to A,
        // referencing the original id 42.
        let copy_in_c = records[0].id;
        let outcome = relay
            .handle_message(&inbound_reply(77, 200, copy_in_c))
            .await
            .unwrap();
        let RelayOutcome::Replied(delivery) = outcome else {
            panic!("expected reply routing");
        };
        assert_eq!(delivery.original_id, 42);
        assert_eq!(delivery.original_channel_id, 100);

        let last_sent = sender.sent().pop().unwrap();
        assert_eq!(last_sent.channel_id, 100);
        assert_eq!(last_sent.message.reply_to, Some(42));
    }

    #[tokio::test]
    async fn test_reply_to_untracked_target_falls_through_to_fanout() {
        let db = Database::in_memory();
        let sender = Arc::new(RecordingSender::new(1000));
        let relay = relay_with_bridge(&db, sender.clone(), &[100, 200]).await;

        // Reply to an original (never forwarded), posted in a bridged
        // channel: broadcast as if it were a new message.
        let outcome = relay
            .handle_message(&inbound_reply(5, 100, 4))
            .await
            .unwrap();
        let RelayOutcome::Forwarded(reports) = outcome else {
            panic!("expected fall-through to fan-out");
        };
        assert_eq!(reports[0].deliveries.len(), 1);
        assert_eq!(sender.sent()[0].channel_id, 200);
    }

    #[tokio::test]
    async fn test_author_is_recorded_on_first_message() {
        let db = Database::in_memory();
        let sender = Arc::new(RecordingSender::new(1000));
        let relay = Relay::new(&db, sender);

        relay.handle_message(&inbound(1, 999)).await.unwrap();
        relay.handle_message(&inbound(2, 999)).await.unwrap();

        let users = db.users.get_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "alice");
    }

    #[tokio::test]
    async fn test_guild_joined_is_idempotent() {
        let db = Database::in_memory();
        let sender = Arc::new(RecordingSender::new(1000));
        let relay = Relay::new(&db, sender);

        relay.handle_guild_joined(10, "Guild A").await.unwrap();
        relay.handle_guild_joined(10, "Guild A").await.unwrap();

        assert_eq!(db.servers.count().await.unwrap(), 1);
    }
}
