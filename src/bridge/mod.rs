//! Bridge forwarding and reply resolution.
//!
//! An inbound chat event first passes through the reply resolver; if it
//! replies to a tracked forwarded copy it is routed back to the original
//! channel and processing stops. Otherwise the forwarding engine fans the
//! message out to every other member channel of each bridge the origin
//! channel belongs to.
//!
//! ## Module Structure
//!
//! - `registry`: bridge/channel membership and its invariants
//! - `forward`: fan-out with provenance bookkeeping
//! - `reply`: provenance-chain resolution and reply delivery
//! - `relay`: per-event dispatch tying the above together

pub mod forward;
pub mod registry;
pub mod relay;
pub mod reply;

pub use forward::{BridgeDisposition, DeliveryOutcome, FanoutReport, ForwardingEngine};
pub use registry::{BridgeRegistry, ChannelInfo};
pub use relay::{Relay, RelayOutcome};
pub use reply::{ReplyDelivery, ReplyResolver};

use async_trait::async_trait;

use crate::common::error::DeliveryError;
use crate::common::types::{ChannelId, MessageId, OutboundMessage};

/// Outbound capability of the messaging gateway: deliver one message to one
/// channel, yielding the delivered message's platform id.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: &OutboundMessage,
    ) -> Result<MessageId, DeliveryError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Test doubles shared by the bridge tests.

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::common::error::DeliveryError;
    use crate::common::types::{ChannelId, InboundMessage, MessageId, OutboundMessage};

    use super::MessageSender;

    /// One message captured by the recording sender.
    #[derive(Debug, Clone)]
    pub struct SentMessage {
        pub channel_id: ChannelId,
        pub delivered_id: MessageId,
        pub message: OutboundMessage,
    }

    /// Recording sender that issues sequential message ids and can be told
    /// to fail for specific channels.
    pub struct RecordingSender {
        next_id: AtomicU64,
        sent: Mutex<Vec<SentMessage>>,
        unresolvable: Mutex<HashSet<ChannelId>>,
    }

    impl RecordingSender {
        pub fn new(first_id: MessageId) -> Self {
            Self {
                next_id: AtomicU64::new(first_id),
                sent: Mutex::new(Vec::new()),
                unresolvable: Mutex::new(HashSet::new()),
            }
        }

        /// Make deliveries to `channel_id` fail with `ChannelNotFound`.
        pub fn fail_channel(&self, channel_id: ChannelId) {
            self.unresolvable.lock().unwrap().insert(channel_id);
        }

        pub fn sent(&self) -> Vec<SentMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(
            &self,
            channel_id: ChannelId,
            message: &OutboundMessage,
        ) -> Result<MessageId, DeliveryError> {
            if self.unresolvable.lock().unwrap().contains(&channel_id) {
                return Err(DeliveryError::ChannelNotFound { channel_id });
            }
            let delivered_id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(SentMessage {
                channel_id,
                delivered_id,
                message: message.clone(),
            });
            Ok(delivered_id)
        }
    }

    /// An ordinary inbound message for tests.
    pub fn inbound(id: MessageId, channel_id: ChannelId) -> InboundMessage {
        InboundMessage {
            id,
            author_id: 1,
            author_name: "alice".to_string(),
            author_avatar_url: None,
            channel_id,
            channel_name: "general".to_string(),
            guild_id: 10,
            guild_name: "Guild A".to_string(),
            guild_icon_url: None,
            content: "hello".to_string(),
            jump_url: format!("https://discord.com/channels/10/{channel_id}/{id}"),
            reply_target_id: None,
        }
    }

    /// An inbound reply to `target` for tests.
    pub fn inbound_reply(
        id: MessageId,
        channel_id: ChannelId,
        target: MessageId,
    ) -> InboundMessage {
        InboundMessage {
            reply_target_id: Some(target),
            ..inbound(id, channel_id)
        }
    }
}
