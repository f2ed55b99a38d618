//! Reply routing back to original messages.
//!
//! When an inbound message replies to a tracked forwarded copy, it is
//! delivered to the original poster's channel as a reply referencing the true
//! original message. This is a single-hop delivery, not a fan-out: a reply
//! intentionally goes only to the original channel, not to every bridge
//! member.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::common::error::{DeliveryError, StoreError};
use crate::common::types::{ChannelId, InboundMessage, MessageId, OutboundMessage};
use crate::store::{Database, ForwardedMessage, Store};

use super::MessageSender;

/// Result of routing one reply back to its original.
#[derive(Debug)]
pub struct ReplyDelivery {
    /// The true original message the reply resolved to.
    pub original_id: MessageId,
    /// The channel the original was posted in.
    pub original_channel_id: ChannelId,
    pub result: Result<MessageId, DeliveryError>,
}

/// Resolves inbound replies against the provenance index.
pub struct ReplyResolver {
    forwarded_messages: Store<ForwardedMessage>,
    sender: Arc<dyn MessageSender>,
}

impl ReplyResolver {
    pub fn new(db: &Database, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            forwarded_messages: db.forwarded_messages.clone(),
            sender,
        }
    }

    /// Route `msg` back to the original behind the copy it replies to.
    ///
    /// Returns `None` when `msg` is not a reply, or replies to something the
    /// relay never forwarded; the caller then treats it as an ordinary
    /// inbound message. A reply to an original (rather than a copy) also
    /// falls through here and is broadcast like a fresh post.
    pub async fn resolve(
        &self,
        msg: &InboundMessage,
    ) -> Result<Option<ReplyDelivery>, StoreError> {
        let Some(target_id) = msg.reply_target_id else {
            return Ok(None);
        };

        let Some(forwarded) = self.forwarded_messages.get_by_primary_key(target_id).await? else {
            debug!(reply_target = target_id, "Reply target is not a forwarded copy");
            return Ok(None);
        };

        let mut outbound = OutboundMessage::from_inbound(msg);
        outbound.reply_to = Some(forwarded.original_id);

        let result = self
            .sender
            .send(forwarded.original_channel_id, &outbound)
            .await;

        match &result {
            Ok(delivered_id) => {
                // Extend the provenance chain. The original id and channel
                // are copied forward from the matched record, never
                // re-derived, so any hop depth resolves to the same original.
                self.forwarded_messages
                    .create(ForwardedMessage::new(
                        *delivered_id,
                        forwarded.original_id,
                        forwarded.original_channel_id,
                        forwarded.bridge_name.as_str(),
                        forwarded.original_channel_id,
                    ))
                    .await?;
                info!(
                    bridge = %forwarded.bridge_name,
                    original_id = forwarded.original_id,
                    to = forwarded.original_channel_id,
                    message_id = delivered_id,
                    "Routed reply to original channel"
                );
            }
            Err(err) => {
                error!(
                    bridge = %forwarded.bridge_name,
                    to = forwarded.original_channel_id,
                    "Reply delivery failed: {}",
                    err
                );
            }
        }

        Ok(Some(ReplyDelivery {
            original_id: forwarded.original_id,
            original_channel_id: forwarded.original_channel_id,
            result,
        }))
    }
}
