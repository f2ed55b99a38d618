//! Fan-out forwarding of original messages.
//!
//! For a bridge with N member channels, one inbound original message produces
//! at most N-1 delivery attempts and, per successful attempt, exactly one
//! ForwardedMessage provenance record. A message is never delivered back to
//! its own originating channel.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::common::error::{DeliveryError, StoreError};
use crate::common::types::{ChannelId, InboundMessage, MessageId, OutboundMessage};
use crate::store::{
    Bridge, BridgeChannel, BridgeMessage, Database, Filter, ForwardedMessage, Store,
};

use super::MessageSender;

/// How one bridge membership of the origin channel was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeDisposition {
    /// Copies were attempted for every other member channel.
    Forwarded,
    /// The membership record points at a missing bridge.
    DanglingReference,
    /// The bridge has one member channel or fewer; nothing to forward to.
    TooFewChannels,
}

/// One delivery attempt within a fan-out.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub channel_id: ChannelId,
    pub result: Result<MessageId, DeliveryError>,
}

/// Batch result of fanning one inbound message out through one bridge.
#[derive(Debug)]
pub struct FanoutReport {
    pub bridge_name: String,
    pub disposition: BridgeDisposition,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Delivers one inbound original message to every other member channel of
/// every bridge the originating channel belongs to.
pub struct ForwardingEngine {
    bridges: Store<Bridge>,
    channels: Store<BridgeChannel>,
    bridge_messages: Store<BridgeMessage>,
    forwarded_messages: Store<ForwardedMessage>,
    sender: Arc<dyn MessageSender>,
}

impl ForwardingEngine {
    pub fn new(db: &Database, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            bridges: db.bridges.clone(),
            channels: db.bridge_channels.clone(),
            bridge_messages: db.bridge_messages.clone(),
            forwarded_messages: db.forwarded_messages.clone(),
            sender,
        }
    }

    /// Fan `msg` out through every bridge its origin channel belongs to.
    ///
    /// Returns one report per bridge membership; a non-bridged channel yields
    /// an empty batch, not an error. Store failures surface to the caller;
    /// delivery failures are isolated per destination and never abort sibling
    /// deliveries.
    pub async fn forward(&self, msg: &InboundMessage) -> Result<Vec<FanoutReport>, StoreError> {
        let memberships = self
            .channels
            .get_many(&Filter::new().eq("id", msg.channel_id))
            .await?;

        if memberships.is_empty() {
            debug!(channel_id = msg.channel_id, "Channel is not bridged");
            return Ok(Vec::new());
        }

        let mut reports = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            reports.push(self.forward_through(msg, membership).await?);
        }
        Ok(reports)
    }

    /// Fan `msg` out through the bridge behind one membership record.
    async fn forward_through(
        &self,
        msg: &InboundMessage,
        membership: &BridgeChannel,
    ) -> Result<FanoutReport, StoreError> {
        let Some(bridge) = self
            .bridges
            .get_by_primary_key(membership.bridge_name.as_str())
            .await?
        else {
            error!(
                bridge = %membership.bridge_name,
                channel_id = membership.id,
                "Dangling reference: membership points at a missing bridge"
            );
            return Ok(FanoutReport {
                bridge_name: membership.bridge_name.clone(),
                disposition: BridgeDisposition::DanglingReference,
                deliveries: Vec::new(),
            });
        };

        if bridge.channel_ids.len() <= 1 {
            warn!(bridge = %bridge.name, "Bridge has no other member channels, nothing to forward");
            return Ok(FanoutReport {
                bridge_name: bridge.name,
                disposition: BridgeDisposition::TooFewChannels,
                deliveries: Vec::new(),
            });
        }

        // Audit record for the original. Duplicates on retry are tolerated,
        // not deduplicated.
        self.bridge_messages
            .create(BridgeMessage::new(
                msg.id,
                msg.content.clone(),
                msg.author_id,
                msg.channel_id,
                bridge.name.as_str(),
            ))
            .await?;

        let outbound = OutboundMessage::from_inbound(msg);
        let mut deliveries = Vec::new();

        // Destinations in the bridge's member order, excluding the origin.
        for &dest in bridge.channel_ids.iter().filter(|&&id| id != membership.id) {
            match self.sender.send(dest, &outbound).await {
                Ok(delivered_id) => {
                    self.forwarded_messages
                        .create(ForwardedMessage::new(
                            delivered_id,
                            msg.id,
                            msg.channel_id,
                            bridge.name.as_str(),
                            dest,
                        ))
                        .await?;
                    info!(
                        bridge = %bridge.name,
                        from = msg.channel_id,
                        to = dest,
                        message_id = delivered_id,
                        "Forwarded message"
                    );
                    deliveries.push(DeliveryOutcome {
                        channel_id: dest,
                        result: Ok(delivered_id),
                    });
                }
                Err(err) => {
                    error!(bridge = %bridge.name, to = dest, "Delivery failed: {}", err);
                    deliveries.push(DeliveryOutcome {
                        channel_id: dest,
                        result: Err(err),
                    });
                }
            }
        }

        Ok(FanoutReport {
            bridge_name: bridge.name,
            disposition: BridgeDisposition::Forwarded,
            deliveries,
        })
    }
}
