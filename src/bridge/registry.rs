//! Bridge and channel membership registry.
//!
//! Owns the Bridge and BridgeChannel entities and enforces the membership
//! invariants on top of the entity store: unique bridge names, no duplicate
//! (channel, bridge) memberships, creator-only removal.

use tracing::info;

use crate::common::error::RegistryError;
use crate::common::types::{ChannelId, GuildId, UserId};
use crate::store::{Bridge, BridgeChannel, Database, Filter, Store};

/// Channel metadata captured when a channel joins a bridge.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub server_id: GuildId,
    pub server_name: String,
    pub jump_url: String,
}

/// Enforces bridge/channel membership invariants on top of the entity store.
#[derive(Clone)]
pub struct BridgeRegistry {
    bridges: Store<Bridge>,
    channels: Store<BridgeChannel>,
}

impl BridgeRegistry {
    pub fn new(db: &Database) -> Self {
        Self {
            bridges: db.bridges.clone(),
            channels: db.bridge_channels.clone(),
        }
    }

    /// Create a new, empty bridge owned by `creator_id`.
    ///
    /// Name uniqueness is checked by explicit lookup; the store's own key
    /// policy is not relied on.
    pub async fn create_bridge(
        &self,
        name: &str,
        creator_id: UserId,
    ) -> Result<Bridge, RegistryError> {
        if self.bridges.get_by_primary_key(name).await?.is_some() {
            return Err(RegistryError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let bridge = self.bridges.create(Bridge::new(name, creator_id)).await?;
        info!(bridge = name, creator_id, "Created bridge");
        Ok(bridge)
    }

    /// The membership record for (channel, bridge), if any. Lookups always
    /// filter by both: the same channel id keys records for other bridges.
    async fn membership(
        &self,
        bridge_name: &str,
        channel_id: ChannelId,
    ) -> Result<Option<BridgeChannel>, RegistryError> {
        let filter = Filter::new()
            .eq("id", channel_id)
            .eq("bridge_name", bridge_name);
        Ok(self.channels.get_one(&filter).await?)
    }

    /// Add a channel to a bridge: record the membership fact and append the
    /// channel to the bridge's member list.
    ///
    /// The two writes are not transactional; a crash between them leaves the
    /// BridgeChannel record and `channel_ids` inconsistent. This is an
    /// accepted risk window, surfaced at forwarding time as a dangling
    /// reference rather than hidden here.
    pub async fn add_channel(
        &self,
        bridge_name: &str,
        added_by: UserId,
        info: ChannelInfo,
    ) -> Result<Bridge, RegistryError> {
        let Some(mut bridge) = self.bridges.get_by_primary_key(bridge_name).await? else {
            return Err(RegistryError::BridgeNotFound {
                name: bridge_name.to_string(),
            });
        };

        if self.membership(bridge_name, info.id).await?.is_some() {
            return Err(RegistryError::AlreadyMember {
                bridge: bridge_name.to_string(),
                channel_id: info.id,
            });
        }

        self.channels
            .create(BridgeChannel::new(
                info.id,
                info.name,
                bridge_name,
                info.server_id,
                info.server_name,
                added_by,
                info.jump_url,
            ))
            .await?;

        bridge.channel_ids.push(info.id);
        let bridge = self.bridges.update(bridge).await?;

        info!(
            bridge = bridge_name,
            channel_id = info.id,
            members = bridge.channel_ids.len(),
            "Added channel to bridge"
        );
        Ok(bridge)
    }

    /// Remove a channel from a bridge. Only the bridge creator may remove.
    /// Same non-transactional two-write caveat as [`BridgeRegistry::add_channel`].
    pub async fn remove_channel(
        &self,
        bridge_name: &str,
        channel_id: ChannelId,
        requester_id: UserId,
    ) -> Result<Bridge, RegistryError> {
        let Some(mut bridge) = self.bridges.get_by_primary_key(bridge_name).await? else {
            return Err(RegistryError::BridgeNotFound {
                name: bridge_name.to_string(),
            });
        };

        if bridge.creator_id != requester_id {
            return Err(RegistryError::Forbidden {
                bridge: bridge_name.to_string(),
                requester_id,
            });
        }

        if self.membership(bridge_name, channel_id).await?.is_none() {
            return Err(RegistryError::NotMember {
                bridge: bridge_name.to_string(),
                channel_id,
            });
        }

        let filter = Filter::new()
            .eq("id", channel_id)
            .eq("bridge_name", bridge_name);
        self.channels.remove_by_filter(&filter).await?;

        bridge.channel_ids.retain(|id| *id != channel_id);
        let bridge = self.bridges.update(bridge).await?;

        info!(
            bridge = bridge_name,
            channel_id,
            members = bridge.channel_ids.len(),
            "Removed channel from bridge"
        );
        Ok(bridge)
    }

    /// Member channels of a bridge, in the bridge's join order.
    pub async fn channels_of(&self, bridge_name: &str) -> Result<Vec<BridgeChannel>, RegistryError> {
        let Some(bridge) = self.bridges.get_by_primary_key(bridge_name).await? else {
            return Err(RegistryError::BridgeNotFound {
                name: bridge_name.to_string(),
            });
        };

        let members = self
            .channels
            .get_many(&Filter::new().eq("bridge_name", bridge_name))
            .await?;

        let ordered = bridge
            .channel_ids
            .iter()
            .filter_map(|id| members.iter().find(|c| c.id == *id).cloned())
            .collect();
        Ok(ordered)
    }

    /// All memberships of a channel, one per bridge it belongs to.
    pub async fn bridges_containing(
        &self,
        channel_id: ChannelId,
    ) -> Result<Vec<BridgeChannel>, RegistryError> {
        Ok(self
            .channels
            .get_many(&Filter::new().eq("id", channel_id))
            .await?)
    }

    /// Lookup a bridge by name.
    pub async fn get_bridge(&self, name: &str) -> Result<Option<Bridge>, RegistryError> {
        Ok(self.bridges.get_by_primary_key(name).await?)
    }

    /// Bridges owned by `creator_id`.
    pub async fn list_bridges(&self, creator_id: UserId) -> Result<Vec<Bridge>, RegistryError> {
        Ok(self
            .bridges
            .get_many(&Filter::new().eq("creator_id", creator_id))
            .await?)
    }
}
