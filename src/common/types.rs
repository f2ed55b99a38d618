//! Shared types used across the application.

/// Platform user id.
pub type UserId = u64;

/// Platform channel id.
pub type ChannelId = u64;

/// Platform message id.
pub type MessageId = u64;

/// Platform guild (server) id.
pub type GuildId = u64;

/// An inbound chat event delivered by the messaging gateway.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform id of the message itself.
    pub id: MessageId,
    /// Author's platform user id.
    pub author_id: UserId,
    /// Author's effective display name (nickname if set).
    pub author_name: String,
    /// Author's avatar url, if any.
    pub author_avatar_url: Option<String>,
    /// Channel the message was posted in.
    pub channel_id: ChannelId,
    /// Name of that channel.
    pub channel_name: String,
    /// Guild the channel belongs to.
    pub guild_id: GuildId,
    /// Name of that guild.
    pub guild_name: String,
    /// Guild icon url, if any.
    pub guild_icon_url: Option<String>,
    /// Message text.
    pub content: String,
    /// Deep link to the message.
    pub jump_url: String,
    /// Id of the message this one replies to, if it is a reply.
    pub reply_target_id: Option<MessageId>,
}

/// Payload handed to the message-send capability for one delivery.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Message text.
    pub content: String,
    /// Original author's display name.
    pub author_display: String,
    /// Original author's avatar url.
    pub author_avatar_url: Option<String>,
    /// Name of the guild the original was posted in.
    pub guild_name: String,
    /// Icon of that guild.
    pub guild_icon_url: Option<String>,
    /// Deep link to the original message.
    pub jump_url: String,
    /// When set, deliver as a reply to this message in the target channel.
    pub reply_to: Option<MessageId>,
}

impl OutboundMessage {
    /// Build the outbound payload for a forwarded copy of an inbound message.
    pub fn from_inbound(msg: &InboundMessage) -> Self {
        Self {
            content: msg.content.clone(),
            author_display: msg.author_name.clone(),
            author_avatar_url: msg.author_avatar_url.clone(),
            guild_name: msg.guild_name.clone(),
            guild_icon_url: msg.guild_icon_url.clone(),
            jump_url: msg.jump_url.clone(),
            reply_to: None,
        }
    }
}
