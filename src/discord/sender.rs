//! Serenity-backed message delivery.
//!
//! Forwarded copies are rendered as an embed: author line with avatar and a
//! jump link to the original, the message text, and the originating guild in
//! the footer.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::MessageReference;
use serenity::model::colour::Colour;
use serenity::model::id::{ChannelId as GatewayChannelId, MessageId as GatewayMessageId};
use tracing::debug;

use crate::bridge::MessageSender;
use crate::common::error::DeliveryError;
use crate::common::types::{ChannelId, MessageId, OutboundMessage};

/// Sends relay copies through the Discord HTTP API.
///
/// The HTTP client only exists once the gateway connects, so it is attached
/// from the ready event rather than at construction.
#[derive(Default)]
pub struct DiscordSender {
    http: RwLock<Option<Arc<Http>>>,
}

impl DiscordSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the HTTP client once the gateway reports ready.
    pub fn attach(&self, http: Arc<Http>) {
        debug!("Discord HTTP client attached");
        *self.http.write().expect("http lock poisoned") = Some(http);
    }

    fn http(&self, channel_id: ChannelId) -> Result<Arc<Http>, DeliveryError> {
        self.http
            .read()
            .expect("http lock poisoned")
            .clone()
            .ok_or(DeliveryError::SendFailed {
                channel_id,
                message: "gateway is not ready".to_string(),
            })
    }

    fn render(message: &OutboundMessage) -> CreateMessage {
        let mut author =
            CreateEmbedAuthor::new(message.author_display.clone()).url(message.jump_url.clone());
        if let Some(avatar) = &message.author_avatar_url {
            author = author.icon_url(avatar.clone());
        }

        let mut footer = CreateEmbedFooter::new(message.guild_name.clone());
        if let Some(icon) = &message.guild_icon_url {
            footer = footer.icon_url(icon.clone());
        }

        let embed = CreateEmbed::new()
            .author(author)
            .description(message.content.clone())
            .footer(footer)
            .colour(Colour::BLUE);

        CreateMessage::new().embed(embed)
    }
}

#[async_trait]
impl MessageSender for DiscordSender {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: &OutboundMessage,
    ) -> Result<MessageId, DeliveryError> {
        let http = self.http(channel_id)?;

        let mut builder = Self::render(message);
        if let Some(reply_to) = message.reply_to {
            builder = builder.reference_message(MessageReference::from((
                GatewayChannelId::new(channel_id),
                GatewayMessageId::new(reply_to),
            )));
        }

        let sent = GatewayChannelId::new(channel_id)
            .send_message(&http, builder)
            .await
            .map_err(|err| classify_send_error(channel_id, err))?;

        Ok(sent.id.get())
    }
}

/// Map a serenity failure onto the delivery taxonomy: an HTTP 404 means the
/// destination channel could not be resolved.
fn classify_send_error(channel_id: ChannelId, err: serenity::Error) -> DeliveryError {
    match &err {
        serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404 =>
        {
            DeliveryError::ChannelNotFound { channel_id }
        }
        _ => DeliveryError::SendFailed {
            channel_id,
            message: err.to_string(),
        },
    }
}
