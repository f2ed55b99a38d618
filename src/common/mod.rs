//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use error::{DeliveryError, RegistryError, StoreError};
pub use types::{ChannelId, GuildId, InboundMessage, MessageId, OutboundMessage, UserId};
