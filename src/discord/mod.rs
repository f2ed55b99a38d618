//! Discord gateway integration.
//!
//! Everything serenity-specific lives here: the event handler that turns
//! gateway events into relay calls, the sender that renders forwarded copies
//! as embeds, and the `!bridge` command surface.

pub mod bot;
pub mod commands;
pub mod handler;
pub mod sender;

pub use bot::build_client;
pub use handler::BridgeHandler;
pub use sender::DiscordSender;
