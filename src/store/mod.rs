//! Entity persistence over a generic document collection.
//!
//! ## Module Structure
//!
//! - `backend`: the `DocumentBackend` query contract and the bundled
//!   in-memory implementation
//! - `entity`: the compile-time per-entity persistence contract
//! - `model`: the persisted entity types
//! - `collection`: typed CRUD (`Store<E>`) over one collection

pub mod backend;
pub mod collection;
pub mod entity;
pub mod model;

pub use backend::{DocumentBackend, Filter, MemoryBackend};
pub use collection::Store;
pub use entity::Entity;
pub use model::{Bridge, BridgeChannel, BridgeMessage, ForwardedMessage, Server, User};

use std::sync::Arc;

/// The application's collections, one typed store per entity type.
pub struct Database {
    pub users: Store<User>,
    pub servers: Store<Server>,
    pub bridges: Store<Bridge>,
    pub bridge_channels: Store<BridgeChannel>,
    pub bridge_messages: Store<BridgeMessage>,
    pub forwarded_messages: Store<ForwardedMessage>,
}

impl Database {
    /// Open every collection over a shared backend.
    pub fn open(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            users: Store::new(backend.clone()),
            servers: Store::new(backend.clone()),
            bridges: Store::new(backend.clone()),
            bridge_channels: Store::new(backend.clone()),
            bridge_messages: Store::new(backend.clone()),
            forwarded_messages: Store::new(backend),
        }
    }

    /// Database over the bundled in-memory backend.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryBackend::new()))
    }
}
