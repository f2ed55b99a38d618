//! Per-entity persistence contract.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Capability set every persisted entity implements.
///
/// The contract is resolved at compile time: each entity declares its
/// collection name, primary-key field, and full field list as constants, and
/// records are (de)serialized through serde rather than runtime introspection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the entity is stored in.
    const COLLECTION: &'static str;

    /// Field used as the primary key.
    const PRIMARY_KEY: &'static str = "id";

    /// Whether the store enforces primary-key uniqueness on insert.
    /// BridgeChannel opts out: the same channel id keys records for
    /// different bridges, and (id, bridge_name) uniqueness is the
    /// registry's invariant, not the store's.
    const UNIQUE_PRIMARY_KEY: bool = true;

    /// All persisted field names; filters are validated against this list.
    const FIELDS: &'static [&'static str];

    /// The entity's primary-key value.
    fn primary_key(&self) -> Value;

    /// Stamp the update timestamp.
    fn set_updated(&mut self, at: DateTime<Utc>);
}
