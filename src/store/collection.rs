//! Typed CRUD and query over one document collection.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::common::error::StoreError;
use crate::store::backend::{DocumentBackend, Filter};
use crate::store::entity::Entity;

/// Generic typed store over the named collection of one entity type.
///
/// Retry policy belongs to the caller: a `StoreError::Unavailable` from the
/// backend is surfaced as-is, never retried here.
pub struct Store<E: Entity> {
    backend: Arc<dyn DocumentBackend>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Store<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Store<E> {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    fn encode(item: &E) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(item)?)
    }

    fn decode(doc: Value) -> Result<E, StoreError> {
        Ok(serde_json::from_value(doc)?)
    }

    fn validate(filter: &Filter) -> Result<(), StoreError> {
        for field in filter.fields() {
            if !E::FIELDS.contains(&field) {
                return Err(StoreError::UnknownField {
                    collection: E::COLLECTION,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Insert a new record; returns the item unchanged.
    pub async fn create(&self, item: E) -> Result<E, StoreError> {
        let doc = Self::encode(&item)?;
        let unique_key = E::UNIQUE_PRIMARY_KEY.then_some(E::PRIMARY_KEY);
        self.backend.insert(E::COLLECTION, unique_key, doc).await?;
        Ok(item)
    }

    /// First record matching `filter`, or absence.
    pub async fn get_one(&self, filter: &Filter) -> Result<Option<E>, StoreError> {
        Self::validate(filter)?;
        match self.backend.find_one(E::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(Self::decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Lookup by the primary-key field.
    pub async fn get_by_primary_key(&self, key: impl Into<Value>) -> Result<Option<E>, StoreError> {
        let filter = Filter::new().eq(E::PRIMARY_KEY, key);
        self.get_one(&filter).await
    }

    /// Like [`Store::get_by_primary_key`] but absence is a `NotFound` error.
    pub async fn require_by_primary_key(&self, key: impl Into<Value>) -> Result<E, StoreError> {
        let key = key.into();
        self.get_by_primary_key(key.clone())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: E::COLLECTION,
                field: E::PRIMARY_KEY,
                key: key.to_string(),
            })
    }

    /// Idempotent creation keyed by the item's primary key: return the
    /// existing record or create a new one.
    ///
    /// Not atomic against concurrent creators of the same key; two racing
    /// first-sightings can both reach `create`, and the loser must treat a
    /// `DuplicateKey` as a signal to re-read.
    pub async fn get_or_create(&self, item: E) -> Result<E, StoreError> {
        if let Some(existing) = self.get_by_primary_key(item.primary_key()).await? {
            return Ok(existing);
        }
        self.create(item).await
    }

    /// All records matching `filter`, in insertion order.
    pub async fn get_many(&self, filter: &Filter) -> Result<Vec<E>, StoreError> {
        Self::validate(filter)?;
        self.backend
            .find_many(E::COLLECTION, filter)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Records whose `field` value is one of `values`.
    pub async fn get_by_field_in(
        &self,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Vec<E>, StoreError> {
        self.get_many(&Filter::new().is_in(field, values)).await
    }

    /// Every record in the collection.
    pub async fn get_all(&self) -> Result<Vec<E>, StoreError> {
        self.get_many(&Filter::new()).await
    }

    /// Number of records in the collection.
    pub async fn count(&self) -> Result<u64, StoreError> {
        self.backend.count(E::COLLECTION).await
    }

    /// Stamp `updated` to now and replace the full record matched by primary
    /// key. Silently matches zero documents if the key no longer exists, so
    /// callers must not assume update implies existence.
    pub async fn update(&self, mut item: E) -> Result<E, StoreError> {
        item.set_updated(Utc::now());
        let doc = Self::encode(&item)?;
        let filter = Filter::new().eq(E::PRIMARY_KEY, item.primary_key());
        self.backend.update_one(E::COLLECTION, &filter, doc).await?;
        Ok(item)
    }

    /// Delete all records matching `filter`; returns the count deleted.
    pub async fn remove_by_filter(&self, filter: &Filter) -> Result<u64, StoreError> {
        Self::validate(filter)?;
        self.backend.delete_many(E::COLLECTION, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::MemoryBackend;
    use crate::store::model::{Bridge, BridgeChannel, User};

    fn store<E: Entity>() -> Store<E> {
        Store::new(Arc::new(MemoryBackend::new()))
    }

    fn shared_backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_create_and_get_by_primary_key() {
        let users = store::<User>();
        users.create(User::new(42, "alice")).await.unwrap();

        let found = users.get_by_primary_key(42u64).await.unwrap().unwrap();
        assert_eq!(found.id, 42);
        assert_eq!(found.name, "alice");

        assert!(users.get_by_primary_key(99u64).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_require_by_primary_key_not_found() {
        let users = store::<User>();
        let err = users.require_by_primary_key(7u64).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                collection: "users",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let users = store::<User>();

        let first = users.get_or_create(User::new(1, "alice")).await.unwrap();
        let second = users.get_or_create(User::new(1, "impostor")).await.unwrap();

        // Second call returns the existing record, not the new candidate.
        assert_eq!(second.name, first.name);
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_filter_field_is_rejected() {
        let users = store::<User>();
        let err = users
            .get_one(&Filter::new().eq("nickname", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownField {
                collection: "users",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_and_replaces() {
        let bridges = store::<Bridge>();
        let bridge = bridges.create(Bridge::new("general", 1)).await.unwrap();
        let before = bridge.updated;

        let mut changed = bridge;
        changed.channel_ids.push(100);
        let saved = bridges.update(changed).await.unwrap();
        assert!(saved.updated >= before);

        let reread = bridges
            .get_by_primary_key("general")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reread.channel_ids, vec![100]);
    }

    #[tokio::test]
    async fn test_update_missing_key_is_a_no_op() {
        let bridges = store::<Bridge>();
        // Never created; update must not fail or insert.
        bridges.update(Bridge::new("ghost", 1)).await.unwrap();
        assert_eq!(bridges.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_primary_key_on_create() {
        let bridges = store::<Bridge>();
        bridges.create(Bridge::new("general", 1)).await.unwrap();

        let err = bridges.create(Bridge::new("general", 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_channel_id_repeats_across_bridges() {
        let channels = store::<BridgeChannel>();
        channels
            .create(BridgeChannel::new(100, "general", "alpha", 1, "Guild A", 1, "url"))
            .await
            .unwrap();
        // Same channel id under a different bridge name is a distinct record.
        channels
            .create(BridgeChannel::new(100, "general", "beta", 1, "Guild A", 1, "url"))
            .await
            .unwrap();

        let memberships = channels
            .get_many(&Filter::new().eq("id", 100u64))
            .await
            .unwrap();
        assert_eq!(memberships.len(), 2);

        let scoped = channels
            .get_one(&Filter::new().eq("id", 100u64).eq("bridge_name", "beta"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.bridge_name, "beta");
    }

    #[tokio::test]
    async fn test_get_by_field_in() {
        let channels = store::<BridgeChannel>();
        for id in [100u64, 200, 300] {
            channels
                .create(BridgeChannel::new(id, "chan", "alpha", 1, "Guild A", 1, "url"))
                .await
                .unwrap();
        }

        let found = channels
            .get_by_field_in("id", vec![Value::from(100u64), Value::from(300u64), Value::from(999u64)])
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 300]);
    }

    #[tokio::test]
    async fn test_remove_by_filter_returns_count() {
        let channels = store::<BridgeChannel>();
        channels
            .create(BridgeChannel::new(100, "a", "alpha", 1, "Guild A", 1, "url"))
            .await
            .unwrap();
        channels
            .create(BridgeChannel::new(200, "b", "alpha", 1, "Guild A", 1, "url"))
            .await
            .unwrap();
        channels
            .create(BridgeChannel::new(100, "a", "beta", 1, "Guild A", 1, "url"))
            .await
            .unwrap();

        let deleted = channels
            .remove_by_filter(&Filter::new().eq("bridge_name", "alpha"))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(channels.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_collections_share_a_backend_without_collisions() {
        let backend = shared_backend();
        let users: Store<User> = Store::new(backend.clone());
        let bridges: Store<Bridge> = Store::new(backend);

        users.create(User::new(1, "alice")).await.unwrap();
        bridges.create(Bridge::new("general", 1)).await.unwrap();

        assert_eq!(users.count().await.unwrap(), 1);
        assert_eq!(bridges.count().await.unwrap(), 1);
    }
}
