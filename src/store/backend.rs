//! Generic document-collection backend.
//!
//! Everything above this module speaks `Filter` and `DocumentBackend`; the
//! bundled `MemoryBackend` is one implementation of that contract, and a real
//! document database slots in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::common::error::StoreError;

/// A single field condition.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Exact-match equality.
    Eq(Value),
    /// Set membership.
    In(Vec<Value>),
}

impl Condition {
    fn matches(&self, field_value: Option<&Value>) -> bool {
        match self {
            Condition::Eq(expected) => field_value == Some(expected),
            Condition::In(values) => field_value.map_or(false, |v| values.contains(v)),
        }
    }
}

/// A conjunction of field conditions, like a query document.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.to_string(), Condition::Eq(value.into())));
        self
    }

    /// Require `field` to be one of `values`.
    pub fn is_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conditions
            .push((field.to_string(), Condition::In(values)));
        self
    }

    /// Field names referenced by this filter.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(field, _)| field.as_str())
    }

    /// Whether `doc` satisfies every condition. An empty filter matches all.
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, cond)| cond.matches(doc.get(field)))
    }
}

/// Storage contract: named collections of JSON documents with equality and
/// set-membership queries.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Insert a document. When `unique_key` names a field, fails with
    /// `DuplicateKey` if another document in the collection carries the same
    /// value in that field.
    async fn insert(
        &self,
        collection: &'static str,
        unique_key: Option<&'static str>,
        doc: Value,
    ) -> Result<(), StoreError>;

    /// First document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError>;

    /// All documents matching `filter`, in insertion order.
    async fn find_many(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError>;

    /// Replace the first document matching `filter`. Returns the number of
    /// documents replaced (0 or 1); zero matches is not an error.
    async fn update_one(
        &self,
        collection: &'static str,
        filter: &Filter,
        doc: Value,
    ) -> Result<u64, StoreError>;

    /// Delete all documents matching `filter`; returns the count deleted.
    async fn delete_many(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<u64, StoreError>;

    /// Number of documents in the collection.
    async fn count(&self, collection: &'static str) -> Result<u64, StoreError>;
}

/// In-memory backend keeping one vector of documents per collection.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<&'static str, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert(
        &self,
        collection: &'static str,
        unique_key: Option<&'static str>,
        doc: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(key_field) = unique_key {
            if let Some(key) = doc.get(key_field) {
                if docs.iter().any(|d| d.get(key_field) == Some(key)) {
                    return Err(StoreError::DuplicateKey {
                        collection,
                        key: key.to_string(),
                    });
                }
            }
        }

        docs.push(doc);
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &'static str,
        filter: &Filter,
        doc: Value,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter_mut().find(|d| filter.matches(d)) {
            Some(existing) => {
                *existing = doc;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(
        &self,
        collection: &'static str,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn count(&self, collection: &'static str) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}
