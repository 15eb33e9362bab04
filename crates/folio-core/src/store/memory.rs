//! In-memory document store
//!
//! A complete [`DocumentStore`] implementation backed by process memory.
//! This is what the test suite and local development run against; it also
//! drives the push-subscription path, sending the full current result set
//! of every affected subscription after each write.
//!
//! The `set_offline` switch makes every operation fail with
//! [`StoreError::Unavailable`], for exercising transient-failure handling.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::{
    Document, DocumentStore, Fields, Query, StoreError, StoreResult, Subscription, SubscriptionId,
    Value,
};

struct Watcher {
    id: SubscriptionId,
    collection: String,
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
struct Inner {
    /// collection name -> document id -> fields
    collections: HashMap<String, BTreeMap<String, Fields>>,
    watchers: Vec<Watcher>,
    next_subscription: u64,
    offline: bool,
}

/// In-memory [`DocumentStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store; every operation fails with
    /// `Unavailable` until switched back
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    fn run_query(inner: &Inner, collection: &str, query: &Query) -> Vec<Document> {
        let mut docs: Vec<Document> = inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .filter(|doc| query.matches(doc))
                    .collect()
            })
            .unwrap_or_default();
        query.sort(&mut docs);
        docs
    }

    /// Push a fresh snapshot to every live watcher of `collection`, dropping
    /// watchers whose receiver has gone away
    fn notify(inner: &mut Inner, collection: &str) {
        let snapshots: Vec<(usize, Vec<Document>)> = inner
            .watchers
            .iter()
            .enumerate()
            .filter(|(_, w)| w.collection == collection)
            .map(|(i, w)| (i, Self::run_query(inner, collection, &w.query)))
            .collect();

        let mut dead = Vec::new();
        for (index, snapshot) in snapshots {
            if inner.watchers[index].tx.send(snapshot).is_err() {
                dead.push(index);
            }
        }
        for index in dead.into_iter().rev() {
            let watcher = inner.watchers.remove(index);
            debug!(subscription = watcher.id.0, "dropping dead watcher");
        }
    }

    fn check_online(inner: &Inner) -> StoreResult<()> {
        if inner.offline {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        Ok(Self::run_query(&inner, collection, query))
    }

    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        debug!(collection, id = %id, "document created");
        Self::notify(&mut inner, collection);
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Self::notify(&mut inner, collection);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        let existing = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (field, value) in fields {
            if value == Value::Null {
                existing.remove(&field);
            } else {
                existing.insert(field, value);
            }
        }
        Self::notify(&mut inner, collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_none() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Self::notify(&mut inner, collection);
        Ok(())
    }

    async fn subscribe(&self, collection: &str, query: Query) -> StoreResult<Subscription> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_online(&inner)?;
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        // Initial snapshot so the subscriber starts from current state
        let snapshot = Self::run_query(&inner, collection, &query);
        let _ = tx.send(snapshot);

        inner.watchers.push(Watcher {
            id,
            collection: collection.to_string(),
            query,
            tx,
        });
        debug!(collection, subscription = id.0, "subscription registered");
        Ok(Subscription { id, receiver: rx })
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.watchers.retain(|w| w.id != id);
        debug!(subscription = id.0, "subscription removed");
    }
}
