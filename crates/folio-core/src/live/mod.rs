//! Live queries
//!
//! Push-based mirror of a collection query: the store delivers the full
//! result set after every remote change and the watcher decodes each
//! snapshot into entities. No diffing; the consumer replaces its local list
//! wholesale, which keeps reconciliation trivial at portfolio scale.
//!
//! Every watch is tied to a [`WatchHandle`] that releases the store-side
//! subscription on `cancel()` or on drop. Cancellation is best-effort: a
//! snapshot already queued on the channel may still be observed.

mod optimistic;

pub use optimistic::OptimisticList;

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::adapter::mapping::EntityDocument;
use crate::error::Result;
use crate::store::{Document, DocumentStore, Query, SubscriptionId};

/// Cancellation handle for a store subscription. Dropping it releases the
/// subscription; `cancel()` does the same explicitly.
pub struct WatchHandle {
    store: Arc<dyn DocumentStore>,
    id: Option<SubscriptionId>,
}

impl WatchHandle {
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            debug!(subscription = id.0, "cancelling watch");
            self.store.unsubscribe(id);
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// A live view over one collection query, yielding the decoded result set
/// after every remote change (the first snapshot arrives immediately).
///
/// Dropping the `LiveQuery` cancels the underlying subscription.
pub struct LiveQuery<E> {
    receiver: mpsc::UnboundedReceiver<Vec<Document>>,
    handle: WatchHandle,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityDocument> LiveQuery<E> {
    /// Register a subscription for an explicit collection and query
    pub async fn subscribe(
        store: Arc<dyn DocumentStore>,
        collection: &str,
        query: Query,
    ) -> Result<Self> {
        let subscription = store.subscribe(collection, query).await?;
        Ok(Self {
            receiver: subscription.receiver,
            handle: WatchHandle {
                store,
                id: Some(subscription.id),
            },
            _entity: PhantomData,
        })
    }

    /// Watch the entity's own collection with its default ordering
    pub async fn watch(store: Arc<dyn DocumentStore>) -> Result<Self> {
        Self::subscribe(store, E::COLLECTION, E::list_query()).await
    }

    /// The next full result set, or `None` once the subscription is gone.
    /// Decoding is permissive, same as the repository reads.
    pub async fn next(&mut self) -> Option<Vec<E>> {
        let snapshot = self.receiver.recv().await?;
        Some(snapshot.iter().map(E::from_document).collect())
    }

    /// Detach the cancellation handle, leaving the snapshot stream behind.
    /// The subscription then lives until the handle is cancelled or dropped.
    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<Vec<Document>>, WatchHandle) {
        (self.receiver, self.handle)
    }
}
