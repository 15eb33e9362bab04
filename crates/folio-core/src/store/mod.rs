//! Document-store boundary
//!
//! The portfolio's persistence service is an opaque document store: named
//! collections of flat field maps with per-document atomicity, offering
//! get/list/put/update/delete plus push subscriptions. This module defines
//! that boundary as a trait so the whole store can be replaced by a test
//! double, together with the store-native value, query and error types.
//!
//! Nothing above the persistence adapter may see these types; in particular
//! [`Value::Timestamp`] is converted to `chrono` at the adapter and never
//! leaks further.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::mpsc;

/// Store-native timestamp: seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

/// A field value inside a stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// In a `put` this stores an explicit null; in an `update` it deletes
    /// the field
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(Timestamp),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Ordering used by `order_by`; values of different shapes compare equal
    fn cmp_for_order(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// The flat field map of a document
pub type Fields = BTreeMap<String, Value>;

/// A stored document: store-assigned id plus its flat field map
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A single query predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Eq(String, Value),
    /// Field is a list containing value
    ArrayContains(String, Value),
}

/// Sort direction for `order_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A filtered, optionally ordered collection read.
///
/// Only the primitives the store offers: conjunction of equality /
/// membership filters and a single ordering field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order_by: Option<(String, Direction)>,
}

impl Query {
    /// The unfiltered collection
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(Filter::Eq(field.into(), value));
        self
    }

    pub fn filter_contains(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(Filter::ArrayContains(field.into(), value));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Whether a document satisfies every filter
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::ArrayContains(field, value) => doc
                .get(field)
                .and_then(Value::as_list)
                .map_or(false, |items| items.contains(value)),
        })
    }

    /// Apply the ordering clause in place
    pub fn sort(&self, docs: &mut [Document]) {
        let Some((field, direction)) = &self.order_by else {
            return;
        };
        docs.sort_by(|a, b| {
            let ordering = match (a.get(field), b.get(field)) {
                (Some(va), Some(vb)) => va.cmp_for_order(vb),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => std::cmp::Ordering::Equal,
            };
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
}

/// Errors surfaced by the document store itself
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Permission denied by store: {0}")]
    PermissionDenied(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identifier of a registered subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A registered push subscription.
///
/// The receiver yields the full current result set of the subscribed query
/// on every change to the collection; there is no incremental diffing.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: mpsc::UnboundedReceiver<Vec<Document>>,
}

/// The opaque persistence service.
///
/// All operations are asynchronous and atomic per document. `update` merges
/// fields into an existing document and fails with `NotFound` for a missing
/// id; `put` overwrites or creates. Implementations must deliver an initial
/// snapshot on `subscribe` and a fresh snapshot after every change that can
/// affect the subscribed query's result.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;

    /// Run a query against a collection
    async fn list(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>>;

    /// Create a document with a store-assigned id
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Create or fully overwrite a document at a known id
    async fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Merge fields into an existing document; `Value::Null` deletes a field
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Remove a document; `NotFound` if it does not exist
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Register a push subscription for a collection query
    async fn subscribe(&self, collection: &str, query: Query) -> StoreResult<Subscription>;

    /// Unregister a subscription. Best-effort: a snapshot already queued at
    /// cancellation time may still be observed once.
    fn unsubscribe(&self, id: SubscriptionId);
}
