//! Folio Core Library
//!
//! This crate provides the content layer of Folio, a content-managed
//! personal portfolio site: typed entities, per-entity repositories over an
//! opaque document store, and the content service that validates and
//! orchestrates every operation the site performs.
//!
//! # Architecture
//!
//! - **Document store**: schemaless collections of field/value documents
//!   behind the [`store::DocumentStore`] trait; [`store::MemoryStore`] is
//!   the in-process implementation used by tests and local development
//! - **Repositories**: one typed interface per entity kind, backed by a
//!   generic adapter that owns the wire mapping
//! - **Content service**: validation, cross-entity invariants, derived
//!   views and the admin capability gate, all in one place
//!
//! # Quick Start
//!
//! ```text
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//! let service = ContentService::over_store(
//!     store,
//!     &Config::load()?.collections(),
//!     Arc::new(FixedAccess(true)),
//! );
//!
//! let id = service.create_project(project).await?;
//! let featured = service.featured_projects().await?;
//! ```
//!
//! # Modules
//!
//! - `service`: content service (main entry point)
//! - `models`: entity and patch structures
//! - `repository`: per-entity persistence interfaces
//! - `adapter`: document-store-backed repository implementations
//! - `store`: the document store boundary and in-memory implementation
//! - `live`: push subscriptions and optimistic edits
//! - `config`: application configuration

pub mod adapter;
pub mod config;
pub mod error;
pub mod live;
pub mod models;
pub mod repository;
pub mod service;
pub mod store;

pub use config::{Collections, Config};
pub use error::{Error, Result};
pub use live::{LiveQuery, OptimisticList, WatchHandle};
pub use models::{
    AboutData, Certification, ContactInfo, ContactSubmission, DocumentId, Education, Experience,
    HomeData, Project, ProjectStatus, Role, Skill, SkillSection, SubmissionStatus, User,
};
pub use service::{AdminAccess, ContentService, FixedAccess, Repositories, UserGate};
pub use store::{DocumentStore, MemoryStore};
