//! Persistence adapter
//!
//! Implements the repository traits against a [`DocumentStore`]. One generic
//! [`StoreRepository`] covers the shared CRUD surface for every
//! one-document-per-record entity via its [`EntityDocument`] mapping;
//! per-entity impls add the filtered queries built from the store's
//! primitives. Store errors are converted into the core taxonomy here and
//! the store's native types never cross this module.

pub mod mapping;

pub use mapping::{EntityDocument, SingletonDocument};

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    Certification, ContactSubmission, DocumentId, Education, Experience, Project, Skill,
    SkillSection, SubmissionStatus, User,
};
use crate::repository::{
    CertificationRepository, EducationRepository, ExperienceRepository, ProjectRepository,
    Repository, SingletonRepository, SkillRepository, SkillSectionRepository,
    SubmissionRepository, UserRepository,
};
use crate::store::{DocumentStore, Query, StoreError, Value};

/// Document id under which each singleton entity is stored
const SINGLETON_DOC_ID: &str = "main";

/// Generic store-backed repository for a one-document-per-record entity
pub struct StoreRepository<E> {
    store: Arc<dyn DocumentStore>,
    collection: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityDocument> StoreRepository<E> {
    /// Bind to an explicit collection name (prefixed deployments)
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            _entity: PhantomData,
        }
    }

    /// Bind to the entity's default collection name
    pub fn with_default_collection(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, E::COLLECTION)
    }

    /// The collection this repository reads and writes
    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn run(&self, query: Query) -> Result<Vec<E>> {
        let docs = self.store.list(&self.collection, &query).await?;
        Ok(docs.iter().map(E::from_document).collect())
    }
}

#[async_trait]
impl<E: EntityDocument + 'static> Repository for StoreRepository<E> {
    type Entity = E;
    type Patch = E::Patch;

    async fn list(&self) -> Result<Vec<E>> {
        self.run(E::list_query()).await
    }

    async fn get(&self, id: &DocumentId) -> Result<E> {
        let doc = self.store.get(&self.collection, id.as_str()).await?;
        Ok(E::from_document(&doc))
    }

    async fn create(&self, entity: E) -> Result<DocumentId> {
        let id = self.store.create(&self.collection, entity.to_fields()).await?;
        debug!(collection = %self.collection, id = %id, "record created");
        Ok(DocumentId::new(id))
    }

    async fn update(&self, id: &DocumentId, patch: E::Patch) -> Result<()> {
        let fields = E::patch_fields(&patch);
        self.store
            .update(&self.collection, id.as_str(), fields)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.store.delete(&self.collection, id.as_str()).await?;
        debug!(collection = %self.collection, id = %id, "record deleted");
        Ok(())
    }
}

#[async_trait]
impl ExperienceRepository for StoreRepository<Experience> {
    async fn current(&self) -> Result<Vec<Experience>> {
        self.run(Query::all().filter_eq("current", Value::Bool(true)))
            .await
    }
}

#[async_trait]
impl EducationRepository for StoreRepository<Education> {
    async fn current(&self) -> Result<Vec<Education>> {
        self.run(Query::all().filter_eq("current", Value::Bool(true)))
            .await
    }
}

#[async_trait]
impl ProjectRepository for StoreRepository<Project> {
    async fn featured(&self) -> Result<Vec<Project>> {
        self.run(Query::all().filter_eq("featured", Value::Bool(true)))
            .await
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Project>> {
        self.run(Query::all().filter_eq("category", Value::Str(category.to_string())))
            .await
    }

    async fn by_technology(&self, technology: &str) -> Result<Vec<Project>> {
        self.run(Query::all().filter_contains("technologies", Value::Str(technology.to_string())))
            .await
    }
}

#[async_trait]
impl SkillRepository for StoreRepository<Skill> {
    async fn by_section(&self, section_id: &DocumentId) -> Result<Vec<Skill>> {
        self.run(Query::all().filter_eq("section_id", Value::Str(section_id.as_str().to_string())))
            .await
    }
}

#[async_trait]
impl SkillSectionRepository for StoreRepository<SkillSection> {
    async fn ordered(&self) -> Result<Vec<SkillSection>> {
        // list_query already orders by the order field
        self.list().await
    }
}

#[async_trait]
impl CertificationRepository for StoreRepository<Certification> {
    async fn featured(&self) -> Result<Vec<Certification>> {
        self.run(Query::all().filter_eq("featured", Value::Bool(true)))
            .await
    }
}

#[async_trait]
impl SubmissionRepository for StoreRepository<ContactSubmission> {
    async fn by_status(&self, status: SubmissionStatus) -> Result<Vec<ContactSubmission>> {
        self.run(Query::all().filter_eq("status", Value::Str(status.as_str().to_string())))
            .await
    }
}

/// Store-backed repository for a singleton entity, created lazily on first
/// write
pub struct StoreSingleton<E> {
    store: Arc<dyn DocumentStore>,
    collection: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SingletonDocument> StoreSingleton<E> {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            _entity: PhantomData,
        }
    }

    pub fn with_default_collection(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, E::COLLECTION)
    }
}

#[async_trait]
impl<E: SingletonDocument + 'static> SingletonRepository<E, E::Patch> for StoreSingleton<E> {
    async fn get(&self) -> Result<Option<E>> {
        match self.store.get(&self.collection, SINGLETON_DOC_ID).await {
            Ok(doc) => Ok(Some(E::from_document(&doc))),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, patch: E::Patch) -> Result<()> {
        let fields = E::patch_fields(&patch);
        match self
            .store
            .update(&self.collection, SINGLETON_DOC_ID, fields.clone())
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                // First write: start from defaults and overlay the patch
                let mut full = E::default().to_fields();
                for (field, value) in fields {
                    if value == Value::Null {
                        full.remove(&field);
                    } else {
                        full.insert(field, value);
                    }
                }
                debug!(collection = %self.collection, "singleton created on first update");
                self.store
                    .put(&self.collection, SINGLETON_DOC_ID, full)
                    .await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Read-only view of the admin identities collection
pub struct StoreUserRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn with_default_collection(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, mapping::USERS_COLLECTION)
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn list(&self) -> Result<Vec<User>> {
        let docs = self.store.list(&self.collection, &Query::all()).await?;
        Ok(docs.iter().map(mapping::user_from_document).collect())
    }

    async fn get(&self, id: &DocumentId) -> Result<User> {
        let doc = self.store.get(&self.collection, id.as_str()).await?;
        Ok(mapping::user_from_document(&doc))
    }
}
