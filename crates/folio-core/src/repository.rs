//! Repository abstraction
//!
//! One interface per entity kind, hiding the document store's wire format
//! from the rest of the crate. A shared [`Repository`] trait carries the
//! five operations every collection supports; per-entity subtraits add the
//! filtered queries. No repository method reaches across collections —
//! cross-entity invariants belong to the content service.
//!
//! Contracts:
//! - `get` on a missing id fails with `NotFound`, never a defaulted record
//! - `create`/`update` fully apply or fail; partial application of a single
//!   document's fields is never observable
//! - `delete` of a missing id fails with `NotFound`, not silent success

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AboutData, AboutPatch, Certification, CertificationPatch, ContactInfo, ContactInfoPatch,
    ContactSubmission, DocumentId, Education, EducationPatch, Experience, ExperiencePatch,
    HomeData, HomePatch, Project, ProjectPatch, Skill, SkillPatch, SkillSection,
    SkillSectionPatch, SubmissionPatch, SubmissionStatus, User,
};

/// The persistence operations every entity collection supports
#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Send + Sync;
    type Patch: Send + Sync;

    /// All records in the collection
    async fn list(&self) -> Result<Vec<Self::Entity>>;

    /// A single record by id
    async fn get(&self, id: &DocumentId) -> Result<Self::Entity>;

    /// Store a new record; the store assigns and returns the id
    async fn create(&self, entity: Self::Entity) -> Result<DocumentId>;

    /// Merge the patch's present fields into an existing record
    async fn update(&self, id: &DocumentId, patch: Self::Patch) -> Result<()>;

    /// Remove a record
    async fn delete(&self, id: &DocumentId) -> Result<()>;
}

/// Work-experience records, plus the "current position" filter
#[async_trait]
pub trait ExperienceRepository:
    Repository<Entity = Experience, Patch = ExperiencePatch>
{
    /// Records with `current == true`
    async fn current(&self) -> Result<Vec<Experience>>;
}

/// Education records, plus the "currently enrolled" filter
#[async_trait]
pub trait EducationRepository: Repository<Entity = Education, Patch = EducationPatch> {
    async fn current(&self) -> Result<Vec<Education>>;
}

/// Project records with the category, featured and technology filters
#[async_trait]
pub trait ProjectRepository: Repository<Entity = Project, Patch = ProjectPatch> {
    async fn featured(&self) -> Result<Vec<Project>>;
    async fn by_category(&self, category: &str) -> Result<Vec<Project>>;
    /// Projects whose technology list contains the exact name
    async fn by_technology(&self, technology: &str) -> Result<Vec<Project>>;
}

/// Skill records with the per-section filter
#[async_trait]
pub trait SkillRepository: Repository<Entity = Skill, Patch = SkillPatch> {
    async fn by_section(&self, section_id: &DocumentId) -> Result<Vec<Skill>>;
}

/// Skill sections with display ordering
#[async_trait]
pub trait SkillSectionRepository:
    Repository<Entity = SkillSection, Patch = SkillSectionPatch>
{
    /// All sections sorted by their `order` field ascending
    async fn ordered(&self) -> Result<Vec<SkillSection>>;
}

/// Certification records with the featured filter
#[async_trait]
pub trait CertificationRepository:
    Repository<Entity = Certification, Patch = CertificationPatch>
{
    async fn featured(&self) -> Result<Vec<Certification>>;
}

/// Contact-form submissions with the workflow-status filter
#[async_trait]
pub trait SubmissionRepository:
    Repository<Entity = ContactSubmission, Patch = SubmissionPatch>
{
    async fn by_status(&self, status: SubmissionStatus) -> Result<Vec<ContactSubmission>>;
}

/// A singleton entity: one logical instance stored as the single document of
/// its collection, created lazily on first `set`
#[async_trait]
pub trait SingletonRepository<E, P>: Send + Sync
where
    E: Send + Sync,
    P: Send + Sync,
{
    /// The instance, or `None` before its first write
    async fn get(&self) -> Result<Option<E>>;

    /// Merge the patch into the instance, creating it from defaults if absent
    async fn set(&self, patch: P) -> Result<()>;
}

/// Admin identities. Read-only: the core checks roles, never mutates them.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>>;
    async fn get(&self, id: &DocumentId) -> Result<User>;
}

/// Convenience aliases for the singleton repositories
pub type HomeRepository = dyn SingletonRepository<HomeData, HomePatch>;
pub type AboutRepository = dyn SingletonRepository<AboutData, AboutPatch>;
pub type ContactInfoRepository = dyn SingletonRepository<ContactInfo, ContactInfoPatch>;
