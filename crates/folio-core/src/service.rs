//! Content service
//!
//! The single surface the presentation layer talks to. Composes the
//! per-entity repositories, validates every mutation against the declared
//! invariants (validation failures abort before any write), maintains the
//! invariants that span more than one document, and computes the derived
//! views the site renders.
//!
//! All mutating operations except the public contact form require the admin
//! capability, consumed through [`AdminAccess`]. Read operations are open.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, warn};

use crate::adapter::{StoreRepository, StoreSingleton, StoreUserRepository};
use crate::config::Collections;
use crate::error::{Error, Result};
use crate::models::{
    AboutData, AboutPatch, Certification, CertificationPatch, ContactInfo, ContactInfoPatch,
    ContactSubmission, DocumentId, Education, EducationPatch, Experience, ExperiencePatch,
    HomeData, HomePatch, Project, ProjectPatch, ProjectStatus, Role, Skill, SkillPatch,
    SkillSection, SkillSectionPatch, SubmissionPatch, User,
};
use crate::repository::{
    AboutRepository, CertificationRepository, ContactInfoRepository, EducationRepository,
    ExperienceRepository, HomeRepository, ProjectRepository, SkillRepository,
    SkillSectionRepository, SubmissionRepository, UserRepository,
};
use crate::store::DocumentStore;

/// The admin capability check, supplied by the external identity provider.
/// The core never manages credentials, sessions or tokens.
#[async_trait]
pub trait AdminAccess: Send + Sync {
    /// Does the current caller hold the admin role?
    async fn is_admin(&self) -> bool;
}

/// A capability that never changes; useful for tests and trusted tooling
pub struct FixedAccess(pub bool);

#[async_trait]
impl AdminAccess for FixedAccess {
    async fn is_admin(&self) -> bool {
        self.0
    }
}

/// Capability check backed by the stored identity records: the caller is an
/// admin when their user document carries the admin role
pub struct UserGate {
    users: Arc<dyn UserRepository>,
    caller: DocumentId,
}

impl UserGate {
    pub fn new(users: Arc<dyn UserRepository>, caller: DocumentId) -> Self {
        Self { users, caller }
    }
}

#[async_trait]
impl AdminAccess for UserGate {
    async fn is_admin(&self) -> bool {
        match self.users.get(&self.caller).await {
            Ok(user) => user.role == Role::Admin,
            Err(_) => false,
        }
    }
}

/// The repository set the service composes over.
///
/// Explicit construction, no global instance: build this once (usually via
/// [`Repositories::over_store`]) and hand it to [`ContentService::new`].
pub struct Repositories {
    pub home: Arc<HomeRepository>,
    pub about: Arc<AboutRepository>,
    pub contact_info: Arc<ContactInfoRepository>,
    pub experiences: Arc<dyn ExperienceRepository>,
    pub education: Arc<dyn EducationRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub skills: Arc<dyn SkillRepository>,
    pub skill_sections: Arc<dyn SkillSectionRepository>,
    pub certifications: Arc<dyn CertificationRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Wire every repository to the given document store
    pub fn over_store(store: Arc<dyn DocumentStore>, collections: &Collections) -> Self {
        Self {
            home: Arc::new(StoreSingleton::<HomeData>::new(
                store.clone(),
                collections.home.clone(),
            )),
            about: Arc::new(StoreSingleton::<AboutData>::new(
                store.clone(),
                collections.about.clone(),
            )),
            contact_info: Arc::new(StoreSingleton::<ContactInfo>::new(
                store.clone(),
                collections.contact_info.clone(),
            )),
            experiences: Arc::new(StoreRepository::<Experience>::new(
                store.clone(),
                collections.experiences.clone(),
            )),
            education: Arc::new(StoreRepository::<Education>::new(
                store.clone(),
                collections.education.clone(),
            )),
            projects: Arc::new(StoreRepository::<Project>::new(
                store.clone(),
                collections.projects.clone(),
            )),
            skills: Arc::new(StoreRepository::<Skill>::new(
                store.clone(),
                collections.skills.clone(),
            )),
            skill_sections: Arc::new(StoreRepository::<SkillSection>::new(
                store.clone(),
                collections.skill_sections.clone(),
            )),
            certifications: Arc::new(StoreRepository::<Certification>::new(
                store.clone(),
                collections.certifications.clone(),
            )),
            submissions: Arc::new(StoreRepository::<ContactSubmission>::new(
                store.clone(),
                collections.contact_submissions.clone(),
            )),
            users: Arc::new(StoreUserRepository::new(store, collections.users.clone())),
        }
    }
}

/// A skill section joined with its skills, proficiency descending
#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub section: SkillSection,
    pub skills: Vec<Skill>,
}

/// Certifications of a single issuer, most recent year first
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerCertifications {
    pub issuer: String,
    pub certifications: Vec<Certification>,
}

/// The content service (see module docs)
pub struct ContentService {
    repos: Repositories,
    access: Arc<dyn AdminAccess>,
}

impl ContentService {
    /// Compose the service from repositories and a capability check
    pub fn new(repos: Repositories, access: Arc<dyn AdminAccess>) -> Self {
        Self { repos, access }
    }

    /// Convenience: wire everything to a document store
    pub fn over_store(
        store: Arc<dyn DocumentStore>,
        collections: &Collections,
        access: Arc<dyn AdminAccess>,
    ) -> Self {
        Self::new(Repositories::over_store(store, collections), access)
    }

    /// The stored identity for an admin-panel user id
    pub async fn user(&self, id: &DocumentId) -> Result<User> {
        self.repos.users.get(id).await
    }

    async fn require_admin(&self) -> Result<()> {
        if self.access.is_admin().await {
            Ok(())
        } else {
            Err(Error::PermissionDenied("admin role required".to_string()))
        }
    }

    // ==================== Singletons ====================

    pub async fn home(&self) -> Result<Option<HomeData>> {
        self.repos.home.get().await
    }

    pub async fn update_home(&self, patch: HomePatch) -> Result<()> {
        self.require_admin().await?;
        if let Some(ref email) = patch.email {
            if !valid_email(email) {
                return Err(Error::validation("email", "not a valid email address"));
            }
        }
        self.repos.home.set(patch).await
    }

    pub async fn about(&self) -> Result<Option<AboutData>> {
        self.repos.about.get().await
    }

    pub async fn update_about(&self, patch: AboutPatch) -> Result<()> {
        self.require_admin().await?;
        self.repos.about.set(patch).await
    }

    pub async fn contact_info(&self) -> Result<Option<ContactInfo>> {
        self.repos.contact_info.get().await
    }

    pub async fn update_contact_info(&self, patch: ContactInfoPatch) -> Result<()> {
        self.require_admin().await?;
        if let Some(ref email) = patch.email {
            if !valid_email(email) {
                return Err(Error::validation("email", "not a valid email address"));
            }
        }
        self.repos.contact_info.set(patch).await
    }

    // ==================== Experience ====================

    pub async fn experiences(&self) -> Result<Vec<Experience>> {
        self.repos.experiences.list().await
    }

    pub async fn experience(&self, id: &DocumentId) -> Result<Experience> {
        self.repos.experiences.get(id).await
    }

    /// The ongoing position, if any
    pub async fn current_experience(&self) -> Result<Option<Experience>> {
        Ok(self.repos.experiences.current().await?.into_iter().next())
    }

    pub async fn create_experience(&self, experience: Experience) -> Result<DocumentId> {
        self.require_admin().await?;
        validate_experience(&experience)?;
        if experience.current {
            self.demote_current_experiences(None).await?;
        }
        let id = self.repos.experiences.create(experience).await?;
        info!(id = %id, "experience created");
        Ok(id)
    }

    pub async fn update_experience(
        &self,
        id: &DocumentId,
        mut patch: ExperiencePatch,
    ) -> Result<()> {
        self.require_admin().await?;
        // Fetch first: the patch merges into stored state, so the invariant
        // has to hold for the merged record, and a missing id must surface
        // before the demotion pass touches anything else
        let existing = self.repos.experiences.get(id).await?;
        if let Some(ref company) = patch.company {
            if company.trim().is_empty() {
                return Err(Error::validation("company", "must not be empty"));
            }
        }
        if let Some(ref position) = patch.position {
            if position.trim().is_empty() {
                return Err(Error::validation("position", "must not be empty"));
            }
        }
        if patch.current == Some(true) {
            if matches!(patch.end_date, Some(Some(_))) {
                return Err(Error::validation(
                    "end_date",
                    "a current position cannot have an end date",
                ));
            }
            // Becoming current clears any stored end date
            patch.end_date = Some(None);
            self.demote_current_experiences(Some(id)).await?;
        } else {
            let current = patch.current.unwrap_or(existing.current);
            let end_date = match patch.end_date {
                None => existing.end_date,
                Some(value) => value,
            };
            if current && end_date.is_some() {
                return Err(Error::validation(
                    "end_date",
                    "a current position cannot have an end date",
                ));
            }
        }
        self.repos.experiences.update(id, patch).await
    }

    pub async fn delete_experience(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.experiences.delete(id).await
    }

    /// Demote every current record other than `except` to ended-now.
    ///
    /// Read-then-write over separate documents with no transaction: two
    /// concurrent callers can both pass the read and leave two current
    /// records behind. Accepted limitation; the anomaly is logged when the
    /// read observes it.
    async fn demote_current_experiences(&self, except: Option<&DocumentId>) -> Result<()> {
        let current = self.repos.experiences.current().await?;
        let others: Vec<&Experience> = current
            .iter()
            .filter(|e| Some(&e.id) != except)
            .collect();
        if others.len() > 1 {
            warn!(
                count = others.len(),
                "multiple current experience records observed; demoting all"
            );
        }
        for experience in others {
            debug!(id = %experience.id, "demoting previous current experience");
            self.repos
                .experiences
                .update(
                    &experience.id,
                    ExperiencePatch {
                        current: Some(false),
                        end_date: Some(Some(Utc::now())),
                        ..Default::default()
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// Total years across all experience records: sum of month spans (end or
    /// now), floor-divided by twelve
    pub async fn years_of_experience(&self) -> Result<i64> {
        let now = Utc::now();
        let experiences = self.repos.experiences.list().await?;
        let months: i64 = experiences
            .iter()
            .map(|e| months_between(e.start_date, e.end_date.unwrap_or(now)))
            .sum();
        Ok(months / 12)
    }

    // ==================== Education ====================

    pub async fn education_history(&self) -> Result<Vec<Education>> {
        self.repos.education.list().await
    }

    pub async fn create_education(&self, education: Education) -> Result<DocumentId> {
        self.require_admin().await?;
        validate_education(&education)?;
        self.repos.education.create(education).await
    }

    pub async fn update_education(&self, id: &DocumentId, mut patch: EducationPatch) -> Result<()> {
        self.require_admin().await?;
        let existing = self.repos.education.get(id).await?;
        if let Some(ref institution) = patch.institution {
            if institution.trim().is_empty() {
                return Err(Error::validation("institution", "must not be empty"));
            }
        }
        if patch.current == Some(true) {
            if matches!(patch.end_date, Some(Some(_))) {
                return Err(Error::validation(
                    "end_date",
                    "a current enrollment cannot have an end date",
                ));
            }
            patch.end_date = Some(None);
        } else {
            // Same merged-state check as experiences
            let current = patch.current.unwrap_or(existing.current);
            let end_date = match patch.end_date {
                None => existing.end_date,
                Some(value) => value,
            };
            if current && end_date.is_some() {
                return Err(Error::validation(
                    "end_date",
                    "a current enrollment cannot have an end date",
                ));
            }
        }
        self.repos.education.update(id, patch).await
    }

    pub async fn delete_education(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.education.delete(id).await
    }

    // ==================== Projects ====================

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.repos.projects.list().await
    }

    pub async fn project(&self, id: &DocumentId) -> Result<Project> {
        self.repos.projects.get(id).await
    }

    pub async fn featured_projects(&self) -> Result<Vec<Project>> {
        self.repos.projects.featured().await
    }

    pub async fn projects_by_category(&self, category: &str) -> Result<Vec<Project>> {
        self.repos.projects.by_category(category).await
    }

    /// Exact technology-name membership, evaluated by the store
    pub async fn projects_by_technology(&self, technology: &str) -> Result<Vec<Project>> {
        self.repos.projects.by_technology(technology).await
    }

    /// Case-insensitive substring match over title, description and the
    /// technology list. Linear scan; no index.
    pub async fn search_projects(&self, term: &str) -> Result<Vec<Project>> {
        let needle = term.to_lowercase();
        let projects = self.repos.projects.list().await?;
        Ok(projects
            .into_iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.technologies
                        .iter()
                        .any(|t| t.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn create_project(&self, mut project: Project) -> Result<DocumentId> {
        self.require_admin().await?;
        // Defaults applied before validation
        if project.start_date.is_none() {
            project.start_date = Some(Utc::now());
        }
        if project.status.is_none() {
            project.status = Some(ProjectStatus::InProgress);
        }
        validate_project(
            &project.title,
            &project.technologies,
            project.featured,
            project.cover_image.as_deref(),
        )?;
        let id = self.repos.projects.create(project).await?;
        info!(id = %id, "project created");
        Ok(id)
    }

    pub async fn update_project(&self, id: &DocumentId, patch: ProjectPatch) -> Result<()> {
        self.require_admin().await?;
        let existing = self.repos.projects.get(id).await?;
        let title = patch.title.as_deref().unwrap_or(&existing.title);
        let technologies = patch
            .technologies
            .as_deref()
            .unwrap_or(&existing.technologies);
        let featured = patch.featured.unwrap_or(existing.featured);
        let cover_image = match &patch.cover_image {
            None => existing.cover_image.as_deref(),
            Some(value) => value.as_deref(),
        };
        validate_project(title, technologies, featured, cover_image)?;
        self.repos.projects.update(id, patch).await
    }

    pub async fn delete_project(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.projects.delete(id).await
    }

    // ==================== Skills ====================

    pub async fn skills(&self) -> Result<Vec<Skill>> {
        self.repos.skills.list().await
    }

    pub async fn skill_sections(&self) -> Result<Vec<SkillSection>> {
        self.repos.skill_sections.ordered().await
    }

    /// Sections in display order, each joined with its skills sorted by
    /// proficiency descending
    pub async fn skill_groups(&self) -> Result<Vec<SkillGroup>> {
        let sections = self.repos.skill_sections.ordered().await?;
        let skills = self.repos.skills.list().await?;
        Ok(sections
            .into_iter()
            .map(|section| {
                let mut group: Vec<Skill> = skills
                    .iter()
                    .filter(|s| s.section_id == section.id)
                    .cloned()
                    .collect();
                group.sort_by(|a, b| b.proficiency.cmp(&a.proficiency));
                SkillGroup {
                    section,
                    skills: group,
                }
            })
            .collect())
    }

    pub async fn create_skill(&self, skill: Skill) -> Result<DocumentId> {
        self.require_admin().await?;
        validate_skill_shape(&skill.name, skill.proficiency)?;
        self.require_section_exists(&skill.section_id).await?;
        self.repos.skills.create(skill).await
    }

    pub async fn update_skill(&self, id: &DocumentId, patch: SkillPatch) -> Result<()> {
        self.require_admin().await?;
        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::validation("name", "must not be empty"));
            }
        }
        if let Some(proficiency) = patch.proficiency {
            if !(1..=5).contains(&proficiency) {
                return Err(Error::validation("proficiency", "must be between 1 and 5"));
            }
        }
        if let Some(ref section_id) = patch.section_id {
            self.require_section_exists(section_id).await?;
        }
        self.repos.skills.update(id, patch).await
    }

    pub async fn delete_skill(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.skills.delete(id).await
    }

    async fn require_section_exists(&self, section_id: &DocumentId) -> Result<()> {
        match self.repos.skill_sections.get(section_id).await {
            Ok(_) => Ok(()),
            Err(Error::NotFound { .. }) => Err(Error::validation(
                "section_id",
                "references a missing skill section",
            )),
            Err(err) => Err(err),
        }
    }

    pub async fn create_skill_section(&self, section: SkillSection) -> Result<DocumentId> {
        self.require_admin().await?;
        if section.title.trim().is_empty() {
            return Err(Error::validation("title", "must not be empty"));
        }
        self.require_unique_order(section.order, None).await?;
        self.repos.skill_sections.create(section).await
    }

    pub async fn update_skill_section(
        &self,
        id: &DocumentId,
        patch: SkillSectionPatch,
    ) -> Result<()> {
        self.require_admin().await?;
        if let Some(ref title) = patch.title {
            if title.trim().is_empty() {
                return Err(Error::validation("title", "must not be empty"));
            }
        }
        if let Some(order) = patch.order {
            self.require_unique_order(order, Some(id)).await?;
        }
        self.repos.skill_sections.update(id, patch).await
    }

    /// Remove a section. Refused while any skill still references it, so
    /// skills never end up pointing at a missing section.
    pub async fn delete_skill_section(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        let members = self.repos.skills.by_section(id).await?;
        if !members.is_empty() {
            return Err(Error::validation(
                "section_id",
                "skills still reference this section",
            ));
        }
        self.repos.skill_sections.delete(id).await
    }

    async fn require_unique_order(&self, order: i64, except: Option<&DocumentId>) -> Result<()> {
        let sections = self.repos.skill_sections.list().await?;
        let taken = sections
            .iter()
            .any(|s| s.order == order && Some(&s.id) != except);
        if taken {
            Err(Error::validation(
                "order",
                "another section already uses this position",
            ))
        } else {
            Ok(())
        }
    }

    // ==================== Certifications ====================

    pub async fn certifications(&self) -> Result<Vec<Certification>> {
        self.repos.certifications.list().await
    }

    pub async fn featured_certifications(&self) -> Result<Vec<Certification>> {
        self.repos.certifications.featured().await
    }

    /// Grouped by issuer (alphabetical), most recent year first per group
    pub async fn certifications_by_issuer(&self) -> Result<Vec<IssuerCertifications>> {
        let certifications = self.repos.certifications.list().await?;
        let mut groups: BTreeMap<String, Vec<Certification>> = BTreeMap::new();
        for certification in certifications {
            groups
                .entry(certification.issuer.clone())
                .or_default()
                .push(certification);
        }
        Ok(groups
            .into_iter()
            .map(|(issuer, mut certifications)| {
                certifications.sort_by(|a, b| b.year.cmp(&a.year));
                IssuerCertifications {
                    issuer,
                    certifications,
                }
            })
            .collect())
    }

    pub async fn create_certification(&self, certification: Certification) -> Result<DocumentId> {
        self.require_admin().await?;
        validate_certification(
            &certification.title,
            &certification.issuer,
            certification.year,
        )?;
        self.repos.certifications.create(certification).await
    }

    pub async fn update_certification(
        &self,
        id: &DocumentId,
        patch: CertificationPatch,
    ) -> Result<()> {
        self.require_admin().await?;
        let existing = self.repos.certifications.get(id).await?;
        let title = patch.title.as_deref().unwrap_or(&existing.title);
        let issuer = patch.issuer.as_deref().unwrap_or(&existing.issuer);
        let year = patch.year.unwrap_or(existing.year);
        validate_certification(title, issuer, year)?;
        self.repos.certifications.update(id, patch).await
    }

    pub async fn delete_certification(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.certifications.delete(id).await
    }

    // ==================== Contact submissions ====================

    /// Accept a visitor message from the public contact form. The one
    /// unauthenticated mutation: a new submission always starts with status
    /// "new" and unread/unreplied flags regardless of the caller.
    pub async fn submit_contact(
        &self,
        sender_name: impl Into<String>,
        sender_email: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<DocumentId> {
        let submission = ContactSubmission::new(sender_name, sender_email, message);
        validate_submission(&submission)?;
        let id = self.repos.submissions.create(submission).await?;
        info!(id = %id, "contact submission received");
        Ok(id)
    }

    pub async fn submissions(&self) -> Result<Vec<ContactSubmission>> {
        self.repos.submissions.list().await
    }

    pub async fn update_submission_status(
        &self,
        id: &DocumentId,
        patch: SubmissionPatch,
    ) -> Result<()> {
        self.require_admin().await?;
        self.repos.submissions.update(id, patch).await
    }

    pub async fn delete_submission(&self, id: &DocumentId) -> Result<()> {
        self.require_admin().await?;
        self.repos.submissions.delete(id).await
    }
}

// ==================== Validation ====================

fn validate_experience(experience: &Experience) -> Result<()> {
    if experience.company.trim().is_empty() {
        return Err(Error::validation("company", "must not be empty"));
    }
    if experience.position.trim().is_empty() {
        return Err(Error::validation("position", "must not be empty"));
    }
    if experience.current && experience.end_date.is_some() {
        return Err(Error::validation(
            "end_date",
            "a current position cannot have an end date",
        ));
    }
    Ok(())
}

fn validate_education(education: &Education) -> Result<()> {
    if education.institution.trim().is_empty() {
        return Err(Error::validation("institution", "must not be empty"));
    }
    if education.degree.trim().is_empty() {
        return Err(Error::validation("degree", "must not be empty"));
    }
    if education.current && education.end_date.is_some() {
        return Err(Error::validation(
            "end_date",
            "a current enrollment cannot have an end date",
        ));
    }
    Ok(())
}

fn validate_project(
    title: &str,
    technologies: &[String],
    featured: bool,
    cover_image: Option<&str>,
) -> Result<()> {
    if title.chars().count() < 3 {
        return Err(Error::validation("title", "must be at least 3 characters"));
    }
    if technologies.is_empty() {
        return Err(Error::validation(
            "technologies",
            "at least one technology is required",
        ));
    }
    if featured && cover_image.is_none() {
        return Err(Error::validation(
            "cover_image",
            "a featured project needs a cover image",
        ));
    }
    Ok(())
}

fn validate_skill_shape(name: &str, proficiency: u8) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    if !(1..=5).contains(&proficiency) {
        return Err(Error::validation("proficiency", "must be between 1 and 5"));
    }
    Ok(())
}

fn validate_certification(title: &str, issuer: &str, year: i32) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title", "must not be empty"));
    }
    if issuer.trim().is_empty() {
        return Err(Error::validation("issuer", "must not be empty"));
    }
    if year > Utc::now().year() {
        return Err(Error::validation("year", "cannot be in the future"));
    }
    Ok(())
}

fn validate_submission(submission: &ContactSubmission) -> Result<()> {
    if submission.sender_name.trim().is_empty() {
        return Err(Error::validation("sender_name", "must not be empty"));
    }
    if !valid_email(&submission.sender_email) {
        return Err(Error::validation(
            "sender_email",
            "not a valid email address",
        ));
    }
    let length = submission.message.chars().count();
    if !(10..=5000).contains(&length) {
        return Err(Error::validation(
            "message",
            "must be between 10 and 5000 characters",
        ));
    }
    Ok(())
}

/// Minimal well-formedness: one '@', non-empty local part, dotted domain
fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Whole months between two instants by calendar arithmetic, never negative
fn months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let months = i64::from(end.year() - start.year()) * 12
        + (i64::from(end.month()) - i64::from(start.month()));
    months.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Collections;
    use crate::models::SubmissionStatus;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn service_with_access(admin: bool) -> ContentService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        ContentService::over_store(
            store,
            &Collections::default(),
            Arc::new(FixedAccess(admin)),
        )
    }

    fn service() -> ContentService {
        service_with_access(true)
    }

    fn project(title: &str, technologies: &[&str]) -> Project {
        let mut p = Project::new(title, "web");
        p.technologies = technologies.iter().map(|t| t.to_string()).collect();
        p
    }

    fn date(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
    }

    // ---------- validation boundaries ----------

    #[tokio::test]
    async fn test_project_title_length_boundary() {
        let svc = service();
        let err = svc
            .create_project(project("ab", &["Rust"]))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("title"));

        assert!(svc.create_project(project("abc", &["Rust"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_project_requires_technologies() {
        let svc = service();
        let err = svc.create_project(project("Folio", &[])).await.unwrap_err();
        assert_eq!(err.field(), Some("technologies"));
    }

    #[tokio::test]
    async fn test_featured_project_requires_cover_image() {
        let svc = service();
        let mut p = project("Folio", &["Rust"]);
        p.featured = true;
        let err = svc.create_project(p.clone()).await.unwrap_err();
        assert_eq!(err.field(), Some("cover_image"));

        p.cover_image = Some("cover.png".to_string());
        assert!(svc.create_project(p).await.is_ok());
    }

    #[tokio::test]
    async fn test_certification_year_boundary() {
        let svc = service();
        let this_year = Utc::now().year();
        let cert = |year| Certification {
            id: DocumentId::default(),
            title: "Cert".to_string(),
            issuer: "Org".to_string(),
            year,
            skills: Vec::new(),
            featured: false,
        };

        let err = svc.create_certification(cert(this_year + 1)).await.unwrap_err();
        assert_eq!(err.field(), Some("year"));

        assert!(svc.create_certification(cert(this_year)).await.is_ok());
    }

    #[tokio::test]
    async fn test_submission_message_length_boundary() {
        let svc = service();
        let err = svc
            .submit_contact("Ada", "ada@example.com", "123456789")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("message"));

        assert!(svc
            .submit_contact("Ada", "ada@example.com", "1234567890")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_submission_rejects_malformed_email() {
        let svc = service();
        for bad in ["not-an-email", "@example.com", "ada@", "ada@nodot"] {
            let err = svc
                .submit_contact("Ada", bad, "a message long enough")
                .await
                .unwrap_err();
            assert_eq!(err.field(), Some("sender_email"), "email: {bad}");
        }
    }

    #[tokio::test]
    async fn test_validation_aborts_before_any_write() {
        let svc = service();
        let mut p = project("Folio", &["Rust"]);
        p.featured = true;
        let _ = svc.create_project(p).await;
        assert!(svc.projects().await.unwrap().is_empty());
    }

    // ---------- defaults ----------

    #[tokio::test]
    async fn test_project_defaults_on_create() {
        let svc = service();
        let id = svc.create_project(project("Folio", &["Rust"])).await.unwrap();
        let stored = svc.project(&id).await.unwrap();
        assert!(stored.start_date.is_some());
        assert_eq!(stored.status, Some(ProjectStatus::InProgress));
    }

    #[tokio::test]
    async fn test_submission_starts_in_initial_state() {
        let svc = service();
        let id = svc
            .submit_contact("Ada", "ada@example.com", "a message long enough")
            .await
            .unwrap();
        let stored = svc
            .submissions()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap();
        assert_eq!(stored.status, SubmissionStatus::New);
        assert!(!stored.read);
        assert!(!stored.replied);
    }

    // ---------- single-current invariant ----------

    #[tokio::test]
    async fn test_creating_second_current_demotes_first() {
        let svc = service();
        let mut first = Experience::new("First Co", "Dev");
        first.current = true;
        let first_id = svc.create_experience(first).await.unwrap();

        let mut second = Experience::new("Second Co", "Dev");
        second.current = true;
        svc.create_experience(second).await.unwrap();

        let current = svc.repos.experiences.current().await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].company, "Second Co");

        let demoted = svc.experience(&first_id).await.unwrap();
        assert!(!demoted.current);
        assert!(demoted.end_date.is_some());
    }

    #[tokio::test]
    async fn test_updating_to_current_demotes_others_and_clears_end_date() {
        let svc = service();
        let mut current = Experience::new("Current Co", "Dev");
        current.current = true;
        svc.create_experience(current).await.unwrap();

        let mut past = Experience::new("Past Co", "Dev");
        past.end_date = Some(date(2022, 6));
        let past_id = svc.create_experience(past).await.unwrap();

        svc.update_experience(
            &past_id,
            ExperiencePatch {
                current: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let current = svc.repos.experiences.current().await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, past_id);
        assert!(current[0].end_date.is_none());
    }

    #[tokio::test]
    async fn test_setting_end_date_on_current_experience_rejected() {
        let svc = service();
        let mut exp = Experience::new("Acme", "Dev");
        exp.current = true;
        let id = svc.create_experience(exp).await.unwrap();

        // The patch alone looks harmless; merged with the stored record it
        // would produce a current position with an end date
        let err = svc
            .update_experience(
                &id,
                ExperiencePatch {
                    end_date: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("end_date"));

        let stored = svc.experience(&id).await.unwrap();
        assert!(stored.current);
        assert!(stored.end_date.is_none());
    }

    #[tokio::test]
    async fn test_setting_end_date_on_current_education_rejected() {
        let svc = service();
        let id = svc
            .create_education(Education {
                id: DocumentId::default(),
                institution: "MIT".to_string(),
                degree: "BSc".to_string(),
                start_date: date(2020, 9),
                end_date: None,
                current: true,
            })
            .await
            .unwrap();

        let err = svc
            .update_education(
                &id,
                EducationPatch {
                    end_date: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("end_date"));
    }

    #[tokio::test]
    async fn test_update_missing_experience_leaves_others_untouched() {
        let svc = service();
        let mut current = Experience::new("Current Co", "Dev");
        current.current = true;
        let current_id = svc.create_experience(current).await.unwrap();

        let err = svc
            .update_experience(
                &DocumentId::new("missing"),
                ExperiencePatch {
                    current: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        // NotFound surfaced before any demotion write
        let stored = svc.experience(&current_id).await.unwrap();
        assert!(stored.current);
        assert!(stored.end_date.is_none());
    }

    #[tokio::test]
    async fn test_current_experience_with_end_date_rejected() {
        let svc = service();
        let mut exp = Experience::new("Acme", "Dev");
        exp.current = true;
        exp.end_date = Some(Utc::now());
        let err = svc.create_experience(exp).await.unwrap_err();
        assert_eq!(err.field(), Some("end_date"));
    }

    #[tokio::test]
    async fn test_education_allows_multiple_current() {
        // Unlike Experience, no cross-record uniqueness applies
        let svc = service();
        for institution in ["MIT", "Stanford"] {
            svc.create_education(Education {
                id: DocumentId::default(),
                institution: institution.to_string(),
                degree: "BSc".to_string(),
                start_date: date(2020, 9),
                end_date: None,
                current: true,
            })
            .await
            .unwrap();
        }
        let current: Vec<Education> = svc
            .education_history()
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.current)
            .collect();
        assert_eq!(current.len(), 2);
    }

    // ---------- derived views ----------

    #[tokio::test]
    async fn test_years_of_experience_floors_months() {
        let svc = service();
        // Exactly 12 months
        let mut a = Experience::new("A", "Dev");
        a.start_date = date(2020, 1);
        a.end_date = Some(date(2021, 1));
        svc.create_experience(a).await.unwrap();
        // Exactly 6 months
        let mut b = Experience::new("B", "Dev");
        b.start_date = date(2022, 3);
        b.end_date = Some(date(2022, 9));
        svc.create_experience(b).await.unwrap();

        assert_eq!(svc.years_of_experience().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_technologies() {
        let svc = service();
        svc.create_project(project("Portfolio Site", &["React"]))
            .await
            .unwrap();
        svc.create_project(project("Inventory API", &["Go"]))
            .await
            .unwrap();

        let results = svc.search_projects("react").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Portfolio Site");
    }

    #[tokio::test]
    async fn test_skill_groups_ordering() {
        let svc = service();
        let backend = svc
            .create_skill_section(SkillSection {
                id: DocumentId::default(),
                title: "Backend".to_string(),
                order: 2,
                skill_ids: Vec::new(),
            })
            .await
            .unwrap();
        let languages = svc
            .create_skill_section(SkillSection {
                id: DocumentId::default(),
                title: "Languages".to_string(),
                order: 1,
                skill_ids: Vec::new(),
            })
            .await
            .unwrap();

        for (name, section, proficiency) in [
            ("Rust", &languages, 5),
            ("Python", &languages, 3),
            ("Postgres", &backend, 4),
        ] {
            svc.create_skill(Skill {
                id: DocumentId::default(),
                name: name.to_string(),
                section_id: section.clone(),
                proficiency,
            })
            .await
            .unwrap();
        }

        let groups = svc.skill_groups().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].section.title, "Languages");
        let names: Vec<&str> = groups[0].skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python"]);
        assert_eq!(groups[1].section.title, "Backend");
    }

    #[tokio::test]
    async fn test_certifications_grouped_by_issuer() {
        let svc = service();
        for (title, issuer, year) in [
            ("Old Cloud", "Acme Org", 2019),
            ("New Cloud", "Acme Org", 2023),
            ("Databases", "Beta Org", 2021),
        ] {
            svc.create_certification(Certification {
                id: DocumentId::default(),
                title: title.to_string(),
                issuer: issuer.to_string(),
                year,
                skills: Vec::new(),
                featured: false,
            })
            .await
            .unwrap();
        }

        let groups = svc.certifications_by_issuer().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].issuer, "Acme Org");
        let years: Vec<i32> = groups[0].certifications.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2023, 2019]);
    }

    // ---------- cross-entity references ----------

    #[tokio::test]
    async fn test_skill_requires_existing_section() {
        let svc = service();
        let err = svc
            .create_skill(Skill {
                id: DocumentId::default(),
                name: "Rust".to_string(),
                section_id: DocumentId::new("missing"),
                proficiency: 5,
            })
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("section_id"));
    }

    #[tokio::test]
    async fn test_skill_proficiency_bounds() {
        let svc = service();
        let section = svc
            .create_skill_section(SkillSection {
                id: DocumentId::default(),
                title: "Languages".to_string(),
                order: 1,
                skill_ids: Vec::new(),
            })
            .await
            .unwrap();
        for proficiency in [0u8, 6] {
            let err = svc
                .create_skill(Skill {
                    id: DocumentId::default(),
                    name: "Rust".to_string(),
                    section_id: section.clone(),
                    proficiency,
                })
                .await
                .unwrap_err();
            assert_eq!(err.field(), Some("proficiency"));
        }
    }

    #[tokio::test]
    async fn test_delete_section_refused_while_skills_reference_it() {
        let svc = service();
        let section = svc
            .create_skill_section(SkillSection {
                id: DocumentId::default(),
                title: "Languages".to_string(),
                order: 1,
                skill_ids: Vec::new(),
            })
            .await
            .unwrap();
        let skill = svc
            .create_skill(Skill {
                id: DocumentId::default(),
                name: "Rust".to_string(),
                section_id: section.clone(),
                proficiency: 5,
            })
            .await
            .unwrap();

        let err = svc.delete_skill_section(&section).await.unwrap_err();
        assert_eq!(err.field(), Some("section_id"));
        assert_eq!(svc.skill_sections().await.unwrap().len(), 1);

        // Emptied sections delete normally
        svc.delete_skill(&skill).await.unwrap();
        svc.delete_skill_section(&section).await.unwrap();
        assert!(svc.skill_sections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_section_order_must_be_unique() {
        let svc = service();
        let mk = |title: &str, order| SkillSection {
            id: DocumentId::default(),
            title: title.to_string(),
            order,
            skill_ids: Vec::new(),
        };
        svc.create_skill_section(mk("Languages", 1)).await.unwrap();
        let err = svc
            .create_skill_section(mk("Backend", 1))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("order"));
    }

    // ---------- authorization ----------

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let svc = service_with_access(false);
        let err = svc
            .create_project(project("Folio", &["Rust"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let err = svc.update_home(HomePatch::default()).await.unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_reads_and_contact_form_are_public() {
        let svc = service_with_access(false);
        assert!(svc.projects().await.is_ok());
        assert!(svc.home().await.is_ok());
        assert!(svc
            .submit_contact("Ada", "ada@example.com", "a message long enough")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_user_gate_reads_stored_role() {
        let store = Arc::new(MemoryStore::new());
        let mut fields = crate::store::Fields::new();
        fields.insert(
            "role".to_string(),
            crate::store::Value::Str("admin".to_string()),
        );
        store.put("users", "u1", fields).await.unwrap();

        let users = Arc::new(StoreUserRepository::with_default_collection(store.clone()));
        let admin = UserGate::new(users.clone(), DocumentId::new("u1"));
        assert!(admin.is_admin().await);

        let unknown = UserGate::new(users, DocumentId::new("u2"));
        assert!(!unknown.is_admin().await);
    }

    // ---------- singletons ----------

    #[tokio::test]
    async fn test_singletons_created_on_first_update() {
        let svc = service();
        assert!(svc.home().await.unwrap().is_none());

        svc.update_home(HomePatch {
            name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(svc.home().await.unwrap().unwrap().name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_update_home_rejects_bad_email() {
        let svc = service();
        let err = svc
            .update_home(HomePatch {
                email: Some("nope".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    // ---------- error propagation ----------

    #[tokio::test]
    async fn test_delete_missing_project_is_not_found() {
        let svc = service();
        let err = svc.delete_project(&DocumentId::new("missing")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_offline_store_surfaces_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let svc = ContentService::over_store(
            store.clone(),
            &Collections::default(),
            Arc::new(FixedAccess(true)),
        );
        store.set_offline(true);

        let err = svc.projects().await.unwrap_err();
        assert!(err.is_retryable());
    }

    // ---------- months helper ----------

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2020, 1), date(2021, 1)), 12);
        assert_eq!(months_between(date(2022, 3), date(2022, 9)), 6);
        assert_eq!(months_between(date(2022, 9), date(2022, 3)), 0);
    }

    // ---------- property: single-current post-condition ----------

    mod props {
        use super::*;
        use proptest::prelude::*;

        /// One step of a randomized admin session touching the current flag
        #[derive(Debug, Clone)]
        enum Op {
            CreateCurrent,
            CreatePast,
            PromoteNth(usize),
            DemoteNth(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::CreateCurrent),
                Just(Op::CreatePast),
                (0usize..8).prop_map(Op::PromoteNth),
                (0usize..8).prop_map(Op::DemoteNth),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]
            #[test]
            fn at_most_one_current_experience(ops in proptest::collection::vec(op_strategy(), 1..12)) {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(async move {
                    let svc = service();
                    let mut ids: Vec<DocumentId> = Vec::new();
                    for op in ops {
                        match op {
                            Op::CreateCurrent => {
                                let mut exp = Experience::new("Co", "Dev");
                                exp.current = true;
                                ids.push(svc.create_experience(exp).await.unwrap());
                            }
                            Op::CreatePast => {
                                let mut exp = Experience::new("Co", "Dev");
                                exp.end_date = Some(Utc::now());
                                ids.push(svc.create_experience(exp).await.unwrap());
                            }
                            Op::PromoteNth(n) => {
                                if let Some(id) = ids.get(n % ids.len().max(1)) {
                                    svc.update_experience(id, ExperiencePatch {
                                        current: Some(true),
                                        ..Default::default()
                                    }).await.unwrap();
                                }
                            }
                            Op::DemoteNth(n) => {
                                if let Some(id) = ids.get(n % ids.len().max(1)) {
                                    svc.update_experience(id, ExperiencePatch {
                                        current: Some(false),
                                        end_date: Some(Some(Utc::now())),
                                        ..Default::default()
                                    }).await.unwrap();
                                }
                            }
                        }
                        // Sequential post-condition; does not hold under
                        // true concurrency (read-then-write race)
                        let current = svc.repos.experiences.current().await.unwrap();
                        prop_assert!(current.len() <= 1, "found {} current records", current.len());
                    }
                    Ok(())
                })?;
            }
        }
    }
}
