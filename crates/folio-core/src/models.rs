//! Data models for Folio
//!
//! Defines the eleven content entity kinds of the portfolio, plus the patch
//! structs used for partial updates. Records are plain data: the invariants
//! described on each type are contracts checked by the [`ContentService`],
//! never by the records themselves.
//!
//! [`ContentService`]: crate::service::ContentService

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the document store on creation.
///
/// A freshly constructed record carries an empty id until the store assigns
/// one; `create` operations return the assigned id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing store identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for a record the store has not assigned an id to yet
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A social profile reference shown in the site header and contact card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform name, e.g. "github"
    pub platform: String,
    pub url: String,
}

/// Singleton: landing-page content. Exactly one instance exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeData {
    pub name: String,
    /// Rotating taglines shown under the name
    pub taglines: Vec<String>,
    pub bio: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub resume_url: Option<String>,
    pub social_links: Vec<SocialLink>,
}

/// A label/value pair in the about-page stats row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub label: String,
    pub value: String,
}

/// An entry on the about-page timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub year: String,
    pub title: String,
    pub detail: String,
}

/// Singleton: about-page content. Exactly one instance exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutData {
    pub intro: String,
    pub overview: String,
    pub highlights: Vec<String>,
    pub stats: Vec<StatItem>,
    pub timeline: Vec<TimelineEntry>,
}

/// A work-experience entry.
///
/// Invariants: `current == true` implies `end_date` is absent, and at most
/// one record in the collection is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: DocumentId,
    pub company: String,
    pub position: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Marks an ongoing position
    pub current: bool,
    pub responsibilities: Vec<String>,
    pub technologies: Vec<String>,
}

impl Experience {
    /// Create a new entry starting now, with no id assigned yet
    pub fn new(company: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            id: DocumentId::default(),
            company: company.into(),
            position: position.into(),
            start_date: Utc::now(),
            end_date: None,
            current: false,
            responsibilities: Vec::new(),
            technologies: Vec::new(),
        }
    }
}

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planned,
    #[default]
    InProgress,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Permissive parse; unknown strings fall back to the default
    pub fn parse(s: &str) -> Self {
        match s {
            "planned" => Self::Planned,
            "completed" => Self::Completed,
            "archived" => Self::Archived,
            _ => Self::InProgress,
        }
    }
}

/// A portfolio project.
///
/// Invariants: title length >= 3; technologies non-empty; `featured == true`
/// implies a cover image is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DocumentId,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub category: String,
    pub featured: bool,
    pub cover_image: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    /// Create a new project; start date and status are filled in by the
    /// service on create when left empty
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: DocumentId::default(),
            title: title.into(),
            description: String::new(),
            technologies: Vec::new(),
            category: category.into(),
            featured: false,
            cover_image: None,
            start_date: None,
            end_date: None,
            status: None,
        }
    }
}

/// A single skill, grouped under a [`SkillSection`].
///
/// Invariants: proficiency in [1, 5]; `section_id` references an existing
/// section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: DocumentId,
    pub name: String,
    pub section_id: DocumentId,
    /// 1 (familiar) to 5 (expert)
    pub proficiency: u8,
}

/// A named group of skills with a display position.
///
/// Invariant: `order` is unique across sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSection {
    pub id: DocumentId,
    pub title: String,
    pub order: i64,
    pub skill_ids: Vec<DocumentId>,
}

/// A certification or award.
///
/// Invariant: `year` is not in the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub id: DocumentId,
    pub title: String,
    pub issuer: String,
    pub year: i32,
    pub skills: Vec<String>,
    pub featured: bool,
}

/// An education entry. Same current/end-date rule as [`Experience`], but no
/// cross-record uniqueness is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: DocumentId,
    pub institution: String,
    pub degree: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub current: bool,
}

/// Singleton: contact-page details. Exactly one instance exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub social_links: Vec<SocialLink>,
}

/// Workflow state of a contact-form submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }

    /// Permissive parse; unknown strings fall back to the default
    pub fn parse(s: &str) -> Self {
        match s {
            "read" => Self::Read,
            "replied" => Self::Replied,
            "archived" => Self::Archived,
            _ => Self::New,
        }
    }
}

/// A message sent through the public contact form.
///
/// Immutable after creation except for `status`, `read` and `replied` (the
/// patch type only carries those fields). Message length must be within
/// [10, 5000] and the sender email well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: DocumentId,
    pub sender_name: String,
    pub sender_email: String,
    pub message: String,
    pub status: SubmissionStatus,
    pub read: bool,
    pub replied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Create a submission in its initial state
    pub fn new(
        sender_name: impl Into<String>,
        sender_email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::default(),
            sender_name: sender_name.into(),
            sender_email: sender_email.into(),
            message: message.into(),
            status: SubmissionStatus::New,
            read: false,
            replied: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Role held by an admin-panel identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// An identity known to the admin surface. Read-only for this crate: the
/// core consults roles for authorization and never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DocumentId,
    pub role: Role,
}

// ==================== Patches ====================
//
// One patch struct per mutable entity. `None` leaves a field unchanged; for
// clearable optionals the nested `Option` distinguishes "clear the stored
// field" (`Some(None)`) from "leave it alone" (`None`).

#[derive(Debug, Clone, Default)]
pub struct HomePatch {
    pub name: Option<String>,
    pub taglines: Option<Vec<String>>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<Option<String>>,
    pub resume_url: Option<Option<String>>,
    pub social_links: Option<Vec<SocialLink>>,
}

#[derive(Debug, Clone, Default)]
pub struct AboutPatch {
    pub intro: Option<String>,
    pub overview: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub stats: Option<Vec<StatItem>>,
    pub timeline: Option<Vec<TimelineEntry>>,
}

#[derive(Debug, Clone, Default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub current: Option<bool>,
    pub responsibilities: Option<Vec<String>>,
    pub technologies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub cover_image: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub section_id: Option<DocumentId>,
    pub proficiency: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct SkillSectionPatch {
    pub title: Option<String>,
    pub order: Option<i64>,
    pub skill_ids: Option<Vec<DocumentId>>,
}

#[derive(Debug, Clone, Default)]
pub struct CertificationPatch {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub year: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub current: Option<bool>,
}

/// The only mutable surface of a submission after creation
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
    pub status: Option<SubmissionStatus>,
    pub read: Option<bool>,
    pub replied: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactInfoPatch {
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub social_links: Option<Vec<SocialLink>>,
}
