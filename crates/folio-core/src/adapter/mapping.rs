//! Entity <-> document mapping
//!
//! Translates domain records to stored documents and back. The two
//! directions are deliberately asymmetric and kept as separate routines:
//!
//! - **strict write**: encode exactly the present fields, omit absent
//!   optionals, never the id (the id is the document key)
//! - **permissive read**: absent or mistyped fields fall back to defaults,
//!   so documents written by an older schema still decode
//!
//! All timestamp conversion between the store-native [`Timestamp`] and
//! `chrono` happens here; the store type never crosses this module.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::models::{
    AboutData, AboutPatch, Certification, CertificationPatch, ContactInfo, ContactInfoPatch,
    ContactSubmission, DocumentId, Education, EducationPatch, Experience, ExperiencePatch,
    HomeData, HomePatch, Project, ProjectPatch, ProjectStatus, Role, Skill, SkillPatch,
    SkillSection, SkillSectionPatch, SocialLink, StatItem, SubmissionPatch, SubmissionStatus,
    TimelineEntry, User,
};
use crate::store::{Direction, Document, Fields, Query, Timestamp, Value};

/// Mapping contract for an entity stored one-document-per-record
pub trait EntityDocument: Sized + Send + Sync + Clone {
    /// Default collection name, before any configured prefix
    const COLLECTION: &'static str;
    type Patch: Send + Sync;

    /// Strict write: the full record as stored fields
    fn to_fields(&self) -> Fields;

    /// Permissive read: decode a stored document, defaulting what's missing
    fn from_document(doc: &Document) -> Self;

    /// Strict write of a partial update; `Value::Null` marks field deletion
    fn patch_fields(patch: &Self::Patch) -> Fields;

    /// Query used for unfiltered listing (entities with a natural display
    /// order override this)
    fn list_query() -> Query {
        Query::all()
    }
}

/// Mapping contract for a singleton entity stored as the single document of
/// its collection
pub trait SingletonDocument: Sized + Send + Sync + Default {
    const COLLECTION: &'static str;
    type Patch: Send + Sync;

    fn to_fields(&self) -> Fields;
    fn from_document(doc: &Document) -> Self;
    fn patch_fields(patch: &Self::Patch) -> Fields;
}

// ==================== Timestamp conversion ====================

pub(crate) fn encode_datetime(dt: DateTime<Utc>) -> Value {
    Value::Timestamp(Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos(),
    })
}

pub(crate) fn decode_datetime(ts: Timestamp) -> DateTime<Utc> {
    Utc.timestamp_opt(ts.seconds, ts.nanos)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// ==================== Read helpers (permissive) ====================

fn get_string(doc: &Document, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn get_opt_string(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(str::to_string)
}

fn get_bool(doc: &Document, key: &str) -> bool {
    doc.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn get_i64(doc: &Document, key: &str) -> i64 {
    doc.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn get_datetime(doc: &Document, key: &str) -> DateTime<Utc> {
    doc.get(key)
        .and_then(Value::as_timestamp)
        .map(decode_datetime)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn get_opt_datetime(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    doc.get(key)
        .and_then(Value::as_timestamp)
        .map(decode_datetime)
}

fn get_string_list(doc: &Document, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn get_id_list(doc: &Document, key: &str) -> Vec<DocumentId> {
    get_string_list(doc, key)
        .into_iter()
        .map(DocumentId::new)
        .collect()
}

fn get_social_links(doc: &Document, key: &str) -> Vec<SocialLink> {
    doc.get(key)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_map)
                .map(|map| SocialLink {
                    platform: map_string(map, "platform"),
                    url: map_string(map, "url"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn map_string(map: &BTreeMap<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ==================== Write helpers (strict) ====================

fn put_str(fields: &mut Fields, key: &str, value: &str) {
    fields.insert(key.to_string(), Value::Str(value.to_string()));
}

fn put_opt_str(fields: &mut Fields, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        put_str(fields, key, value);
    }
}

fn put_bool(fields: &mut Fields, key: &str, value: bool) {
    fields.insert(key.to_string(), Value::Bool(value));
}

fn put_i64(fields: &mut Fields, key: &str, value: i64) {
    fields.insert(key.to_string(), Value::Int(value));
}

fn put_datetime(fields: &mut Fields, key: &str, value: DateTime<Utc>) {
    fields.insert(key.to_string(), encode_datetime(value));
}

fn put_opt_datetime(fields: &mut Fields, key: &str, value: Option<DateTime<Utc>>) {
    if let Some(value) = value {
        put_datetime(fields, key, value);
    }
}

fn put_string_list(fields: &mut Fields, key: &str, values: &[String]) {
    fields.insert(
        key.to_string(),
        Value::List(values.iter().map(|v| Value::Str(v.clone())).collect()),
    );
}

fn put_id_list(fields: &mut Fields, key: &str, values: &[DocumentId]) {
    fields.insert(
        key.to_string(),
        Value::List(
            values
                .iter()
                .map(|v| Value::Str(v.as_str().to_string()))
                .collect(),
        ),
    );
}

fn put_social_links(fields: &mut Fields, key: &str, links: &[SocialLink]) {
    fields.insert(
        key.to_string(),
        Value::List(
            links
                .iter()
                .map(|link| {
                    let mut map = BTreeMap::new();
                    map.insert("platform".to_string(), Value::Str(link.platform.clone()));
                    map.insert("url".to_string(), Value::Str(link.url.clone()));
                    Value::Map(map)
                })
                .collect(),
        ),
    );
}

/// Encode a clearable optional in a patch: `Some(None)` deletes the field
fn put_clearable<T>(fields: &mut Fields, key: &str, value: &Option<Option<T>>, encode: impl Fn(&T) -> Value) {
    match value {
        None => {}
        Some(None) => {
            fields.insert(key.to_string(), Value::Null);
        }
        Some(Some(v)) => {
            fields.insert(key.to_string(), encode(v));
        }
    }
}

// ==================== Experience ====================

impl EntityDocument for Experience {
    const COLLECTION: &'static str = "experiences";
    type Patch = ExperiencePatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "company", &self.company);
        put_str(&mut fields, "position", &self.position);
        put_datetime(&mut fields, "start_date", self.start_date);
        put_opt_datetime(&mut fields, "end_date", self.end_date);
        put_bool(&mut fields, "current", self.current);
        put_string_list(&mut fields, "responsibilities", &self.responsibilities);
        put_string_list(&mut fields, "technologies", &self.technologies);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            company: get_string(doc, "company"),
            position: get_string(doc, "position"),
            start_date: get_datetime(doc, "start_date"),
            end_date: get_opt_datetime(doc, "end_date"),
            current: get_bool(doc, "current"),
            responsibilities: get_string_list(doc, "responsibilities"),
            technologies: get_string_list(doc, "technologies"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "company", patch.company.as_ref());
        put_opt_str(&mut fields, "position", patch.position.as_ref());
        put_opt_datetime(&mut fields, "start_date", patch.start_date);
        put_clearable(&mut fields, "end_date", &patch.end_date, |dt| {
            encode_datetime(*dt)
        });
        if let Some(current) = patch.current {
            put_bool(&mut fields, "current", current);
        }
        if let Some(ref values) = patch.responsibilities {
            put_string_list(&mut fields, "responsibilities", values);
        }
        if let Some(ref values) = patch.technologies {
            put_string_list(&mut fields, "technologies", values);
        }
        fields
    }

    // Timeline view: most recent first
    fn list_query() -> Query {
        Query::all().order_by("start_date", Direction::Descending)
    }
}

// ==================== Project ====================

impl EntityDocument for Project {
    const COLLECTION: &'static str = "projects";
    type Patch = ProjectPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "description", &self.description);
        put_string_list(&mut fields, "technologies", &self.technologies);
        put_str(&mut fields, "category", &self.category);
        put_bool(&mut fields, "featured", self.featured);
        put_opt_str(&mut fields, "cover_image", self.cover_image.as_ref());
        put_opt_datetime(&mut fields, "start_date", self.start_date);
        put_opt_datetime(&mut fields, "end_date", self.end_date);
        if let Some(status) = self.status {
            put_str(&mut fields, "status", status.as_str());
        }
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            title: get_string(doc, "title"),
            description: get_string(doc, "description"),
            technologies: get_string_list(doc, "technologies"),
            category: get_string(doc, "category"),
            featured: get_bool(doc, "featured"),
            cover_image: get_opt_string(doc, "cover_image"),
            start_date: get_opt_datetime(doc, "start_date"),
            end_date: get_opt_datetime(doc, "end_date"),
            status: get_opt_string(doc, "status")
                .map(|s| ProjectStatus::parse(&s)),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "title", patch.title.as_ref());
        put_opt_str(&mut fields, "description", patch.description.as_ref());
        if let Some(ref values) = patch.technologies {
            put_string_list(&mut fields, "technologies", values);
        }
        put_opt_str(&mut fields, "category", patch.category.as_ref());
        if let Some(featured) = patch.featured {
            put_bool(&mut fields, "featured", featured);
        }
        put_clearable(&mut fields, "cover_image", &patch.cover_image, |s| {
            Value::Str(s.clone())
        });
        put_opt_datetime(&mut fields, "start_date", patch.start_date);
        put_clearable(&mut fields, "end_date", &patch.end_date, |dt| {
            encode_datetime(*dt)
        });
        if let Some(status) = patch.status {
            put_str(&mut fields, "status", status.as_str());
        }
        fields
    }

    fn list_query() -> Query {
        Query::all().order_by("start_date", Direction::Descending)
    }
}

// ==================== Skill ====================

impl EntityDocument for Skill {
    const COLLECTION: &'static str = "skills";
    type Patch = SkillPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "name", &self.name);
        put_str(&mut fields, "section_id", self.section_id.as_str());
        put_i64(&mut fields, "proficiency", i64::from(self.proficiency));
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            name: get_string(doc, "name"),
            section_id: DocumentId::new(get_string(doc, "section_id")),
            proficiency: u8::try_from(get_i64(doc, "proficiency")).unwrap_or(1),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "name", patch.name.as_ref());
        if let Some(ref section_id) = patch.section_id {
            put_str(&mut fields, "section_id", section_id.as_str());
        }
        if let Some(proficiency) = patch.proficiency {
            put_i64(&mut fields, "proficiency", i64::from(proficiency));
        }
        fields
    }
}

// ==================== SkillSection ====================

impl EntityDocument for SkillSection {
    const COLLECTION: &'static str = "skill_sections";
    type Patch = SkillSectionPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "title", &self.title);
        put_i64(&mut fields, "order", self.order);
        put_id_list(&mut fields, "skill_ids", &self.skill_ids);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            title: get_string(doc, "title"),
            order: get_i64(doc, "order"),
            skill_ids: get_id_list(doc, "skill_ids"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "title", patch.title.as_ref());
        if let Some(order) = patch.order {
            put_i64(&mut fields, "order", order);
        }
        if let Some(ref ids) = patch.skill_ids {
            put_id_list(&mut fields, "skill_ids", ids);
        }
        fields
    }

    fn list_query() -> Query {
        Query::all().order_by("order", Direction::Ascending)
    }
}

// ==================== Certification ====================

impl EntityDocument for Certification {
    const COLLECTION: &'static str = "certifications";
    type Patch = CertificationPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "issuer", &self.issuer);
        put_i64(&mut fields, "year", i64::from(self.year));
        put_string_list(&mut fields, "skills", &self.skills);
        put_bool(&mut fields, "featured", self.featured);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            title: get_string(doc, "title"),
            issuer: get_string(doc, "issuer"),
            year: i32::try_from(get_i64(doc, "year")).unwrap_or(0),
            skills: get_string_list(doc, "skills"),
            featured: get_bool(doc, "featured"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "title", patch.title.as_ref());
        put_opt_str(&mut fields, "issuer", patch.issuer.as_ref());
        if let Some(year) = patch.year {
            put_i64(&mut fields, "year", i64::from(year));
        }
        if let Some(ref skills) = patch.skills {
            put_string_list(&mut fields, "skills", skills);
        }
        if let Some(featured) = patch.featured {
            put_bool(&mut fields, "featured", featured);
        }
        fields
    }

    fn list_query() -> Query {
        Query::all().order_by("year", Direction::Descending)
    }
}

// ==================== Education ====================

impl EntityDocument for Education {
    const COLLECTION: &'static str = "education";
    type Patch = EducationPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "institution", &self.institution);
        put_str(&mut fields, "degree", &self.degree);
        put_datetime(&mut fields, "start_date", self.start_date);
        put_opt_datetime(&mut fields, "end_date", self.end_date);
        put_bool(&mut fields, "current", self.current);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            institution: get_string(doc, "institution"),
            degree: get_string(doc, "degree"),
            start_date: get_datetime(doc, "start_date"),
            end_date: get_opt_datetime(doc, "end_date"),
            current: get_bool(doc, "current"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "institution", patch.institution.as_ref());
        put_opt_str(&mut fields, "degree", patch.degree.as_ref());
        put_opt_datetime(&mut fields, "start_date", patch.start_date);
        put_clearable(&mut fields, "end_date", &patch.end_date, |dt| {
            encode_datetime(*dt)
        });
        if let Some(current) = patch.current {
            put_bool(&mut fields, "current", current);
        }
        fields
    }

    fn list_query() -> Query {
        Query::all().order_by("start_date", Direction::Descending)
    }
}

// ==================== ContactSubmission ====================

impl EntityDocument for ContactSubmission {
    const COLLECTION: &'static str = "contact_submissions";
    type Patch = SubmissionPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "sender_name", &self.sender_name);
        put_str(&mut fields, "sender_email", &self.sender_email);
        put_str(&mut fields, "message", &self.message);
        put_str(&mut fields, "status", self.status.as_str());
        put_bool(&mut fields, "read", self.read);
        put_bool(&mut fields, "replied", self.replied);
        put_datetime(&mut fields, "created_at", self.created_at);
        put_datetime(&mut fields, "updated_at", self.updated_at);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            id: DocumentId::new(doc.id.clone()),
            sender_name: get_string(doc, "sender_name"),
            sender_email: get_string(doc, "sender_email"),
            message: get_string(doc, "message"),
            status: SubmissionStatus::parse(&get_string(doc, "status")),
            read: get_bool(doc, "read"),
            replied: get_bool(doc, "replied"),
            created_at: get_datetime(doc, "created_at"),
            updated_at: get_datetime(doc, "updated_at"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        if let Some(status) = patch.status {
            put_str(&mut fields, "status", status.as_str());
        }
        if let Some(read) = patch.read {
            put_bool(&mut fields, "read", read);
        }
        if let Some(replied) = patch.replied {
            put_bool(&mut fields, "replied", replied);
        }
        if !fields.is_empty() {
            put_datetime(&mut fields, "updated_at", Utc::now());
        }
        fields
    }

    fn list_query() -> Query {
        Query::all().order_by("created_at", Direction::Descending)
    }
}

// ==================== Singletons ====================

impl SingletonDocument for HomeData {
    const COLLECTION: &'static str = "home";
    type Patch = HomePatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "name", &self.name);
        put_string_list(&mut fields, "taglines", &self.taglines);
        put_str(&mut fields, "bio", &self.bio);
        put_str(&mut fields, "email", &self.email);
        put_opt_str(&mut fields, "profile_image_url", self.profile_image_url.as_ref());
        put_opt_str(&mut fields, "resume_url", self.resume_url.as_ref());
        put_social_links(&mut fields, "social_links", &self.social_links);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            name: get_string(doc, "name"),
            taglines: get_string_list(doc, "taglines"),
            bio: get_string(doc, "bio"),
            email: get_string(doc, "email"),
            profile_image_url: get_opt_string(doc, "profile_image_url"),
            resume_url: get_opt_string(doc, "resume_url"),
            social_links: get_social_links(doc, "social_links"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "name", patch.name.as_ref());
        if let Some(ref taglines) = patch.taglines {
            put_string_list(&mut fields, "taglines", taglines);
        }
        put_opt_str(&mut fields, "bio", patch.bio.as_ref());
        put_opt_str(&mut fields, "email", patch.email.as_ref());
        put_clearable(&mut fields, "profile_image_url", &patch.profile_image_url, |s| {
            Value::Str(s.clone())
        });
        put_clearable(&mut fields, "resume_url", &patch.resume_url, |s| {
            Value::Str(s.clone())
        });
        if let Some(ref links) = patch.social_links {
            put_social_links(&mut fields, "social_links", links);
        }
        fields
    }
}

impl SingletonDocument for AboutData {
    const COLLECTION: &'static str = "about";
    type Patch = AboutPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "intro", &self.intro);
        put_str(&mut fields, "overview", &self.overview);
        put_string_list(&mut fields, "highlights", &self.highlights);
        fields.insert(
            "stats".to_string(),
            Value::List(
                self.stats
                    .iter()
                    .map(|stat| {
                        let mut map = BTreeMap::new();
                        map.insert("label".to_string(), Value::Str(stat.label.clone()));
                        map.insert("value".to_string(), Value::Str(stat.value.clone()));
                        Value::Map(map)
                    })
                    .collect(),
            ),
        );
        fields.insert(
            "timeline".to_string(),
            Value::List(
                self.timeline
                    .iter()
                    .map(|entry| {
                        let mut map = BTreeMap::new();
                        map.insert("year".to_string(), Value::Str(entry.year.clone()));
                        map.insert("title".to_string(), Value::Str(entry.title.clone()));
                        map.insert("detail".to_string(), Value::Str(entry.detail.clone()));
                        Value::Map(map)
                    })
                    .collect(),
            ),
        );
        fields
    }

    fn from_document(doc: &Document) -> Self {
        let stats = doc
            .get("stats")
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_map)
                    .map(|map| StatItem {
                        label: map_string(map, "label"),
                        value: map_string(map, "value"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let timeline = doc
            .get("timeline")
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_map)
                    .map(|map| TimelineEntry {
                        year: map_string(map, "year"),
                        title: map_string(map, "title"),
                        detail: map_string(map, "detail"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            intro: get_string(doc, "intro"),
            overview: get_string(doc, "overview"),
            highlights: get_string_list(doc, "highlights"),
            stats,
            timeline,
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "intro", patch.intro.as_ref());
        put_opt_str(&mut fields, "overview", patch.overview.as_ref());
        if let Some(ref highlights) = patch.highlights {
            put_string_list(&mut fields, "highlights", highlights);
        }
        if let Some(ref stats) = patch.stats {
            let full = AboutData {
                stats: stats.clone(),
                ..Default::default()
            }
            .to_fields();
            fields.insert("stats".to_string(), full["stats"].clone());
        }
        if let Some(ref timeline) = patch.timeline {
            let full = AboutData {
                timeline: timeline.clone(),
                ..Default::default()
            }
            .to_fields();
            fields.insert("timeline".to_string(), full["timeline"].clone());
        }
        fields
    }
}

impl SingletonDocument for ContactInfo {
    const COLLECTION: &'static str = "contact_info";
    type Patch = ContactInfoPatch;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        put_str(&mut fields, "email", &self.email);
        put_opt_str(&mut fields, "phone", self.phone.as_ref());
        put_opt_str(&mut fields, "location", self.location.as_ref());
        put_social_links(&mut fields, "social_links", &self.social_links);
        fields
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            email: get_string(doc, "email"),
            phone: get_opt_string(doc, "phone"),
            location: get_opt_string(doc, "location"),
            social_links: get_social_links(doc, "social_links"),
        }
    }

    fn patch_fields(patch: &Self::Patch) -> Fields {
        let mut fields = Fields::new();
        put_opt_str(&mut fields, "email", patch.email.as_ref());
        put_clearable(&mut fields, "phone", &patch.phone, |s| Value::Str(s.clone()));
        put_clearable(&mut fields, "location", &patch.location, |s| {
            Value::Str(s.clone())
        });
        if let Some(ref links) = patch.social_links {
            put_social_links(&mut fields, "social_links", links);
        }
        fields
    }
}

// ==================== User (read-only) ====================

/// Collection holding admin identities
pub const USERS_COLLECTION: &str = "users";

/// Decode a user document; the core never writes this collection
pub fn user_from_document(doc: &Document) -> User {
    User {
        id: DocumentId::new(doc.id.clone()),
        role: Role::parse(&get_string(doc, "role")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap();
        let value = encode_datetime(dt);
        let ts = value.as_timestamp().unwrap();
        assert_eq!(decode_datetime(ts), dt);
    }

    #[test]
    fn test_experience_fields_round_trip() {
        let mut exp = Experience::new("Acme", "Engineer");
        exp.technologies = vec!["Rust".to_string()];
        exp.responsibilities = vec!["Build things".to_string()];

        let doc = Document {
            id: "e1".to_string(),
            fields: exp.to_fields(),
        };
        let decoded = Experience::from_document(&doc);

        assert_eq!(decoded.id.as_str(), "e1");
        assert_eq!(decoded.company, "Acme");
        assert_eq!(decoded.technologies, vec!["Rust"]);
        // Truncate to second+nanos precision survives the round trip
        assert_eq!(decoded.start_date, exp.start_date);
    }

    #[test]
    fn test_strict_write_omits_absent_optionals() {
        let exp = Experience::new("Acme", "Engineer");
        let fields = exp.to_fields();
        assert!(!fields.contains_key("end_date"));

        let project = Project::new("Folio", "web");
        let fields = project.to_fields();
        assert!(!fields.contains_key("cover_image"));
        assert!(!fields.contains_key("status"));
        assert!(!fields.contains_key("start_date"));
    }

    #[test]
    fn test_permissive_read_fills_defaults() {
        // A document written by an older shape: only a title
        let mut fields = Fields::new();
        put_str(&mut fields, "title", "Old Project");
        let doc = Document {
            id: "p1".to_string(),
            fields,
        };

        let project = Project::from_document(&doc);
        assert_eq!(project.title, "Old Project");
        assert!(project.technologies.is_empty());
        assert!(!project.featured);
        assert!(project.cover_image.is_none());
        assert!(project.status.is_none());
    }

    #[test]
    fn test_permissive_read_tolerates_mistyped_fields() {
        let mut fields = Fields::new();
        fields.insert("company".to_string(), Value::Int(42));
        fields.insert("current".to_string(), Value::Str("yes".to_string()));
        let doc = Document {
            id: "e1".to_string(),
            fields,
        };

        let exp = Experience::from_document(&doc);
        assert_eq!(exp.company, "");
        assert!(!exp.current);
    }

    #[test]
    fn test_patch_clearable_end_date() {
        let patch = ExperiencePatch {
            current: Some(true),
            end_date: Some(None),
            ..Default::default()
        };
        let fields = Experience::patch_fields(&patch);
        assert_eq!(fields.get("end_date"), Some(&Value::Null));
        assert_eq!(fields.get("current"), Some(&Value::Bool(true)));
        assert!(!fields.contains_key("company"));
    }

    #[test]
    fn test_submission_patch_only_carries_workflow_fields() {
        let patch = SubmissionPatch {
            status: Some(SubmissionStatus::Read),
            read: Some(true),
            replied: None,
        };
        let fields = ContactSubmission::patch_fields(&patch);
        assert_eq!(fields.get("status"), Some(&Value::Str("read".to_string())));
        assert_eq!(fields.get("read"), Some(&Value::Bool(true)));
        assert!(!fields.contains_key("replied"));
        // Touching workflow state refreshes updated_at
        assert!(fields.contains_key("updated_at"));
    }

    #[test]
    fn test_empty_submission_patch_is_empty() {
        let fields = ContactSubmission::patch_fields(&SubmissionPatch::default());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_home_social_links_round_trip() {
        let home = HomeData {
            name: "Ada".to_string(),
            social_links: vec![SocialLink {
                platform: "github".to_string(),
                url: "https://github.com/ada".to_string(),
            }],
            ..Default::default()
        };
        let doc = Document {
            id: "main".to_string(),
            fields: home.to_fields(),
        };
        let decoded = HomeData::from_document(&doc);
        assert_eq!(decoded.social_links, home.social_links);
    }

    #[test]
    fn test_about_stats_and_timeline_round_trip() {
        let about = AboutData {
            intro: "Hi".to_string(),
            stats: vec![StatItem {
                label: "Years".to_string(),
                value: "6".to_string(),
            }],
            timeline: vec![TimelineEntry {
                year: "2021".to_string(),
                title: "Joined Acme".to_string(),
                detail: "Backend team".to_string(),
            }],
            ..Default::default()
        };
        let doc = Document {
            id: "main".to_string(),
            fields: about.to_fields(),
        };
        let decoded = AboutData::from_document(&doc);
        assert_eq!(decoded, about);
    }

    #[test]
    fn test_user_decoding() {
        let mut fields = Fields::new();
        put_str(&mut fields, "role", "admin");
        let doc = Document {
            id: "u1".to_string(),
            fields,
        };
        let user = user_from_document(&doc);
        assert_eq!(user.role, Role::Admin);
    }
}
