use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::records::Record;
use super::tables::*;

/// Three-state patch value for partial updates that survives serialization round-trips.
/// Unlike `Option<Option<T>>`, each variant has a distinct wire representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Field was not included in the request (no change).
    #[default]
    Absent,
    /// Field was explicitly set to null (clear it).
    Null,
    /// Field was set to a new value.
    Value(T),
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(v: Option<Option<T>>) -> Self {
        match v {
            None => Patch::Absent,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Value(v),
        }
    }
}

impl<T> Patch<T> {
    /// Apply the patch to an optional field.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *field = None,
            Patch::Value(v) => *field = Some(v),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

/// Wire/storage format for event dates: `YYYY-MM-DD HH:MM:SS`.
pub mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Publishable content
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    #[serde(with = "date_format")]
    pub date: NaiveDateTime,
    pub description: String,
    pub place: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalService {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Services for individual players. The image is an external URL, not an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticularService {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer testimonial shown on the public site once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub message: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Contact requests
// ============================================================================

/// Review state of a contact request. On the wire this is `null` (pending),
/// `false` (rejected) or `true` (resolved).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum ContactStatus {
    #[default]
    Pending,
    Rejected,
    Resolved,
}

impl From<Option<bool>> for ContactStatus {
    fn from(v: Option<bool>) -> Self {
        match v {
            None => ContactStatus::Pending,
            Some(false) => ContactStatus::Rejected,
            Some(true) => ContactStatus::Resolved,
        }
    }
}

impl From<ContactStatus> for Option<bool> {
    fn from(status: ContactStatus) -> Self {
        match status {
            ContactStatus::Pending => None,
            ContactStatus::Rejected => Some(false),
            ContactStatus::Resolved => Some(true),
        }
    }
}

impl ContactStatus {
    /// Flip a reviewed status. Pending requests have no opposite and yield `None`.
    pub fn toggled(self) -> Option<Self> {
        match self {
            ContactStatus::Pending => None,
            ContactStatus::Rejected => Some(ContactStatus::Resolved),
            ContactStatus::Resolved => Some(ContactStatus::Rejected),
        }
    }
}

/// Topic a visitor picks when sending a contact request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub subject_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub password_hash: String,
    /// Token id (`jti`) of the single active session
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub session_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

macro_rules! impl_record {
    ($ty:ty, $table:expr, $kind:literal) => {
        impl Record for $ty {
            const TABLE: redb::TableDefinition<'static, u64, &'static [u8]> = $table;
            const KIND: &'static str = $kind;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}

impl_record!(Event, EVENTS, "event");
impl_record!(GalleryItem, GALLERY, "gallery");
impl_record!(Sponsor, SPONSORS, "sponsor");
impl_record!(Partner, PARTNERS, "partner");
impl_record!(ProfessionalService, PROFESSIONAL_SERVICES, "professional_service");
impl_record!(ParticularService, PARTICULAR_SERVICES, "particular_service");
impl_record!(Feedback, FEEDBACK, "feedback");
impl_record!(Subject, SUBJECTS, "subject");
impl_record!(Contact, CONTACTS, "contact");
impl_record!(User, USERS, "user");
