use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{non_empty, required, Content, ContentError};
use crate::assets::AssetCategory;
use crate::storage::models::{
    date_format, Event, Feedback, GalleryItem, ParticularService, Partner, ProfessionalService,
    Sponsor,
};

/// Accessors shared by every content struct (`image`, `published`, `updated_at`).
macro_rules! publishable_fields {
    () => {
        fn image(&self) -> Option<&str> {
            self.image.as_deref()
        }

        fn set_image(&mut self, image: Option<String>) {
            self.image = image;
        }

        fn published(&self) -> bool {
            self.published
        }

        fn set_published(&mut self, published: bool) {
            self.published = published;
        }

        fn touch(&mut self, now: DateTime<Utc>) {
            self.updated_at = now;
        }
    };
}

/// Parse an event date. Accepts the storage format plus the common ISO forms
/// sent by browser date pickers.
pub fn parse_event_date(raw: &str) -> Result<NaiveDateTime, ContentError> {
    let raw = raw.trim();
    const FORMATS: [&str; 4] = [
        date_format::FORMAT,
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];

    for format in FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    // Keep the wall-clock time as written
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.naive_local());
    }
    if let Some(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(date);
    }

    Err(ContentError::Invalid(format!("Invalid date: {raw}")))
}

fn validate_rating(rating: Option<u8>) -> Result<Option<u8>, ContentError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(ContentError::Invalid(
            "rating must be between 1 and 5".to_string(),
        )),
        other => Ok(other),
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub place: String,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl Content for Event {
    type Draft = EventDraft;
    type Changes = EventChanges;

    const LABEL: &'static str = "Event";
    const ASSETS: Option<AssetCategory> = Some(AssetCategory::Events);
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "date",
        "description",
        "place",
        "image",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] =
        &["id", "title", "date", "description", "place", "image"];

    fn from_draft(
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let event = Event {
            id: 0,
            title: required("title", draft.title)?,
            date: parse_event_date(&draft.date)?,
            description: draft.description.trim().to_string(),
            place: draft.place.trim().to_string(),
            image: None,
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((event, draft.image))
    }

    fn apply(&mut self, changes: EventChanges) -> Result<Option<String>, ContentError> {
        if let Some(title) = changes.title {
            self.title = required("title", title)?;
        }
        if let Some(date) = changes.date {
            self.date = parse_event_date(&date)?;
        }
        if let Some(description) = changes.description {
            self.description = description.trim().to_string();
        }
        if let Some(place) = changes.place {
            self.place = place.trim().to_string();
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    /// Newest first
    fn public_order(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
    }

    publishable_fields!();
}

// ============================================================================
// Gallery
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GalleryDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl Content for GalleryItem {
    type Draft = GalleryDraft;
    type Changes = GalleryChanges;

    const LABEL: &'static str = "Gallery item";
    const ASSETS: Option<AssetCategory> = Some(AssetCategory::Gallery);
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "image",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] =
        &["id", "title", "description", "image", "created_at"];

    fn from_draft(
        draft: GalleryDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let item = GalleryItem {
            id: 0,
            title: required("title", draft.title)?,
            description: draft.description.trim().to_string(),
            image: None,
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((item, draft.image))
    }

    fn apply(&mut self, changes: GalleryChanges) -> Result<Option<String>, ContentError> {
        if let Some(title) = changes.title {
            self.title = required("title", title)?;
        }
        if let Some(description) = changes.description {
            self.description = description.trim().to_string();
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    publishable_fields!();
}

// ============================================================================
// Sponsors
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SponsorDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub site_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SponsorChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// An empty string clears the link
    pub site_url: Option<String>,
    pub published: Option<bool>,
}

impl Content for Sponsor {
    type Draft = SponsorDraft;
    type Changes = SponsorChanges;

    const LABEL: &'static str = "Sponsor";
    const ASSETS: Option<AssetCategory> = Some(AssetCategory::Sponsors);
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "image",
        "site_url",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] =
        &["id", "name", "description", "image", "site_url"];

    fn from_draft(
        draft: SponsorDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let sponsor = Sponsor {
            id: 0,
            name: required("name", draft.name)?,
            description: draft.description.trim().to_string(),
            image: None,
            site_url: non_empty(draft.site_url),
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((sponsor, draft.image))
    }

    fn apply(&mut self, changes: SponsorChanges) -> Result<Option<String>, ContentError> {
        if let Some(name) = changes.name {
            self.name = required("name", name)?;
        }
        if let Some(description) = changes.description {
            self.description = description.trim().to_string();
        }
        if changes.site_url.is_some() {
            self.site_url = non_empty(changes.site_url);
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    publishable_fields!();
}

// ============================================================================
// Partners
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PartnerDraft {
    pub name: String,
    pub image: Option<String>,
    pub site_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub site_url: Option<String>,
    pub published: Option<bool>,
}

impl Content for Partner {
    type Draft = PartnerDraft;
    type Changes = PartnerChanges;

    const LABEL: &'static str = "Partner";
    const ASSETS: Option<AssetCategory> = Some(AssetCategory::Partners);
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "image",
        "site_url",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] = &["id", "name", "image", "site_url"];

    fn from_draft(
        draft: PartnerDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let partner = Partner {
            id: 0,
            name: required("name", draft.name)?,
            image: None,
            site_url: non_empty(draft.site_url),
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((partner, draft.image))
    }

    fn apply(&mut self, changes: PartnerChanges) -> Result<Option<String>, ContentError> {
        if let Some(name) = changes.name {
            self.name = required("name", name)?;
        }
        if changes.site_url.is_some() {
            self.site_url = non_empty(changes.site_url);
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    /// Alphabetical, case-insensitive
    fn public_order(a: &Self, b: &Self) -> Ordering {
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    }

    publishable_fields!();
}

// ============================================================================
// Professional services
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProfessionalServiceDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionalServiceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl Content for ProfessionalService {
    type Draft = ProfessionalServiceDraft;
    type Changes = ProfessionalServiceChanges;

    const LABEL: &'static str = "Professional service";
    const ASSETS: Option<AssetCategory> = Some(AssetCategory::ProfessionalServices);
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "image",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] = &["id", "title", "description", "image"];

    fn from_draft(
        draft: ProfessionalServiceDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let service = ProfessionalService {
            id: 0,
            title: required("title", draft.title)?,
            description: draft.description.trim().to_string(),
            image: None,
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((service, draft.image))
    }

    fn apply(
        &mut self,
        changes: ProfessionalServiceChanges,
    ) -> Result<Option<String>, ContentError> {
        if let Some(title) = changes.title {
            self.title = required("title", title)?;
        }
        if let Some(description) = changes.description {
            self.description = description.trim().to_string();
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    publishable_fields!();
}

// ============================================================================
// Particular services (image is an external URL)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ParticularServiceDraft {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticularServiceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl Content for ParticularService {
    type Draft = ParticularServiceDraft;
    type Changes = ParticularServiceChanges;

    const LABEL: &'static str = "Particular service";
    const ASSETS: Option<AssetCategory> = None;
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "image",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] = &["id", "title", "description", "image"];

    fn from_draft(
        draft: ParticularServiceDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let service = ParticularService {
            id: 0,
            title: required("title", draft.title)?,
            description: non_empty(draft.description),
            image: None,
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((service, draft.image))
    }

    fn apply(&mut self, changes: ParticularServiceChanges) -> Result<Option<String>, ContentError> {
        if let Some(title) = changes.title {
            self.title = required("title", title)?;
        }
        if changes.description.is_some() {
            self.description = non_empty(changes.description);
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    /// Alphabetical by title
    fn public_order(a: &Self, b: &Self) -> Ordering {
        a.title.to_lowercase().cmp(&b.title.to_lowercase())
    }

    publishable_fields!();
}

// ============================================================================
// Feedback
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeedbackDraft {
    pub full_name: String,
    pub email: Option<String>,
    pub message: String,
    pub rating: Option<u8>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub rating: Option<u8>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl Content for Feedback {
    type Draft = FeedbackDraft;
    type Changes = FeedbackChanges;

    const LABEL: &'static str = "Feedback";
    const ASSETS: Option<AssetCategory> = None;
    const ADMIN_FIELDS: &'static [&'static str] = &[
        "id",
        "full_name",
        "email",
        "message",
        "rating",
        "image",
        "published",
        "created_at",
        "updated_at",
    ];
    const PUBLIC_FIELDS: &'static [&'static str] =
        &["id", "full_name", "message", "rating", "image", "created_at"];

    fn from_draft(
        draft: FeedbackDraft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError> {
        let feedback = Feedback {
            id: 0,
            full_name: required("full_name", draft.full_name)?,
            email: non_empty(draft.email),
            message: required("message", draft.message)?,
            rating: validate_rating(draft.rating)?,
            image: None,
            published: draft.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        Ok((feedback, draft.image))
    }

    fn apply(&mut self, changes: FeedbackChanges) -> Result<Option<String>, ContentError> {
        if let Some(full_name) = changes.full_name {
            self.full_name = required("full_name", full_name)?;
        }
        if changes.email.is_some() {
            self.email = non_empty(changes.email);
        }
        if let Some(message) = changes.message {
            self.message = required("message", message)?;
        }
        if changes.rating.is_some() {
            self.rating = validate_rating(changes.rating)?;
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        Ok(changes.image)
    }

    /// Most recent first
    fn public_order(a: &Self, b: &Self) -> Ordering {
        b.id.cmp(&a.id)
    }

    publishable_fields!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();

        assert_eq!(parse_event_date("2025-06-01 18:30:00").unwrap(), expected);
        assert_eq!(parse_event_date("2025-06-01T18:30").unwrap(), expected);
        assert_eq!(parse_event_date("2025-06-01T18:30:00").unwrap(), expected);
        assert_eq!(parse_event_date("2025-06-01T18:30:00+02:00").unwrap(), expected);
        assert_eq!(
            parse_event_date("2025-06-01").unwrap(),
            expected.date().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_event_date("next friday").is_err());
    }

    #[test]
    fn test_draft_requires_title() {
        let draft = EventDraft {
            title: "   ".to_string(),
            date: "2025-06-01".to_string(),
            description: String::new(),
            place: String::new(),
            image: None,
            published: None,
        };
        assert!(matches!(
            Event::from_draft(draft, Utc::now()),
            Err(ContentError::Invalid(_))
        ));
    }

    #[test]
    fn test_draft_defaults_to_unpublished() {
        let draft = GalleryDraft {
            title: "Finals".to_string(),
            description: String::new(),
            image: Some("abc".to_string()),
            published: None,
        };
        let (item, payload) = GalleryItem::from_draft(draft, Utc::now()).unwrap();
        assert!(!item.published);
        assert_eq!(item.image, None);
        assert_eq!(payload.as_deref(), Some("abc"));
    }

    #[test]
    fn test_apply_leaves_absent_fields() {
        let now = Utc::now();
        let (mut sponsor, _) = Sponsor::from_draft(
            SponsorDraft {
                name: "Acme".to_string(),
                description: "Rackets".to_string(),
                image: None,
                site_url: Some("https://acme.test".to_string()),
                published: Some(true),
            },
            now,
        )
        .unwrap();

        let payload = sponsor
            .apply(SponsorChanges {
                description: Some("Balls".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(payload, None);
        assert_eq!(sponsor.name, "Acme");
        assert_eq!(sponsor.description, "Balls");
        assert_eq!(sponsor.site_url.as_deref(), Some("https://acme.test"));
        assert!(sponsor.published);

        sponsor
            .apply(SponsorChanges {
                site_url: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(sponsor.site_url, None);
    }

    #[test]
    fn test_feedback_rating_bounds() {
        let draft = |rating| FeedbackDraft {
            full_name: "Ana".to_string(),
            email: None,
            message: "Great courts".to_string(),
            rating,
            image: None,
            published: None,
        };
        assert!(Feedback::from_draft(draft(Some(5)), Utc::now()).is_ok());
        assert!(Feedback::from_draft(draft(None), Utc::now()).is_ok());
        assert!(Feedback::from_draft(draft(Some(0)), Utc::now()).is_err());
        assert!(Feedback::from_draft(draft(Some(6)), Utc::now()).is_err());
    }

    #[test]
    fn test_event_public_order_newest_first() {
        let now = Utc::now();
        let event = |id, date: &str| {
            let (mut e, _) = Event::from_draft(
                EventDraft {
                    title: format!("Event {id}"),
                    date: date.to_string(),
                    description: String::new(),
                    place: String::new(),
                    image: None,
                    published: Some(true),
                },
                now,
            )
            .unwrap();
            e.id = id;
            e
        };

        let older = event(1, "2025-01-01");
        let newer = event(2, "2025-03-01");
        assert_eq!(Event::public_order(&newer, &older), Ordering::Less);
        assert_eq!(Event::public_order(&older, &newer), Ordering::Greater);
    }
}
