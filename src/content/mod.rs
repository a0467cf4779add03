//! Publishable content and its draft/published lifecycle.
//!
//! Every content type implements [`Content`]; the generic operations in
//! [`lifecycle`] handle persistence, the publish flag and image ownership the
//! same way for all of them.

pub mod lifecycle;
pub mod projection;
mod types;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::assets::{AssetCategory, AssetError};
use crate::storage::{DatabaseError, Record};

pub use types::*;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A record type that moves between draft and published and may own an image.
pub trait Content: Record + Clone + Send + Sync + 'static {
    /// Request body for creation
    type Draft: DeserializeOwned + Send + 'static;
    /// Request body for partial updates
    type Changes: DeserializeOwned + Clone + Send + 'static;

    /// Human-readable name used in messages ("Event not found")
    const LABEL: &'static str;
    /// Upload directory when the `image` field is a managed asset.
    /// `None` means the field is an opaque URL stored verbatim.
    const ASSETS: Option<AssetCategory>;
    /// Fields shown in the admin console
    const ADMIN_FIELDS: &'static [&'static str];
    /// Fields shown on the public site
    const PUBLIC_FIELDS: &'static [&'static str];

    /// Build a new record from a draft. Returns the record (image unset) and
    /// the raw image payload, if any.
    fn from_draft(
        draft: Self::Draft,
        now: DateTime<Utc>,
    ) -> Result<(Self, Option<String>), ContentError>;

    /// Apply the non-image changes in place and return the raw image payload, if any.
    fn apply(&mut self, changes: Self::Changes) -> Result<Option<String>, ContentError>;

    fn image(&self) -> Option<&str>;
    fn set_image(&mut self, image: Option<String>);
    fn published(&self) -> bool;
    fn set_published(&mut self, published: bool);
    fn touch(&mut self, now: DateTime<Utc>);

    /// Order of public listings. Ties are always broken by ascending id.
    fn public_order(_a: &Self, _b: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// Trim a required text field, rejecting blanks.
pub(crate) fn required(field: &str, value: String) -> Result<String, ContentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContentError::Invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Blank strings count as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
