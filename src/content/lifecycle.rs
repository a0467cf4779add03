//! Generic create/update/delete/publish operations over [`Content`] types.
//!
//! Image files are written before the record that references them and removed
//! only after the record stops referencing them, so a stored record never points
//! at a deleted file. A failed write leaves at most an unreferenced new file,
//! which is cleaned up on the spot.

use chrono::Utc;

use super::{non_empty, Content, ContentError};
use crate::assets::{AssetCategory, AssetStore};
use crate::storage::Database;

/// Create a record from a draft, storing its image first when it has one.
pub async fn create<T: Content>(
    db: &Database,
    assets: &AssetStore,
    draft: T::Draft,
) -> Result<T, ContentError> {
    let (mut record, payload) = T::from_draft(draft, Utc::now())?;

    let image = match T::ASSETS {
        Some(category) => match payload {
            Some(payload) => assets.store(category, &payload).await?,
            None => None,
        },
        None => non_empty(payload),
    };
    record.set_image(image);

    if let Err(e) = db.insert(&mut record) {
        if let Some(category) = T::ASSETS {
            discard(assets, category, record.image()).await;
        }
        return Err(e.into());
    }

    tracing::info!(
        kind = T::KIND,
        id = record.id(),
        published = record.published(),
        "Created content"
    );
    Ok(record)
}

/// Apply partial changes to a record.
///
/// An `image` equal to the stored path leaves the file alone, an empty one
/// clears it, and anything else is decoded and replaces the current file.
///
/// The new file is written against a snapshot, then the changes are applied
/// again to the row read inside the write transaction. Concurrent toggles are
/// kept, and if the row was deleted meanwhile the new file is discarded.
pub async fn update<T: Content>(
    db: &Database,
    assets: &AssetStore,
    id: u64,
    changes: T::Changes,
) -> Result<T, ContentError> {
    let snapshot: T = db.get(id)?.ok_or(ContentError::NotFound(T::LABEL))?;

    let mut preview = snapshot.clone();
    let payload = preview
        .apply(changes.clone())?
        .filter(|p| Some(p.as_str()) != snapshot.image());

    let replacement = match (T::ASSETS, payload) {
        (Some(category), Some(payload)) => {
            Some(assets.replace(category, snapshot.image(), &payload).await?)
        }
        _ => None,
    };
    let new_image = replacement
        .as_ref()
        .map(|r| r.path().map(str::to_string));

    let now = Utc::now();
    let mut swapped_out = None;
    let result = db.modify(id, |record: &mut T| -> Result<(), ContentError> {
        let payload = record
            .apply(changes)?
            .filter(|p| Some(p.as_str()) != record.image());

        match (payload, &new_image) {
            (None, _) => {}
            (Some(_), Some(path)) => {
                swapped_out = Some(record.image().map(str::to_string));
                record.set_image(path.clone());
            }
            (Some(url), None) if T::ASSETS.is_none() => record.set_image(non_empty(Some(url))),
            // Managed image named by a path that no longer matches the row
            (Some(_), None) => {}
        }
        record.touch(now);
        Ok(())
    });

    let record = match result.and_then(|r| r.ok_or(ContentError::NotFound(T::LABEL))) {
        Ok(record) => record,
        Err(e) => {
            if let Some(replacement) = replacement {
                replacement.abort().await;
            }
            return Err(e);
        }
    };

    if let Some(replacement) = replacement {
        match swapped_out {
            Some(previous) => {
                replacement.replacing(previous).commit().await;
            }
            None => replacement.abort().await,
        }
    }

    tracing::info!(kind = T::KIND, id, "Updated content");
    Ok(record)
}

/// Delete a record, then release its image.
pub async fn delete<T: Content>(
    db: &Database,
    assets: &AssetStore,
    id: u64,
) -> Result<T, ContentError> {
    let removed: T = db.remove(id)?.ok_or(ContentError::NotFound(T::LABEL))?;

    if let Some(category) = T::ASSETS {
        discard(assets, category, removed.image()).await;
    }

    tracing::info!(kind = T::KIND, id, "Deleted content");
    Ok(removed)
}

/// Flip the published flag.
pub fn toggle_published<T: Content>(db: &Database, id: u64) -> Result<T, ContentError> {
    let now = Utc::now();
    let record = db
        .modify(id, |r: &mut T| -> Result<(), ContentError> {
            r.set_published(!r.published());
            r.touch(now);
            Ok(())
        })?
        .ok_or(ContentError::NotFound(T::LABEL))?;

    tracing::info!(kind = T::KIND, id, published = record.published(), "Toggled publication");
    Ok(record)
}

/// Published records in public order
pub fn list_published<T: Content>(db: &Database) -> Result<Vec<T>, ContentError> {
    Ok(db.find_by(|r: &T| r.published(), T::public_order)?)
}

/// A single published record. Drafts are reported as missing.
pub fn find_published<T: Content>(db: &Database, id: u64) -> Result<T, ContentError> {
    db.get::<T>(id)?
        .filter(|r| r.published())
        .ok_or(ContentError::NotFound(T::LABEL))
}

/// Every record, drafts included, in id order
pub fn list_all<T: Content>(db: &Database) -> Result<Vec<T>, ContentError> {
    Ok(db.all()?)
}

pub fn find<T: Content>(db: &Database, id: u64) -> Result<T, ContentError> {
    db.get(id)?.ok_or(ContentError::NotFound(T::LABEL))
}

async fn discard(assets: &AssetStore, category: AssetCategory, path: Option<&str>) {
    if let Err(e) = assets.release(category, path).await {
        tracing::warn!(%category, path = ?path, error = %e, "Failed to delete asset");
    }
}
