//! Image assets owned by content records.
//!
//! Every stored image lives at `<upload root>/<category>/<file>` and is
//! referenced from its record by the public path `/uploads/<category>/<file>`.
//! File names are always fresh, so a stored file is never overwritten.

pub mod payload;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::object_store::{ObjectStore, ObjectStoreError};

/// URL prefix under which uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid image data: {0}")]
    InvalidAsset(String),
    #[error("Image exceeds maximum upload size of {max_size} bytes")]
    TooLarge { max_size: u64 },
    #[error("Asset storage error: {0}")]
    Storage(#[from] ObjectStoreError),
}

/// Upload directory of a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Events,
    Gallery,
    Partners,
    ProfessionalServices,
    Sponsors,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Events,
        AssetCategory::Gallery,
        AssetCategory::Partners,
        AssetCategory::ProfessionalServices,
        AssetCategory::Sponsors,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            AssetCategory::Events => "events",
            AssetCategory::Gallery => "gallery",
            AssetCategory::Partners => "partners",
            AssetCategory::ProfessionalServices => "professional-services",
            AssetCategory::Sponsors => "sponsors",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Stores, replaces and releases the images behind content records.
pub struct AssetStore {
    objects: Arc<dyn ObjectStore>,
    max_size: u64,
}

impl AssetStore {
    pub fn new(objects: Arc<dyn ObjectStore>, max_size: u64) -> Self {
        Self { objects, max_size }
    }

    /// Decode `payload` and write it as a new file in the category directory.
    ///
    /// Returns the public path, or `None` when the payload is empty (nothing is written).
    pub async fn store(
        &self,
        category: AssetCategory,
        payload: &str,
    ) -> Result<Option<String>, AssetError> {
        let bytes = match payload::decode(payload, self.max_size)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let key = format!("{}/{}", category.dir_name(), fresh_file_name());
        let byte_size = bytes.len();
        self.objects.put(&key, Bytes::from(bytes)).await?;

        tracing::debug!(%category, key = %key, byte_size, "Stored asset");
        Ok(Some(format!("{PUBLIC_PREFIX}{key}")))
    }

    /// Write the replacement image for a record whose current image is `old_path`.
    ///
    /// The new file is written before anything is deleted. The caller persists
    /// the record with [`Replacement::path`] and then calls
    /// [`Replacement::commit`] to delete the old file, or [`Replacement::abort`]
    /// to discard the new one. An empty payload yields a replacement with no
    /// new path, which clears the image on commit.
    pub async fn replace(
        &self,
        category: AssetCategory,
        old_path: Option<&str>,
        payload: &str,
    ) -> Result<Replacement<'_>, AssetError> {
        let new_path = self.store(category, payload).await?;
        Ok(Replacement {
            store: self,
            category,
            new_path,
            old_path: old_path.map(str::to_string),
        })
    }

    /// Delete the file behind `path` if it exists. Empty paths, paths outside
    /// the category and already-missing files are all no-ops.
    pub async fn release(
        &self,
        category: AssetCategory,
        path: Option<&str>,
    ) -> Result<(), AssetError> {
        let Some(key) = path.and_then(|p| owned_key(category, p)) else {
            return Ok(());
        };

        self.objects.delete(&key).await?;
        tracing::debug!(%category, key = %key, "Released asset");
        Ok(())
    }

    /// Read a stored file by category and file name
    pub async fn read(
        &self,
        category: AssetCategory,
        file_name: &str,
    ) -> Result<Bytes, AssetError> {
        if !is_plain_file_name(file_name) {
            return Err(ObjectStoreError::NotFound(file_name.to_string()).into());
        }
        let key = format!("{}/{}", category.dir_name(), file_name);
        Ok(self.objects.get(&key).await?)
    }
}

/// A written-but-not-yet-committed image swap. See [`AssetStore::replace`].
#[must_use = "a replacement must be committed or aborted"]
pub struct Replacement<'a> {
    store: &'a AssetStore,
    category: AssetCategory,
    new_path: Option<String>,
    old_path: Option<String>,
}

impl Replacement<'_> {
    /// Public path of the new image, `None` when the image is being cleared
    pub fn path(&self) -> Option<&str> {
        self.new_path.as_deref()
    }

    /// Make the commit delete `old_path` instead of the path given to
    /// [`AssetStore::replace`], for when the row changed in between.
    pub fn replacing(mut self, old_path: Option<String>) -> Self {
        self.old_path = old_path;
        self
    }

    /// Delete the previous file and hand back the new path.
    pub async fn commit(self) -> Option<String> {
        if let Err(e) = self
            .store
            .release(self.category, self.old_path.as_deref())
            .await
        {
            tracing::warn!(
                category = %self.category,
                path = ?self.old_path,
                error = %e,
                "Failed to delete replaced asset"
            );
        }
        self.new_path
    }

    /// Delete the newly written file, leaving the previous one in place.
    pub async fn abort(self) {
        if let Err(e) = self
            .store
            .release(self.category, self.new_path.as_deref())
            .await
        {
            tracing::warn!(
                category = %self.category,
                path = ?self.new_path,
                error = %e,
                "Failed to discard new asset"
            );
        }
    }
}

/// `<token>-<token>.png`, two independent v4 UUIDs in simple form.
fn fresh_file_name() -> String {
    format!(
        "{}-{}.png",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Object key for a public path, if the path points into `category`.
pub fn owned_key(category: AssetCategory, path: &str) -> Option<String> {
    let rest = path.strip_prefix(PUBLIC_PREFIX)?;
    let (dir, file_name) = rest.split_once('/')?;
    if dir != category.dir_name() || !is_plain_file_name(file_name) {
        return None;
    }
    Some(format!("{dir}/{file_name}"))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.starts_with('.')
}
