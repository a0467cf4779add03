use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use padel_cms::assets::{AssetCategory, AssetError, AssetStore};
use padel_cms::object_store::LocalStore;

const PNG_BASE64: &str = "iVBORw0KGgo=";

fn test_store(dir: &tempfile::TempDir) -> AssetStore {
    let objects = LocalStore::new(dir.path()).unwrap();
    AssetStore::new(Arc::new(objects), 1024)
}

/// Map a public `/uploads/...` path to the file under the upload root.
fn disk_path(root: &Path, public_path: &str) -> std::path::PathBuf {
    root.join(public_path.trim_start_matches("/uploads/"))
}

fn files_in(root: &Path, category: AssetCategory) -> usize {
    match std::fs::read_dir(root.join(category.dir_name())) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

fn is_token(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[tokio::test]
async fn test_store_data_url_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let path = store
        .store(AssetCategory::Events, "data:image/png;base64,iVBORw0KGgo=")
        .await
        .unwrap()
        .expect("payload should be stored");

    let file_name = path
        .strip_prefix("/uploads/events/")
        .expect("path should be in the events category");
    let stem = file_name.strip_suffix(".png").unwrap();
    let (first, second) = stem.split_once('-').unwrap();
    assert!(is_token(first) && is_token(second), "unexpected name {file_name}");

    let bytes = std::fs::read(disk_path(dir.path(), &path)).unwrap();
    assert_eq!(STANDARD.encode(bytes), PNG_BASE64);
}

#[tokio::test]
async fn test_store_raw_base64_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let payload = STANDARD.encode(b"court booking sheet");

    let path = store
        .store(AssetCategory::Gallery, &payload)
        .await
        .unwrap()
        .unwrap();

    let read = store
        .read(AssetCategory::Gallery, path.rsplit('/').next().unwrap())
        .await
        .unwrap();
    assert_eq!(&read[..], b"court booking sheet");
}

#[tokio::test]
async fn test_store_empty_payload_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    assert_eq!(store.store(AssetCategory::Sponsors, "").await.unwrap(), None);
    assert_eq!(store.store(AssetCategory::Sponsors, "   ").await.unwrap(), None);
    assert_eq!(files_in(dir.path(), AssetCategory::Sponsors), 0);
}

#[tokio::test]
async fn test_store_names_are_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let a = store.store(AssetCategory::Partners, PNG_BASE64).await.unwrap();
    let b = store.store(AssetCategory::Partners, PNG_BASE64).await.unwrap();
    assert_ne!(a, b);
    assert_eq!(files_in(dir.path(), AssetCategory::Partners), 2);
}

#[tokio::test]
async fn test_malformed_payloads_leave_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    for payload in [
        "not base64!",
        "data:image/png;base64",
        "data:image/png;base64,",
        "====",
    ] {
        let result = store.store(AssetCategory::Events, payload).await;
        assert!(
            matches!(result, Err(AssetError::InvalidAsset(_))),
            "payload {payload:?} should be rejected"
        );
    }
    assert_eq!(files_in(dir.path(), AssetCategory::Events), 0);
}

#[tokio::test]
async fn test_oversized_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let payload = STANDARD.encode(vec![0u8; 2048]);

    let result = store.store(AssetCategory::Gallery, &payload).await;
    assert!(matches!(result, Err(AssetError::TooLarge { max_size: 1024 })));
    assert_eq!(files_in(dir.path(), AssetCategory::Gallery), 0);
}

#[tokio::test]
async fn test_replace_commit_keeps_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let old = store
        .store(AssetCategory::Events, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();

    let replacement = store
        .replace(AssetCategory::Events, Some(&old), &STANDARD.encode(b"new"))
        .await
        .unwrap();
    let new = replacement.path().unwrap().to_string();

    // Both exist until the swap is committed
    assert!(disk_path(dir.path(), &old).exists());
    assert!(disk_path(dir.path(), &new).exists());

    assert_eq!(replacement.commit().await.as_deref(), Some(new.as_str()));
    assert!(!disk_path(dir.path(), &old).exists());
    assert!(disk_path(dir.path(), &new).exists());
    assert_eq!(files_in(dir.path(), AssetCategory::Events), 1);
}

#[tokio::test]
async fn test_replace_abort_keeps_old_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let old = store
        .store(AssetCategory::Sponsors, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();

    let replacement = store
        .replace(AssetCategory::Sponsors, Some(&old), PNG_BASE64)
        .await
        .unwrap();
    replacement.abort().await;

    assert!(disk_path(dir.path(), &old).exists());
    assert_eq!(files_in(dir.path(), AssetCategory::Sponsors), 1);
}

#[tokio::test]
async fn test_replace_with_empty_payload_clears() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let old = store
        .store(AssetCategory::Gallery, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();

    let replacement = store
        .replace(AssetCategory::Gallery, Some(&old), "")
        .await
        .unwrap();
    assert_eq!(replacement.path(), None);
    assert_eq!(replacement.commit().await, None);
    assert_eq!(files_in(dir.path(), AssetCategory::Gallery), 0);
}

#[tokio::test]
async fn test_replace_malformed_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let old = store
        .store(AssetCategory::Partners, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();

    let result = store
        .replace(AssetCategory::Partners, Some(&old), "%%%")
        .await;
    assert!(matches!(result, Err(AssetError::InvalidAsset(_))));
    assert!(disk_path(dir.path(), &old).exists());
    assert_eq!(files_in(dir.path(), AssetCategory::Partners), 1);
}

#[tokio::test]
async fn test_release_removes_file_and_tolerates_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let path = store
        .store(AssetCategory::ProfessionalServices, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();
    assert!(path.starts_with("/uploads/professional-services/"));

    store
        .release(AssetCategory::ProfessionalServices, Some(&path))
        .await
        .unwrap();
    assert!(!disk_path(dir.path(), &path).exists());

    // Second release of the same path and releases of nothing are no-ops
    store
        .release(AssetCategory::ProfessionalServices, Some(&path))
        .await
        .unwrap();
    store
        .release(AssetCategory::ProfessionalServices, None)
        .await
        .unwrap();
    store
        .release(AssetCategory::ProfessionalServices, Some(""))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_release_ignores_foreign_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    let event_image = store
        .store(AssetCategory::Events, PNG_BASE64)
        .await
        .unwrap()
        .unwrap();

    // A sponsor can never delete an event's file
    store
        .release(AssetCategory::Sponsors, Some(&event_image))
        .await
        .unwrap();
    assert!(disk_path(dir.path(), &event_image).exists());
    assert_eq!(files_in(dir.path(), AssetCategory::Events), 1);
    assert_eq!(files_in(dir.path(), AssetCategory::Sponsors), 0);
}
