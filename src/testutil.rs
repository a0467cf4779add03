//! Shared test helpers for router tests.

use std::sync::Arc;

use crate::assets::AssetStore;
use crate::auth::{self, ROLE_ADMIN};
use crate::config::{AuthConfig, Config, SeedAdmin, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::storage::Database;
use crate::AppState;

pub const ADMIN_EMAIL: &str = "admin@club.test";
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// The 8-byte PNG signature, base64-encoded.
pub const PNG_BASE64: &str = "iVBORw0KGgo=";

/// Create a test AppState with a temporary database, upload root and seeded admin.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let upload_dir = temp_dir.path().join("uploads");

    let seed = SeedAdmin {
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    let config = Config {
        auth: AuthConfig {
            jwt_secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            token_ttl_hours: 1,
            seed_admin: Some(seed.clone()),
        },
        server: ServerConfig::default(),
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            upload_dir: upload_dir.to_string_lossy().to_string(),
        },
        max_upload_size: 1024 * 1024, // 1MB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let objects = LocalStore::new(&upload_dir).expect("Failed to create test upload root");
    let assets = AssetStore::new(Arc::new(objects), config.max_upload_size);

    auth::bootstrap_admin(&db, &seed).expect("Failed to seed test admin");

    Arc::new(AppState { config, db, assets })
}

/// Log in as the seeded administrator and return the bearer token.
pub fn admin_token(state: &AppState) -> String {
    let session = auth::login(&state.db, &state.config.auth, ADMIN_EMAIL, ADMIN_PASSWORD)
        .expect("Failed to log in as test admin");
    assert!(session.user.roles.iter().any(|r| r == ROLE_ADMIN));
    session.token
}
