//! Credential checks and bearer-token sessions for the admin console.
//!
//! Each account holds at most one active session. Logging in replaces it,
//! logging out clears it, and a token is only accepted while its `jti`
//! matches the stored session id.

pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{AuthConfig, SeedAdmin};
use crate::storage::models::User;
use crate::storage::{Database, DatabaseError};

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Password hashing error: {0}")]
    Hashing(String),
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::Hashing(e.to_string())
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Check credentials and open a new session, replacing any previous one.
pub fn login(
    db: &Database,
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let user = db
        .find_user_by_email(email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let issued = token::issue_token(
        user.id,
        &user.roles,
        &config.jwt_secret,
        config.token_ttl_hours,
    )?;

    let jti = issued.jti.clone();
    let expires_at = issued.expires_at;
    let user = db
        .modify(user.id, |u: &mut User| -> Result<(), AuthError> {
            u.session_id = Some(jti);
            u.session_expires_at = Some(expires_at);
            Ok(())
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    Ok(Session {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

/// Resolve a bearer token to the user owning its active session.
pub fn authenticate(db: &Database, config: &AuthConfig, token: &str) -> Result<User, AuthError> {
    let claims =
        token::validate_token(token, &config.jwt_secret).map_err(|_| AuthError::InvalidToken)?;

    let user: User = db.get(claims.sub)?.ok_or(AuthError::InvalidToken)?;

    let session_live = user.session_id.as_deref() == Some(claims.jti.as_str())
        && user.session_expires_at.is_some_and(|at| at > Utc::now());
    if !session_live {
        return Err(AuthError::InvalidToken);
    }

    Ok(user)
}

/// Close the session behind `token`. Unknown or stale tokens are ignored.
pub fn logout(db: &Database, config: &AuthConfig, token: &str) -> Result<(), AuthError> {
    let Ok(user) = authenticate(db, config, token) else {
        return Ok(());
    };

    db.modify(user.id, |u: &mut User| -> Result<(), AuthError> {
        u.session_id = None;
        u.session_expires_at = None;
        Ok(())
    })?;
    Ok(())
}

/// Roles as shown to the admin console, without the `ROLE_` prefix.
pub fn display_roles(roles: &[String]) -> Vec<String> {
    roles
        .iter()
        .map(|r| r.strip_prefix("ROLE_").unwrap_or(r).to_string())
        .collect()
}

/// Stored form of a role name as submitted by the admin console.
pub fn stored_role(role: &str) -> String {
    let role = role.trim().to_uppercase();
    if role.starts_with("ROLE_") {
        role
    } else {
        format!("ROLE_{role}")
    }
}

/// Create the configured administrator account if no account uses its email.
/// Returns `true` when an account was created.
pub fn bootstrap_admin(db: &Database, seed: &SeedAdmin) -> Result<bool, AuthError> {
    if db.email_owner(&seed.email)?.is_some() {
        return Ok(false);
    }

    let mut admin = User {
        id: 0,
        email: seed.email.clone(),
        first_name: "Admin".to_string(),
        last_name: String::new(),
        phone: None,
        roles: vec![ROLE_ADMIN.to_string()],
        password_hash: password::hash_password(&seed.password)?,
        session_id: None,
        session_expires_at: None,
        created_at: Utc::now(),
    };
    db.insert_user(&mut admin)?;

    tracing::info!(user_id = admin.id, email = %admin.email, "Seeded administrator account");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, Database, AuthConfig) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        let config = AuthConfig {
            jwt_secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            token_ttl_hours: 24,
            seed_admin: None,
        };
        let seed = SeedAdmin {
            email: "Admin@Club.test".to_string(),
            password: "correct-horse".to_string(),
        };
        assert!(bootstrap_admin(&db, &seed).unwrap());
        (dir, db, config)
    }

    #[test]
    fn test_login_and_authenticate() {
        let (_dir, db, config) = setup();

        let session = login(&db, &config, "admin@club.test", "correct-horse").unwrap();
        assert_eq!(session.user.email, "admin@club.test");

        let user = authenticate(&db, &config, &session.token).unwrap();
        assert_eq!(user.id, session.user.id);
        assert!(user.roles.iter().any(|r| r == ROLE_ADMIN));
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let (_dir, db, config) = setup();

        assert!(matches!(
            login(&db, &config, "admin@club.test", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, &config, "nobody@club.test", "correct-horse"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_logout_revokes_token() {
        let (_dir, db, config) = setup();
        let session = login(&db, &config, "admin@club.test", "correct-horse").unwrap();

        logout(&db, &config, &session.token).unwrap();
        assert!(matches!(
            authenticate(&db, &config, &session.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_new_login_replaces_previous_session() {
        let (_dir, db, config) = setup();
        let first = login(&db, &config, "admin@club.test", "correct-horse").unwrap();
        let second = login(&db, &config, "admin@club.test", "correct-horse").unwrap();

        assert!(authenticate(&db, &config, &first.token).is_err());
        assert!(authenticate(&db, &config, &second.token).is_ok());
    }

    #[test]
    fn test_bootstrap_admin_is_idempotent() {
        let (_dir, db, _config) = setup();
        let seed = SeedAdmin {
            email: "admin@club.test".to_string(),
            password: "another-password".to_string(),
        };
        assert!(!bootstrap_admin(&db, &seed).unwrap());
    }

    #[test]
    fn test_display_roles_strips_prefix() {
        let roles = vec![ROLE_ADMIN.to_string(), "EDITOR".to_string()];
        assert_eq!(display_roles(&roles), vec!["ADMIN", "EDITOR"]);
    }

    #[test]
    fn test_stored_role_adds_prefix() {
        assert_eq!(stored_role("admin"), ROLE_ADMIN);
        assert_eq!(stored_role("ROLE_ADMIN"), ROLE_ADMIN);
        assert_eq!(stored_role(" user "), ROLE_USER);
    }
}
