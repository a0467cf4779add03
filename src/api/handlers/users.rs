use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, ListParams};
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery, JSend, JSendPaginated};
use crate::auth::{self, password, AuthError, ROLE_USER};
use crate::storage::models::{Patch, User};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Account as shown to the admin console. Never carries credentials.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            roles: auth::display_roles(&user.roles),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    pub roles: Option<Vec<String>>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

fn valid_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("email must be a valid address"));
    }
    Ok(email.to_string())
}

fn hashed(password: &str) -> Result<String, ApiError> {
    password::validate_password_strength(password).map_err(ApiError::bad_request)?;
    password::hash_password(password).map_err(|e| ApiError::from(AuthError::from(e)))
}

fn stored_roles(roles: Vec<String>) -> Vec<String> {
    let mut roles: Vec<String> = roles
        .iter()
        .filter(|r| !r.trim().is_empty())
        .map(|r| auth::stored_role(r))
        .collect();
    roles.sort();
    roles.dedup();
    if roles.is_empty() {
        roles.push(ROLE_USER.to_string());
    }
    roles
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<UserResponse>>, ApiError> {
    let users: Vec<User> = state.db.all()?;
    let (page, pagination) = params.page(users)?;
    Ok(JSendPaginated::success(
        page.iter().map(UserResponse::from).collect(),
        pagination,
    ))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<UserResponse>>, ApiError> {
    let user: User = state
        .db
        .get(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(JSend::success(UserResponse::from(&user)))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<JSend<UserResponse>>), ApiError> {
    let mut user = User {
        id: 0,
        email: valid_email(&req.email)?,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: req.phone.filter(|p| !p.trim().is_empty()),
        roles: stored_roles(req.roles.unwrap_or_default()),
        password_hash: hashed(&req.password)?,
        session_id: None,
        session_expires_at: None,
        created_at: Utc::now(),
    };
    state.db.insert_user(&mut user)?;

    tracing::info!(user_id = user.id, email = %user.email, "Created user");
    Ok((StatusCode::CREATED, JSend::success(UserResponse::from(&user))))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<JSend<UserResponse>>, ApiError> {
    let email = req.email.as_deref().map(valid_email).transpose()?;
    let password_hash = req.password.as_deref().map(hashed).transpose()?;
    let roles = req.roles.map(stored_roles);

    // Email uniqueness is checked in the same transaction as the write
    let user = state
        .db
        .update_user(id, |user: &mut User| -> Result<(), ApiError> {
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(first_name) = req.first_name {
                user.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = req.last_name {
                user.last_name = last_name.trim().to_string();
            }
            Patch::from(req.phone).apply_to(&mut user.phone);
            if let Some(roles) = roles {
                user.roles = roles;
            }
            if let Some(password_hash) = password_hash {
                user.password_hash = password_hash;
            }
            Ok(())
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = id, "Updated user");
    Ok(JSend::success(UserResponse::from(&user)))
}

/// Admins cannot delete their own account.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<User>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    if actor.id == id {
        return Err(ApiError::conflict("Cannot delete your own account"));
    }
    if !state.db.delete_user(id)? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = id, "Deleted user");
    Ok(JSend::success(serde_json::json!({ "id": id })))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    let password_hash = hashed(&req.password)?;
    state
        .db
        .modify(id, |u: &mut User| -> Result<(), ApiError> {
            u.password_hash = password_hash;
            Ok(())
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = id, "Changed user password");
    Ok(JSend::success(serde_json::json!({
        "message": "Password updated successfully"
    })))
}
