use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::users::UserResponse;
use crate::api::middleware::bearer_token;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::{self, AuthError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<JSend<LoginResponse>>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let session = match auth::login(&state.db, &state.config.auth, &req.email, &req.password) {
        Ok(session) => session,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(email = %req.email.trim(), "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = session.user.id, "User logged in");
    Ok(JSend::success(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: UserResponse::from(&session.user),
    }))
}

/// Ends the caller's session. Succeeds without a token or with a stale one.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JSend<LogoutResponse>>, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        auth::logout(&state.db, &state.config.auth, token)?;
    }

    Ok(JSend::success(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}
