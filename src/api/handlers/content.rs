//! Handlers shared by every publishable content type.
//!
//! Each handler is generic over [`Content`] and mounted once per type, e.g.
//! `get(list_published::<Event>)`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{render, render_all, ListParams};
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery, JSend, JSendPaginated};
use crate::content::{lifecycle, Content, FeedbackDraft};
use crate::storage::models::Feedback;
use crate::AppState;

// ============================================================================
// Public
// ============================================================================

pub async fn list_published<T: Content>(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<Value>>, ApiError> {
    let records = lifecycle::list_published::<T>(&state.db)?;
    let (page, pagination) = params.page(records)?;
    Ok(JSendPaginated::success(
        render_all(&page, T::PUBLIC_FIELDS)?,
        pagination,
    ))
}

pub async fn get_published<T: Content>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let record = lifecycle::find_published::<T>(&state.db, id)?;
    Ok(JSend::success(render(&record, T::PUBLIC_FIELDS)?))
}

/// Visitor testimonial. Always stored as a draft awaiting moderation, and
/// without an image; only admins attach one.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    AppJson(mut draft): AppJson<FeedbackDraft>,
) -> Result<(StatusCode, Json<JSend<Value>>), ApiError> {
    draft.published = Some(false);
    draft.image = None;
    let feedback: Feedback = lifecycle::create(&state.db, &state.assets, draft).await?;
    Ok((
        StatusCode::CREATED,
        JSend::success(render(&feedback, Feedback::PUBLIC_FIELDS)?),
    ))
}

// ============================================================================
// Admin
// ============================================================================

pub async fn list_content<T: Content>(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<Value>>, ApiError> {
    let records = lifecycle::list_all::<T>(&state.db)?;
    let (page, pagination) = params.page(records)?;
    Ok(JSendPaginated::success(
        render_all(&page, T::ADMIN_FIELDS)?,
        pagination,
    ))
}

pub async fn get_content<T: Content>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let record = lifecycle::find::<T>(&state.db, id)?;
    Ok(JSend::success(render(&record, T::ADMIN_FIELDS)?))
}

pub async fn create_content<T: Content>(
    State(state): State<Arc<AppState>>,
    AppJson(draft): AppJson<T::Draft>,
) -> Result<(StatusCode, Json<JSend<Value>>), ApiError> {
    let record: T = lifecycle::create(&state.db, &state.assets, draft).await?;
    Ok((
        StatusCode::CREATED,
        JSend::success(render(&record, T::ADMIN_FIELDS)?),
    ))
}

pub async fn update_content<T: Content>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(changes): AppJson<T::Changes>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let record: T = lifecycle::update(&state.db, &state.assets, id, changes).await?;
    Ok(JSend::success(render(&record, T::ADMIN_FIELDS)?))
}

pub async fn delete_content<T: Content>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let removed: T = lifecycle::delete(&state.db, &state.assets, id).await?;
    Ok(JSend::success(serde_json::json!({ "id": removed.id() })))
}

pub async fn toggle_publish<T: Content>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let record = lifecycle::toggle_published::<T>(&state.db, id)?;
    Ok(JSend::success(serde_json::json!({
        "id": record.id(),
        "published": record.published(),
    })))
}
