use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ListParams;
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery, JSend, JSendPaginated};
use crate::storage::models::Subject;
use crate::storage::SubjectDeletion;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubjectRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

fn subject_kind(req: SubjectRequest) -> Result<String, ApiError> {
    let kind = req.kind.trim();
    if kind.is_empty() {
        return Err(ApiError::bad_request("type must not be empty"));
    }
    Ok(kind.to_string())
}

/// Contact subjects, shared by the public form and the admin console.
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<Subject>>, ApiError> {
    let subjects: Vec<Subject> = state.db.all()?;
    let (page, pagination) = params.page(subjects)?;
    Ok(JSendPaginated::success(page, pagination))
}

pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<Subject>>, ApiError> {
    let subject: Subject = state
        .db
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Subject not found"))?;
    Ok(JSend::success(subject))
}

pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubjectRequest>,
) -> Result<(StatusCode, Json<JSend<Subject>>), ApiError> {
    let mut subject = Subject {
        id: 0,
        kind: subject_kind(req)?,
    };
    state.db.insert(&mut subject)?;

    tracing::info!(subject_id = subject.id, kind = %subject.kind, "Created subject");
    Ok((StatusCode::CREATED, JSend::success(subject)))
}

pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<SubjectRequest>,
) -> Result<Json<JSend<Subject>>, ApiError> {
    let kind = subject_kind(req)?;
    let subject: Subject = state
        .db
        .modify(id, |s: &mut Subject| -> Result<(), ApiError> {
            s.kind = kind;
            Ok(())
        })?
        .ok_or_else(|| ApiError::not_found("Subject not found"))?;
    Ok(JSend::success(subject))
}

pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    match state.db.delete_subject(id)? {
        SubjectDeletion::Deleted(subject) => {
            tracing::info!(subject_id = id, kind = %subject.kind, "Deleted subject");
            Ok(JSend::success(serde_json::json!({ "id": id })))
        }
        SubjectDeletion::InUse(references) => Err(ApiError::conflict(format!(
            "Subject is referenced by {references} contact request(s)"
        ))),
        SubjectDeletion::NotFound => Err(ApiError::not_found("Subject not found")),
    }
}
