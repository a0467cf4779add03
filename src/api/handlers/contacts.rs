use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, ListParams};
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery, JSend, JSendPaginated};
use crate::storage::models::{Contact, ContactStatus, Subject};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SubjectRef {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub status: ContactStatus,
    pub subject: Option<SubjectRef>,
    pub created_at: DateTime<Utc>,
}

impl ContactResponse {
    fn new(contact: Contact, subject: Option<&Subject>) -> Self {
        Self {
            id: contact.id,
            full_name: contact.full_name,
            email: contact.email,
            message: contact.message,
            status: contact.status,
            subject: subject.map(|s| SubjectRef {
                id: s.id,
                kind: s.kind.clone(),
            }),
            created_at: contact.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitContactRequest {
    pub full_name: String,
    pub email: String,
    pub message: String,
    #[serde(default, alias = "object")]
    pub subject_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    /// `null` resets to pending
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<bool>>,
}

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    pub id: u64,
    pub message: String,
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn required_email(value: &str) -> Result<String, ApiError> {
    let email = required("email", value)?;
    if !email.contains('@') {
        return Err(ApiError::bad_request("email must be a valid address"));
    }
    Ok(email)
}

fn with_subject(state: &AppState, contact: Contact) -> Result<ContactResponse, ApiError> {
    let subject = match contact.subject_id {
        Some(id) => state.db.get::<Subject>(id)?,
        None => None,
    };
    Ok(ContactResponse::new(contact, subject.as_ref()))
}

// ============================================================================
// Public
// ============================================================================

/// New contact request from the public site. Always starts out pending.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmitContactRequest>,
) -> Result<(StatusCode, Json<JSend<SubmittedResponse>>), ApiError> {
    // Unknown subjects are dropped rather than rejected
    let subject_id = match req.subject_id {
        Some(id) => state.db.get::<Subject>(id)?.map(|s| s.id),
        None => None,
    };

    let mut contact = Contact {
        id: 0,
        full_name: required("full_name", &req.full_name)?,
        email: required_email(&req.email)?,
        message: required("message", &req.message)?,
        status: ContactStatus::Pending,
        subject_id,
        created_at: Utc::now(),
    };
    let id = state.db.insert(&mut contact)?;

    tracing::info!(contact_id = id, subject_id = ?subject_id, "Received contact request");
    Ok((
        StatusCode::CREATED,
        JSend::success(SubmittedResponse {
            id,
            message: "Message sent successfully".to_string(),
        }),
    ))
}

// ============================================================================
// Admin
// ============================================================================

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<ContactResponse>>, ApiError> {
    let contacts: Vec<Contact> = state.db.all()?;
    let (page, pagination) = params.page(contacts)?;

    let subjects: HashMap<u64, Subject> = state
        .db
        .all::<Subject>()?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let items = page
        .into_iter()
        .map(|c| {
            let subject = c.subject_id.and_then(|id| subjects.get(&id));
            ContactResponse::new(c, subject)
        })
        .collect();

    Ok(JSendPaginated::success(items, pagination))
}

pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<ContactResponse>>, ApiError> {
    let contact: Contact = state
        .db
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;
    Ok(JSend::success(with_subject(&state, contact)?))
}

pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppJson(req): AppJson<UpdateContactRequest>,
) -> Result<Json<JSend<ContactResponse>>, ApiError> {
    let contact = state
        .db
        .modify(id, |c: &mut Contact| -> Result<(), ApiError> {
            if let Some(full_name) = &req.full_name {
                c.full_name = required("full_name", full_name)?;
            }
            if let Some(email) = &req.email {
                c.email = required_email(email)?;
            }
            if let Some(message) = &req.message {
                c.message = required("message", message)?;
            }
            if let Some(status) = req.status {
                c.status = ContactStatus::from(status);
            }
            Ok(())
        })?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    tracing::info!(contact_id = id, status = ?contact.status, "Updated contact request");
    Ok(JSend::success(with_subject(&state, contact)?))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    state
        .db
        .remove::<Contact>(id)?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    tracing::info!(contact_id = id, "Deleted contact request");
    Ok(JSend::success(serde_json::json!({ "id": id })))
}

/// Flip a reviewed request between rejected and resolved.
/// Pending requests must be given a status explicitly first.
pub async fn toggle_contact_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<JSend<ContactResponse>>, ApiError> {
    let contact = state
        .db
        .modify(id, |c: &mut Contact| -> Result<(), ApiError> {
            c.status = c.status.toggled().ok_or_else(|| {
                ApiError::conflict("Contact request is pending; set a status before toggling")
            })?;
            Ok(())
        })?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    tracing::info!(contact_id = id, status = ?contact.status, "Toggled contact status");
    Ok(JSend::success(with_subject(&state, contact)?))
}
