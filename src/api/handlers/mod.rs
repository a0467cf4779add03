mod auth;
mod contacts;
mod content;
mod health;
mod subjects;
mod uploads;
mod users;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api::response::{ApiError, Pagination};
use crate::content::projection;

pub use auth::{login, logout};
pub use contacts::{
    delete_contact, get_contact, list_contacts, submit_contact, toggle_contact_status,
    update_contact,
};
pub use content::{
    create_content, delete_content, get_content, get_published, list_content, list_published,
    submit_feedback, toggle_publish, update_content,
};
pub use health::health;
pub use subjects::{create_subject, delete_subject, get_subject, list_subjects, update_subject};
pub use uploads::serve_upload;
pub use users::{change_password, create_user, delete_user, get_user, list_users, update_user};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

impl ListParams {
    /// Slice one page out of a fully loaded list.
    pub fn page<T>(&self, items: Vec<T>) -> Result<(Vec<T>, Pagination), ApiError> {
        if self.limit == 0 {
            return Err(ApiError::bad_request("limit must be greater than 0"));
        }

        let total = items.len() as u64;
        let page = items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect();

        Ok((
            page,
            Pagination {
                limit: self.limit,
                offset: self.offset,
                total,
            },
        ))
    }
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

fn render<T: Serialize>(record: &T, fields: &[&str]) -> Result<Value, ApiError> {
    projection::project(record, fields).map_err(|e| ApiError::internal(e.to_string()))
}

fn render_all<T: Serialize>(records: &[T], fields: &[&str]) -> Result<Vec<Value>, ApiError> {
    projection::project_all(records, fields).map_err(|e| ApiError::internal(e.to_string()))
}
