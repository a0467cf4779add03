use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::response::{ApiError, AppPath};
use crate::assets::{AssetCategory, AssetError};
use crate::object_store::ObjectStoreError;
use crate::AppState;

/// Serve a stored image.
/// Route: GET /uploads/:category/:file
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    AppPath((category, file_name)): AppPath<(String, String)>,
) -> Result<Response, ApiError> {
    let category = AssetCategory::from_dir_name(&category)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let data = state
        .assets
        .read(category, &file_name)
        .await
        .map_err(|e| match e {
            AssetError::Storage(ObjectStoreError::NotFound(_))
            | AssetError::Storage(ObjectStoreError::InvalidKey(_)) => {
                ApiError::not_found("File not found")
            }
            other => ApiError::internal(format!("Failed to retrieve file: {other}")),
        })?;

    let byte_size = data.len();
    let mime_type = mime_guess::from_path(&file_name).first_or_octet_stream();

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(byte_size));

    // Stored files are never rewritten; a replacement gets a new name
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
