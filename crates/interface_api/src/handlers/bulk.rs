//! Bulk import/export handlers
//!
//! The import and update endpoints take a multipart form with a single
//! `file` field holding an xlsx workbook; the template endpoint streams
//! one back.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::dto::CustomerResponse;
use crate::error::ApiError;
use crate::AppState;

const TEMPLATE_FILENAME: &str = "customer_template.xlsx";

/// Creates customers from an uploaded workbook, skipping bad rows
pub async fn bulk_create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let data = read_file_field(multipart).await?;
    let created = state.bulk.import(&data).await?;
    Ok(Json(created.into_iter().map(CustomerResponse::from).collect()))
}

/// Updates customer names and dates of birth from an uploaded workbook
pub async fn bulk_update(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let data = read_file_field(multipart).await?;
    let updated = state.bulk.update(&data).await?;
    Ok(Json(updated.into_iter().map(CustomerResponse::from).collect()))
}

/// Downloads the template workbook, pre-populated with existing customers
pub async fn download_template(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.bulk.template().await?;

    Ok((
        [
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", TEMPLATE_FILENAME),
            ),
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
        ],
        bytes,
    ))
}

/// Pulls the bytes of the `file` field out of a multipart form
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file field: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::BadRequest(
        "Multipart body must contain a 'file' field".to_string(),
    ))
}
