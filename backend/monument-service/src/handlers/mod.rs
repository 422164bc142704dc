//! HTTP handlers.
//!
//! Thin layer over the services: request parsing and validation here,
//! everything else delegated.

pub mod auth;
pub mod community;
pub mod find;

pub use auth::{login, signup};
pub use community::{create_community_post, get_all_community, get_community};
pub use find::find_monument;

use actix_multipart::Field;
use actix_web::HttpResponse;
use bytes::Bytes;
use futures_util::StreamExt;

use crate::error::{AppError, Result};
use crate::models::MessageResponse;
use crate::services::community::MediaFile;

const OCTET_STREAM: &str = "application/octet-stream";

/// `GET /`
pub async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new("Welcome to the Travisco App!"))
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "monument-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn read_field_bytes(field: &mut Field) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk
            .map_err(|e| AppError::validation(format!("Failed to read multipart field: {e}")))?;
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub(crate) async fn read_text_field(field: &mut Field) -> Result<String> {
    let data = read_field_bytes(field).await?;
    String::from_utf8(data)
        .map_err(|_| AppError::validation("Form field is not valid UTF-8".to_string()))
}

/// Read one uploaded file. An empty form slot (no file name, no bytes)
/// yields `None`, matching how browsers submit unused file inputs.
pub(crate) async fn read_media_file(field: &mut Field) -> Result<Option<MediaFile>> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or_default()
        .to_string();
    let content_type = field
        .content_type()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string());

    let data = read_field_bytes(field).await?;
    if file_name.is_empty() && data.is_empty() {
        return Ok(None);
    }

    Ok(Some(MediaFile {
        file_name,
        content_type,
        data: Bytes::from(data),
    }))
}
