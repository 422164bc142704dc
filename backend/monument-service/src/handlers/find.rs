//! Monument identification endpoint.
//!
//! Accepts multipart form data carrying either an uploaded image (`file`)
//! or a text query (`text`); the image wins when both are present.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use futures_util::StreamExt;
use gemini_client::ModelInput;

use crate::error::{AppError, Result};
use crate::handlers::{read_field_bytes, read_text_field};
use crate::AppState;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Identify endpoint handler
#[utoipa::path(
    post,
    path = "/find",
    tag = "Find",
    responses(
        (status = 200, description = "Identification record, fields blank when the model reply had no matching lines"),
        (status = 400, description = "Neither an image nor a text query was provided"),
        (status = 500, description = "Generative model failure")
    )
)]
pub async fn find_monument(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut text: Option<String> = None;

    while let Some(field) = payload.next().await {
        let mut field = field
            .map_err(|e| AppError::validation(format!("Malformed multipart payload: {e}")))?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let mime = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                let data = read_field_bytes(&mut field).await?;
                image = Some((mime, data));
            }
            "text" => {
                text = Some(read_text_field(&mut field).await?);
            }
            _ => {}
        }
    }

    let input = if let Some((mime_type, data)) = image {
        ModelInput::Image {
            mime_type,
            data: Bytes::from(data),
        }
    } else if let Some(query) = text.filter(|t| !t.is_empty()) {
        ModelInput::Text(query)
    } else {
        return Err(AppError::validation(
            "No valid input provided. Please provide either an image or text.",
        ));
    };

    let identification = state.identifier.identify(&input).await?;
    Ok(HttpResponse::Ok().json(identification))
}
