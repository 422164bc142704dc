//! Client for the Gemini `generateContent` endpoint.
//!
//! Sends a prompt together with either a text query or an inline image and
//! returns the model's reply as unstructured text. Interpreting that text
//! is the caller's concern.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const GENERATIVE_LANGUAGE_HOST: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text candidates")]
    EmptyResponse,
}

/// Image-or-text payload accompanying the prompt.
#[derive(Debug, Clone)]
pub enum ModelInput {
    Text(String),
    Image { mime_type: String, data: Bytes },
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_image(mime_type: &str, data: &Bytes) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(data),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini API client with API-key authentication.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt and payload; return the reply text of the first
    /// candidate.
    pub async fn generate(&self, prompt: &str, input: &ModelInput) -> Result<String, GeminiError> {
        let payload_part = match input {
            ModelInput::Text(text) => Part::text(text),
            ModelInput::Image { mime_type, data } => Part::inline_image(mime_type, data),
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt), payload_part],
            }],
        };

        let url = format!(
            "{GENERATIVE_LANGUAGE_HOST}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let start = std::time::Instant::now();
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "generateContent request failed");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        debug!(
            elapsed_ms = start.elapsed().as_millis(),
            "generateContent response received"
        );

        let text = extract_text(reply)?;
        info!(
            model = %self.model,
            reply_len = text.len(),
            "model reply received"
        );
        Ok(text)
    }
}

fn extract_text(reply: GenerateContentResponse) -> Result<String, GeminiError> {
    let content = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .unwrap_or_default();

    let text: Vec<String> = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(text.join(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_not_configured_without_key() {
        let client = GeminiClient::new("");
        assert!(!client.is_configured());
    }

    #[test]
    fn client_configured_with_key() {
        let client = GeminiClient::new("test-api-key");
        assert!(client.is_configured());
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn image_request_serializes_inline_data() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text("identify this"),
                    Part::inline_image("image/png", &Bytes::from_static(b"\x89PNG")),
                ],
            }],
        };

        let encoded = serde_json::to_value(&request).unwrap();
        let parts = &encoded["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "identify this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], BASE64.encode(b"\x89PNG"));
        assert!(parts[0].get("inlineData").is_none());
    }

    #[test]
    fn extracts_candidate_text() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [
                    { "text": "Monument Name: Eiffel Tower\n" },
                    { "text": "Description: Wrought-iron lattice tower in Paris." }
                ] } }
            ]
        }))
        .unwrap();

        let text = extract_text(reply).unwrap();
        assert!(text.starts_with("Monument Name: Eiffel Tower"));
        assert!(text.ends_with("Paris."));
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_text(reply),
            Err(GeminiError::EmptyResponse)
        ));
    }
}
