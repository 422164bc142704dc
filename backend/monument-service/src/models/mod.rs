//! API data models.
//!
//! The capitalized serde renames on [`CommunityPost`] are part of the
//! stored-document contract and must not be normalized.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured result of one identification request.
///
/// Both fields stay empty when the model's reply carries no matching
/// line; that is a valid answer, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonumentIdentification {
    pub monument_name: String,
    pub description: String,
}

/// Public URLs of uploaded media, grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MediaUrls {
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub gif_urls: Vec<String>,
}

/// A community post as written to the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommunityPost {
    #[serde(rename = "Username")]
    pub username: String,
    /// Also names the collection the post is stored in
    #[serde(rename = "Monument_name")]
    pub monument_name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Review")]
    pub review: String,
    pub media_urls: MediaUrls,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    /// Accepted but never verified locally; credential handling is the
    /// identity provider's concern
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Posts plus their count, for both the single-monument and all-posts views.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostsResponse {
    #[schema(value_type = Vec<Object>)]
    pub posts: Vec<serde_json::Value>,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePostResponse {
    pub message: String,
    pub post_id: String,
    #[schema(value_type = Object)]
    pub post_data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_serializes_with_contract_casing() {
        let post = CommunityPost {
            username: "maria".into(),
            monument_name: "Colosseum".into(),
            description: "Flavian amphitheatre".into(),
            review: "breathtaking".into(),
            media_urls: MediaUrls::default(),
        };

        let encoded = serde_json::to_value(&post).unwrap();
        assert_eq!(
            encoded,
            json!({
                "Username": "maria",
                "Monument_name": "Colosseum",
                "Description": "Flavian amphitheatre",
                "Review": "breathtaking",
                "media_urls": { "image_urls": [], "video_urls": [], "gif_urls": [] }
            })
        );
    }

    #[test]
    fn identification_defaults_to_blank_fields() {
        let id = MonumentIdentification::default();
        assert_eq!(id.monument_name, "");
        assert_eq!(id.description, "");
    }
}
