//! Google Cloud Storage client for publicly served media uploads.
//!
//! Uses the JSON API with service-account bearer tokens: media upload,
//! `allUsers` read grant, and the canonical public URL.

use bytes::Bytes;
use google_auth::{AuthError, TokenProvider};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const STORAGE_HOST: &str = "https://storage.googleapis.com";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Handle to one bucket.
#[derive(Clone)]
pub struct GcsBucket {
    bucket: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
}

impl GcsBucket {
    pub fn new(bucket: &str, tokens: Arc<TokenProvider>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            bucket: bucket.to_string(),
            tokens,
            http_client,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload an object.
    pub async fn upload(
        &self,
        object_path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{STORAGE_HOST}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.bucket,
            urlencoding::encode(object_path)
        );

        debug!(object_path = %object_path, size = data.len(), "uploading to GCS");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Grant `allUsers` read access so the public URL serves the object.
    pub async fn make_public(&self, object_path: &str) -> Result<(), StorageError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{STORAGE_HOST}/storage/v1/b/{}/o/{}/acl",
            self.bucket,
            urlencoding::encode(object_path)
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Public URL for an object.
    pub fn public_url(&self, object_path: &str) -> String {
        format!("{STORAGE_HOST}/{}/{}", self.bucket, object_path)
    }

    /// Upload, make public, and return the public URL.
    pub async fn upload_public(
        &self,
        object_path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.upload(object_path, data, content_type).await?;
        self.make_public(object_path).await?;

        let url = self.public_url(object_path);
        info!(%url, "file uploaded and made public");
        Ok(url)
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bucket() -> GcsBucket {
        let key = google_auth::ServiceAccountKey::from_json(
            r#"{
                "project_id": "demo",
                "private_key_id": "k",
                "private_key": "pem",
                "client_email": "svc@demo.iam.gserviceaccount.com",
                "client_id": "1",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }"#,
        )
        .unwrap();
        GcsBucket::new(
            "travisco-media",
            Arc::new(TokenProvider::new(key, google_auth::CLOUD_PLATFORM_SCOPE)),
        )
    }

    #[test]
    fn public_url_matches_canonical_form() {
        let bucket = test_bucket();
        assert_eq!(
            bucket.public_url("images/abc.jpg"),
            "https://storage.googleapis.com/travisco-media/images/abc.jpg"
        );
    }

    #[test]
    fn exposes_bucket_name() {
        assert_eq!(test_bucket().bucket(), "travisco-media");
    }
}
