//! Service-account authentication for Google Cloud REST APIs.
//!
//! Signs an RS256 JWT assertion with the service-account private key,
//! exchanges it at the key's token endpoint for an OAuth2 bearer token,
//! and caches the token until shortly before it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Scope covering Firestore, Cloud Storage and the Identity Toolkit.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid service account key: {0}")]
    InvalidKey(String),

    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
}

/// Service account key as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, AuthError> {
        serde_json::from_str(raw).map_err(|e| AuthError::InvalidKey(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self, AuthError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AuthError::InvalidKey(format!("{path}: {e}")))?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims {
    iss: String,
    sub: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// OAuth2 bearer-token provider for a single service account and scope.
///
/// Cheap to clone; clones share the token cache.
#[derive(Clone)]
pub struct TokenProvider {
    key: Arc<ServiceAccountKey>,
    scope: String,
    cache: Arc<Mutex<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, scope: &str) -> Self {
        Self {
            key: Arc::new(key),
            scope: scope.to_string(),
            cache: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// Current bearer token, refreshed when less than 60 seconds remain.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        {
            let cache = self.cache.lock().expect("token cache lock poisoned");
            if let Some(cached) = cache.as_ref() {
                let now = Utc::now().timestamp();
                if cached.expires_at > now + 60 {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            sub: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(format!("private key: {e}")))?;
        let assertion = encode(&Header::new(jsonwebtoken::Algorithm::RS256), &claims, &encoding_key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &assertion),
        ];

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint { status, body });
        }

        let token: TokenResponse = response.json().await?;
        debug!(client_email = %self.key.client_email, "access token refreshed");

        let expires_at = Utc::now().timestamp() + token.expires_in;
        {
            let mut cache = self.cache.lock().expect("token cache lock poisoned");
            *cache = Some(CachedToken {
                access_token: token.access_token.clone(),
                expires_at,
            });
        }

        Ok(token.access_token)
    }
}
