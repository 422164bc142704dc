//! Firebase Authentication admin client (Identity Toolkit v1).
//!
//! The backend never handles credentials itself: account creation and
//! email lookup are delegated here, authenticated with a service-account
//! bearer token.

use google_auth::{AuthError, TokenProvider};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

const IDENTITY_TOOLKIT_HOST: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no account registered for {0}")]
    UserNotFound(String),
}

/// Subset of the account record this backend mirrors.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Client for one Firebase project.
#[derive(Clone)]
pub struct FirebaseIdentity {
    project_id: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
}

impl FirebaseIdentity {
    pub fn new(project_id: &str, tokens: Arc<TokenProvider>) -> Self {
        Self {
            project_id: project_id.to_string(),
            tokens,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an account; the identity provider stores the credential.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, IdentityError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{IDENTITY_TOOLKIT_HOST}/projects/{}/accounts",
            self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({
                "email": email,
                "password": password,
                "displayName": display_name,
            }))
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let user: UserRecord = response.json().await?;
        debug!(uid = %user.uid, "account created");
        Ok(user)
    }

    /// Look an account up by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{IDENTITY_TOOLKIT_HOST}/projects/{}/accounts:lookup",
            self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "email": [email] }))
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let lookup: LookupResponse = response.json().await?;
        lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }
}

async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    Err(IdentityError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_deserializes_from_wire_names() {
        let user: UserRecord = serde_json::from_str(
            r#"{ "localId": "u123", "email": "a@b.c", "displayName": "Ada" }"#,
        )
        .unwrap();
        assert_eq!(user.uid, "u123");
        assert_eq!(user.display_name, "Ada");
    }

    #[test]
    fn lookup_with_no_users_yields_empty_list() {
        let lookup: LookupResponse = serde_json::from_str(r#"{ "kind": "lookup" }"#).unwrap();
        assert!(lookup.users.is_empty());
    }

    #[test]
    fn missing_optional_fields_default() {
        let user: UserRecord = serde_json::from_str(r#"{ "localId": "u1" }"#).unwrap();
        assert!(user.email.is_empty());
        assert!(user.display_name.is_empty());
    }
}
