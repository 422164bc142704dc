//! Minimal Cloud Firestore REST client.
//!
//! Covers the document operations this backend needs: create a document
//! with a server-assigned id, write a document at a known id, stream a
//! collection, and enumerate top-level collection ids. Field values are
//! translated to and from plain JSON by [`value`].

pub mod value;

use google_auth::{AuthError, TokenProvider};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, thiserror::Error)]
pub enum FirestoreError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Firestore request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Firestore returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// One document: its id plus fields decoded to plain JSON.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawDocument {
    fn into_document(self) -> Document {
        // resource name: projects/{p}/databases/(default)/documents/{collection}/{id}
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or(self.name.as_str())
            .to_string();
        Document {
            id,
            fields: value::from_firestore_fields(&self.fields),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListCollectionIdsResponse {
    #[serde(rename = "collectionIds", default)]
    collection_ids: Vec<String>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Client for one project's `(default)` database.
#[derive(Clone)]
pub struct FirestoreClient {
    project_id: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    pub fn new(project_id: &str, tokens: Arc<TokenProvider>) -> Self {
        Self {
            project_id: project_id.to_string(),
            tokens,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn documents_url(&self) -> String {
        format!(
            "{FIRESTORE_HOST}/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn collection_url(&self, collection_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(),
            urlencoding::encode(collection_id)
        )
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection_id: &str,
        fields: &Value,
    ) -> Result<Document, FirestoreError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .post(self.collection_url(collection_id))
            .bearer_auth(&token)
            .json(&json!({ "fields": value::to_firestore_fields(fields) }))
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let raw: RawDocument = response.json().await?;
        let document = raw.into_document();
        debug!(collection = %collection_id, id = %document.id, "document created");
        Ok(document)
    }

    /// Write a document at a caller-chosen id, replacing any existing one.
    pub async fn set_document(
        &self,
        collection_id: &str,
        document_id: &str,
        fields: &Value,
    ) -> Result<Document, FirestoreError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/{}",
            self.collection_url(collection_id),
            urlencoding::encode(document_id)
        );
        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&token)
            .json(&json!({ "fields": value::to_firestore_fields(fields) }))
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let raw: RawDocument = response.json().await?;
        Ok(raw.into_document())
    }

    /// All documents in a collection, in store iteration order.
    ///
    /// A collection that does not exist yields an empty list, matching
    /// Firestore's implicit-collection model.
    pub async fn list_documents(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.collection_url(collection_id);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.tokens.access_token().await?;
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let response = error_for_status(request.send().await?).await?;
            let page: ListDocumentsResponse = response.json().await?;
            documents.extend(page.documents.into_iter().map(RawDocument::into_document));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(collection = %collection_id, count = documents.len(), "documents listed");
        Ok(documents)
    }

    /// Ids of every top-level collection in the database.
    pub async fn list_collection_ids(&self) -> Result<Vec<String>, FirestoreError> {
        let url = format!("{}:listCollectionIds", self.documents_url());
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.tokens.access_token().await?;
            let mut body = json!({ "pageSize": PAGE_SIZE });
            if let Some(ref page) = page_token {
                body["pageToken"] = json!(page);
            }

            let response = self
                .http_client
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?;
            let response = error_for_status(response).await?;

            let page: ListCollectionIdsResponse = response.json().await?;
            ids.extend(page.collection_ids);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(ids)
    }
}

async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, FirestoreError> {
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

    Err(FirestoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_last_name_segment() {
        let raw = RawDocument {
            name: "projects/p/databases/(default)/documents/Eiffel Tower/abc123".to_string(),
            fields: Map::new(),
        };
        assert_eq!(raw.into_document().id, "abc123");
    }

    #[test]
    fn collection_url_escapes_monument_names() {
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
        let client = FirestoreClient::new(
            "demo",
            Arc::new(TokenProvider::new(key, google_auth::CLOUD_PLATFORM_SCOPE)),
        );

        assert_eq!(
            client.collection_url("Eiffel Tower"),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/Eiffel%20Tower"
        );
    }

    #[test]
    fn parses_list_documents_page() {
        let body = r#"{
            "documents": [
                { "name": "projects/p/databases/(default)/documents/Colosseum/d1",
                  "fields": { "Review": { "stringValue": "grand" } } }
            ],
            "nextPageToken": "tok"
        }"#;
        let page: ListDocumentsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));

        let doc = page.documents.into_iter().next().unwrap().into_document();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.fields["Review"], "grand");
    }

    #[test]
    fn empty_collection_page_decodes() {
        let page: ListDocumentsResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
