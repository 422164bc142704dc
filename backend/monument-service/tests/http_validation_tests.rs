//! Validation-path tests: everything here fails (or succeeds) before any
//! upstream service would be contacted, so no fixtures are required.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use std::sync::Arc;

use firebase_identity::FirebaseIdentity;
use firestore_client::FirestoreClient;
use gcs_storage::GcsBucket;
use gemini_client::GeminiClient;
use google_auth::{ServiceAccountKey, TokenProvider, CLOUD_PLATFORM_SCOPE};
use monument_service::handlers;
use monument_service::services::{CommunityService, IdentificationService};
use monument_service::AppState;

const TEST_KEY_JSON: &str = r#"{
    "project_id": "demo-project",
    "private_key_id": "key-id",
    "private_key": "not-a-real-key",
    "client_email": "svc@demo-project.iam.gserviceaccount.com",
    "client_id": "123456",
    "auth_uri": "https://accounts.google.com/o/oauth2/auth",
    "token_uri": "https://oauth2.googleapis.com/token"
}"#;

fn build_state() -> AppState {
    let key = ServiceAccountKey::from_json(TEST_KEY_JSON).expect("parse test key");
    let tokens = Arc::new(TokenProvider::new(key, CLOUD_PLATFORM_SCOPE));

    let firestore = FirestoreClient::new("demo-project", tokens.clone());
    AppState {
        identity: FirebaseIdentity::new("demo-project", tokens.clone()),
        firestore: firestore.clone(),
        identifier: IdentificationService::new(GeminiClient::new("")),
        community: CommunityService::new(firestore, GcsBucket::new("demo-bucket", tokens)),
    }
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Assemble a multipart/form-data body from (name, optional filename,
/// value) triples.
fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, filename, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

#[actix_web::test]
async fn welcome_returns_greeting() {
    let app =
        test::init_service(App::new().route("/", web::get().to(handlers::welcome))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Welcome to the Travisco App!");
}

#[actix_web::test]
async fn health_reports_service_name() {
    let app =
        test::init_service(App::new().route("/health", web::get().to(handlers::health))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "monument-service");
}

#[actix_web::test]
async fn find_without_image_or_text_returns_400() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(build_state()))
            .route("/find", web::post().to(handlers::find_monument)),
    )
    .await;

    let (content_type, body) = multipart_body(&[("note", None, "unrelated")]);
    let req = test::TestRequest::post()
        .uri("/find")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("No valid input provided"));
}

#[actix_web::test]
async fn find_with_empty_text_returns_400() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(build_state()))
            .route("/find", web::post().to(handlers::find_monument)),
    )
    .await;

    let (content_type, body) = multipart_body(&[("text", None, "")]);
    let req = test::TestRequest::post()
        .uri("/find")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_post_with_missing_field_returns_400() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(build_state())).route(
            "/community/post",
            web::post().to(handlers::create_community_post),
        ),
    )
    .await;

    // Monument_name, Description and Review are absent
    let (content_type, body) = multipart_body(&[("Username", None, "maria")]);
    let req = test::TestRequest::post()
        .uri("/community/post")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Monument_name"));
}

#[actix_web::test]
async fn error_body_carries_status_code() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(build_state()))
            .route("/find", web::post().to(handlers::find_monument)),
    )
    .await;

    let (content_type, body) = multipart_body(&[]);
    let req = test::TestRequest::post()
        .uri("/find")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}
