//! Account handlers.
//!
//! Signup delegates all credential handling to the identity provider and
//! mirrors the profile into the `users` collection. Login only confirms
//! that an account exists for the email.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::models::{LoginRequest, MessageResponse, SignupRequest};
use crate::services::community::USERS_COLLECTION;
use crate::AppState;

/// Register endpoint handler
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 500, description = "Identity provider or store failure")
    )
)]
pub async fn signup(
    state: web::Data<AppState>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let user = state
        .identity
        .create_user(&payload.email, &payload.password, &payload.name)
        .await?;

    state
        .firestore
        .set_document(
            USERS_COLLECTION,
            &user.uid,
            &json!({ "name": payload.name, "email": payload.email }),
        )
        .await?;

    info!(uid = %user.uid, "user account created");
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Signup successful! Please check your email for verification.",
    )))
}

/// Login endpoint handler. Looks the account up by email; the credential
/// itself is never verified here.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Account exists", body = MessageResponse),
        (status = 500, description = "Lookup failed or no such account")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let user = state.identity.get_user_by_email(&payload.email).await?;

    info!(uid = %user.uid, "login lookup succeeded");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Login successful!")))
}
