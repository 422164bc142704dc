//! Monument Service
//!
//! Backend for the Travisco app: monument identification backed by a
//! generative vision model, plus per-monument community posts with
//! uploaded media.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

use firebase_identity::FirebaseIdentity;
use firestore_client::FirestoreClient;
use services::community::CommunityService;
use services::identification::IdentificationService;

/// Shared application state.
///
/// Every external-service client is constructed once at startup and
/// injected here; handlers never reach for ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub identity: FirebaseIdentity,
    pub firestore: FirestoreClient,
    pub identifier: IdentificationService,
    pub community: CommunityService,
}
