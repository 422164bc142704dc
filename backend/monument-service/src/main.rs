/// Monument Service - HTTP Server
///
/// Identifies monuments from an image or text query via a generative
/// model and serves per-monument community posts.
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use firebase_identity::FirebaseIdentity;
use firestore_client::FirestoreClient;
use gcs_storage::GcsBucket;
use gemini_client::GeminiClient;
use google_auth::{ServiceAccountKey, TokenProvider, CLOUD_PLATFORM_SCOPE};
use monument_service::handlers;
use monument_service::openapi::ApiDoc;
use monument_service::services::{CommunityService, IdentificationService};
use monument_service::{AppState, Config};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn load_service_account(config: &Config) -> anyhow::Result<ServiceAccountKey> {
    if let Some(ref inline) = config.service_account_json {
        ServiceAccountKey::from_json(inline).context("parsing SERVICE_ACCOUNT_JSON")
    } else if let Some(ref path) = config.service_account_json_path {
        ServiceAccountKey::from_file(path)
            .with_context(|| format!("reading service account key at {path}"))
    } else {
        anyhow::bail!(
            "service account credentials required: set SERVICE_ACCOUNT_JSON or \
             SERVICE_ACCOUNT_JSON_PATH"
        )
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e}");
            eprintln!("ERROR: Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting monument-service v{}", env!("CARGO_PKG_VERSION"));

    let key = load_service_account(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e:#}")))?;
    let tokens = Arc::new(TokenProvider::new(key, CLOUD_PLATFORM_SCOPE));

    let identity = FirebaseIdentity::new(&config.firebase_project_id, tokens.clone());
    let firestore = FirestoreClient::new(&config.firebase_project_id, tokens.clone());
    let bucket = GcsBucket::new(&config.storage_bucket, tokens);
    let model = GeminiClient::with_model(&config.gemini_api_key, &config.gemini_model);
    if !model.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set; identification requests will fail");
    }

    let state = AppState {
        identity,
        firestore: firestore.clone(),
        identifier: IdentificationService::new(model),
        community: CommunityService::new(firestore, bucket),
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("monument-service listening on {bind_address}");

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .route("/", web::get().to(handlers::welcome))
            .route("/health", web::get().to(handlers::health))
            .route("/signup", web::post().to(handlers::signup))
            .route("/login", web::post().to(handlers::login))
            .route("/find", web::post().to(handlers::find_monument))
            .route("/community", web::get().to(handlers::get_all_community))
            .route("/community/post", web::post().to(handlers::create_community_post))
            .route(
                "/community/{monument_name}",
                web::get().to(handlers::get_community),
            )
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
