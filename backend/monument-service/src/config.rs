//! Configuration for monument-service
use serde::Deserialize;

/// Main configuration struct, loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Firebase / Google Cloud project backing identity and Firestore
    pub firebase_project_id: String,

    /// Service account key JSON, inline (takes precedence over the path)
    #[serde(default)]
    pub service_account_json: Option<String>,

    /// Path to the service account key JSON file
    #[serde(default)]
    pub service_account_json_path: Option<String>,

    /// Cloud Storage bucket holding community media
    pub storage_bucket: String,

    /// Gemini API key
    #[serde(default)]
    pub gemini_api_key: String,

    /// Gemini model used for identification
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Comma-separated CORS origins, or `*`
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
