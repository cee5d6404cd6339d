use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub chat_gateway_url: String,
    pub chat_gateway_key: String,
    /// Bearer token granting the owner a full remote session.
    pub owner_api_token: String,
    /// Optional token granting owner editing without a remote session;
    /// mutations then persist to local draft snapshots only.
    pub draft_edit_token: Option<String>,
    pub draft_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            chat_gateway_url: require_env("CHAT_GATEWAY_URL")?,
            chat_gateway_key: require_env("CHAT_GATEWAY_KEY")?,
            owner_api_token: require_env("OWNER_API_TOKEN")?,
            draft_edit_token: std::env::var("DRAFT_EDIT_TOKEN").ok(),
            draft_dir: std::env::var("DRAFT_DIR").unwrap_or_else(|_| "drafts".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
