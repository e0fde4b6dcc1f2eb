use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Hard ceiling on a single request, including every model call it makes.
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Units a user may spend per rate-limit window (one generation costs 5).
    pub rate_limit_capacity: u32,
    pub rate_limit_window_secs: u64,
    /// Chunk the note path the same way as flashcards and merge sections in order.
    pub chunk_notes: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: optional_env("REQUEST_TIMEOUT_SECS", 60)?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            rate_limit_capacity: optional_env("RATE_LIMIT_CAPACITY", 50)?,
            rate_limit_window_secs: optional_env("RATE_LIMIT_WINDOW_SECS", 60)?,
            chunk_notes: optional_env("CHUNK_NOTES", false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
