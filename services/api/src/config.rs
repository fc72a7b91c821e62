//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use library_core::render::RenderOptions;
use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Root of the files served under `/static`; uploads go to `<static_dir>/books`.
    pub static_dir: PathBuf,
    /// Externally visible origin, used to build PDF and password-reset links.
    pub public_base_url: String,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    pub text_model: String,
    pub google_books_api_key: Option<String>,
    pub google_books_url: String,
    pub wikipedia_api_url: String,
    pub wikipedia_rest_url: String,
    pub http_timeout: Duration,
    pub session_ttl_days: i64,
    pub reset_token_ttl_minutes: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static"));
        let public_base_url = var_or("PUBLIC_BASE_URL", "http://127.0.0.1:3000")
            .trim_end_matches('/')
            .to_string();
        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let google_books_api_key = std::env::var("GOOGLE_BOOKS_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let text_model = var_or("TEXT_MODEL", "gpt-4o-mini");
        let google_books_url = var_or(
            "GOOGLE_BOOKS_URL",
            "https://www.googleapis.com/books/v1/volumes",
        );
        let wikipedia_api_url = var_or("WIKIPEDIA_API_URL", "https://en.wikipedia.org/w/api.php");
        let wikipedia_rest_url = var_or(
            "WIKIPEDIA_REST_URL",
            "https://en.wikipedia.org/api/rest_v1",
        );
        let http_timeout = Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", "10")?);

        // --- Load Auth Settings ---
        let session_ttl_days = parse_var("SESSION_TTL_DAYS", "30")?;
        let reset_token_ttl_minutes = parse_var("RESET_TOKEN_TTL_MINUTES", "60")?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            static_dir,
            public_base_url,
            cors_origin,
            openai_api_key,
            text_model,
            google_books_api_key,
            google_books_url,
            wikipedia_api_url,
            wikipedia_rest_url,
            http_timeout,
            session_ttl_days,
            reset_token_ttl_minutes,
        })
    }

    /// Directory uploaded PDFs and cover pictures are written to.
    pub fn uploads_dir(&self) -> PathBuf {
        self.static_dir.join("books")
    }

    /// Public URL of the directory served from [`Config::uploads_dir`].
    pub fn pdf_base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue("PUBLIC_BASE_URL".to_string(), reason);
        let mut url = Url::parse(&self.public_base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["static", "books"]);
        Ok(url)
    }

    /// Card rendering for the chat router. Each stored PDF name becomes one
    /// percent-encoded path segment under [`Config::pdf_base_url`].
    pub fn render_options(&self) -> Result<RenderOptions, ConfigError> {
        let base = self.pdf_base_url()?;
        Ok(RenderOptions::new(move |file| {
            let mut url = base.clone();
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(file);
            }
            url.to_string()
        }))
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(name, default);
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
