//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_FRONTEND_URL, DEFAULT_GOOGLE_CALLBACK_URL,
    DEFAULT_JWT_COOKIE_EXPIRATION_DAYS, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ENV_PRODUCTION, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Google OAuth client settings.
///
/// Google login is disabled unless both the client id and secret are set.
#[derive(Clone, Default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    client_secret: Option<String>,
    pub callback_url: String,
}

impl GoogleConfig {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            callback_url: callback_url.into(),
        }
    }

    /// Client credentials, if Google login is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_cookie_expiration_days: i64,
    pub server_host: String,
    pub server_port: u16,
    pub frontend_url: String,
    pub google: GoogleConfig,
    pub environment: String,
    /// Read the client address from `X-Forwarded-For` / `X-Real-IP`
    pub trust_proxy: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("jwt_cookie_expiration_days", &self.jwt_cookie_expiration_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("frontend_url", &self.frontend_url)
            .field("google_enabled", &self.google.credentials().is_some())
            .field("environment", &self.environment)
            .field("trust_proxy", &self.trust_proxy)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    /// Fails if `JWT_SECRET` is missing in a release build, or shorter than
    /// the minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let mut config = Self::with_secret(jwt_secret)?;

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(url) = env::var("REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(hours) = parse_var("JWT_EXPIRES_IN_HOURS") {
            config.jwt_expiration_hours = hours;
        }
        if let Some(days) = parse_var("JWT_COOKIE_EXPIRES_IN_DAYS") {
            config.jwt_cookie_expiration_days = days;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = parse_var("SERVER_PORT") {
            config.server_port = port;
        }
        if let Ok(url) = env::var("FRONTEND_URL") {
            config.frontend_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(environment) = env::var("APP_ENV") {
            config.environment = environment;
        }
        if let Some(trust) = parse_var("TRUST_PROXY") {
            config.trust_proxy = trust;
        }

        config.google = GoogleConfig::new(
            env::var("GOOGLE_CLIENT_ID").ok(),
            env::var("GOOGLE_CLIENT_SECRET").ok(),
            env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_CALLBACK_URL.to_string()),
        );

        Ok(config)
    }

    /// Build a configuration with development defaults and the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret,
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            jwt_cookie_expiration_days: DEFAULT_JWT_COOKIE_EXPIRATION_DAYS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            google: GoogleConfig::new(None, None, DEFAULT_GOOGLE_CALLBACK_URL),
            environment: "development".to_string(),
            trust_proxy: false,
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Whether the service runs in production (secure cookies).
    pub fn is_production(&self) -> bool {
        self.environment == ENV_PRODUCTION
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
