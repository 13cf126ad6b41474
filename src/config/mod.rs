use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Default token lifetime in days. The identity payload carries
/// `expires = created + token_ttl_days * 86400` and every protected
/// operation compares it against the clock.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
}

/// Process-wide key material. Read once at startup and handed to the
/// `CredentialEncoder` / `TokenService` constructors; operation bodies never
/// reach back into the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Fernet key for the identity payload cipher (`CRYPTOGRAPHIC_KEY`).
    pub cryptographic_key: String,
    /// HS256 signing key for the token wrapper (`JWT_KEY`).
    pub jwt_key: String,
    /// Token lifetime in days (`TOKEN_TTL_DAYS`).
    pub token_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        Self {
            environment,
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
                    .unwrap_or(3000),
                database_url: env::var("DATABASE_URL").ok(),
            },
            security: SecurityConfig {
                cryptographic_key: env::var("CRYPTOGRAPHIC_KEY").unwrap_or_default(),
                jwt_key: env::var("JWT_KEY").unwrap_or_default(),
                token_ttl_days: env::var("TOKEN_TTL_DAYS")
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(TOKEN_TTL_DAYS),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
