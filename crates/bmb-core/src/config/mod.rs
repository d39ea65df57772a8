mod database;
mod pagination;

pub use database::DatabaseConfig;
pub use pagination::PaginationConfig;

use serde::{Deserialize, Serialize};

use crate::error::{BmbError, Result};

/// Longest accepted token lifetime (ten years).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365 * 10;

/// Root configuration shared by the generator and the runtime.
///
/// Every value comes from the environment (after `.env` has been loaded by the
/// caller) and falls back to the same defaults the generated projects use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmbConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Database connection settings.
    pub database: DatabaseConfig,

    /// Token signing settings.
    pub auth: AuthSettings,

    /// List endpoint paging limits.
    pub pagination: PaginationConfig,

    /// Allowed CORS origins (`*` allows any).
    pub cors_origins: Vec<String>,

    /// Load models declared in `models.bmdb` at startup.
    pub auto_load_models: bool,
}

impl BmbConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("FLASK_ENV").unwrap_or_else(|| "production".to_string());
        let debug = match lookup("DEBUG") {
            Some(raw) => parse_bool(&raw),
            None => environment == "development",
        };

        let server = ServerConfig {
            host: lookup("HOST").unwrap_or_else(default_host),
            port: parse_number(&lookup, "PORT", default_port())?,
            debug,
            environment,
        };

        let database = DatabaseConfig {
            connection: lookup("DB_CONNECTION")
                .unwrap_or_else(|| DatabaseConfig::default().connection),
        };

        let auth = AuthSettings {
            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(default_jwt_secret),
            jwt_expiration_hours: parse_number(
                &lookup,
                "JWT_EXPIRATION_HOURS",
                default_jwt_expiration_hours(),
            )?,
        };
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&auth.jwt_expiration_hours) {
            return Err(BmbError::Config(format!(
                "JWT_EXPIRATION_HOURS must be between 1 and {}, got {}",
                MAX_JWT_EXPIRATION_HOURS, auth.jwt_expiration_hours
            )));
        }

        let defaults = PaginationConfig::default();
        let pagination = PaginationConfig {
            default_page_size: parse_number(
                &lookup,
                "DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            )?,
            max_page_size: parse_number(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?,
        };
        if pagination.default_page_size == 0 || pagination.max_page_size == 0 {
            return Err(BmbError::Config(
                "DEFAULT_PAGE_SIZE and MAX_PAGE_SIZE must be positive".to_string(),
            ));
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            server,
            database,
            auth,
            pagination,
            cors_origins,
            auto_load_models: lookup("AUTO_LOAD_MODELS")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
        })
    }
}

impl Default for BmbConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthSettings::default(),
            pagination: PaginationConfig::default(),
            cors_origins: vec!["*".to_string()],
            auto_load_models: true,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind to.
    pub host: String,

    /// HTTP port.
    pub port: u16,

    /// Debug mode (`DEBUG`, or `FLASK_ENV=development`).
    pub debug: bool,

    /// Deployment environment name.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            environment: "production".to_string(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Bearer token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret used to sign tokens.
    pub jwt_secret: String,

    /// Token lifetime in hours.
    pub jwt_expiration_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
        }
    }
}

fn default_jwt_secret() -> String {
    "bmb-secret-key".to_string()
}

fn default_jwt_expiration_hours() -> i64 {
    24
}

/// Parse a boolean flag the way generated projects do.
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "t" | "yes"
    )
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BmbError::Config(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BmbConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.debug);
        assert_eq!(config.auth.jwt_expiration_hours, 24);
        assert_eq!(config.database.connection, "sqlite:///app.db");
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.pagination.max_page_size, 100);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(config.auto_load_models);
    }

    #[test]
    fn test_overrides() {
        let config = BmbConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRATION_HOURS", "2"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("AUTO_LOAD_MODELS", "false"),
            ("DB_CONNECTION", "postgresql://localhost/app"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.jwt_expiration_hours, 2);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.auto_load_models);
        assert_eq!(config.database.connection, "postgresql://localhost/app");
    }

    #[test]
    fn test_debug_from_flask_env() {
        let config = BmbConfig::from_lookup(lookup_from(&[("FLASK_ENV", "development")])).unwrap();
        assert!(config.server.debug);

        let config = BmbConfig::from_lookup(lookup_from(&[
            ("FLASK_ENV", "development"),
            ("DEBUG", "0"),
        ]))
        .unwrap();
        assert!(!config.server.debug);
    }

    #[test]
    fn test_invalid_port() {
        let result = BmbConfig::from_lookup(lookup_from(&[("PORT", "http")]));
        assert!(matches!(result, Err(BmbError::Config(_))));
    }

    #[test]
    fn test_token_lifetime_is_bounded() {
        for raw in ["0", "-3", "10000000000000"] {
            let result = BmbConfig::from_lookup(lookup_from(&[("JWT_EXPIRATION_HOURS", raw)]));
            assert!(matches!(result, Err(BmbError::Config(_))), "{} accepted", raw);
        }

        let max = MAX_JWT_EXPIRATION_HOURS.to_string();
        let config = BmbConfig::from_lookup(lookup_from(&[("JWT_EXPIRATION_HOURS", &max)])).unwrap();
        assert_eq!(config.auth.jwt_expiration_hours, MAX_JWT_EXPIRATION_HOURS);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = BmbConfig::from_lookup(lookup_from(&[("MAX_PAGE_SIZE", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("True"));
        assert!(parse_bool("1"));
        assert!(parse_bool("t"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }
}
