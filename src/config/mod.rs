use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Drop, recreate and seed the drink table on startup
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwks_url: String,
    pub issuer: String,
    pub audience: String,
    pub jwks_timeout_secs: u64,
    pub jwks_cache_ttl_secs: u64,
    pub jwks_refresh_cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    /// Auth0 publishes its key set and issuer under the tenant domain
    pub fn for_auth0_domain(domain: &str, audience: impl Into<String>) -> Self {
        let domain = domain
            .trim_start_matches("https://")
            .trim_end_matches('/');
        Self {
            jwks_url: format!("https://{}/.well-known/jwks.json", domain),
            issuer: format!("https://{}/", domain),
            audience: audience.into(),
            jwks_timeout_secs: 5,
            jwks_cache_ttl_secs: 600,
            jwks_refresh_cooldown_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup so presets and
    /// overrides can be exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let audience = lookup("API_AUDIENCE").ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let mut auth = match lookup("AUTH0_DOMAIN") {
            Some(domain) => AuthConfig::for_auth0_domain(&domain, audience),
            None => {
                let jwks_url = lookup("AUTH_JWKS_URL")
                    .ok_or(ConfigError::Missing("AUTH0_DOMAIN or AUTH_JWKS_URL"))?;
                let issuer = lookup("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
                AuthConfig {
                    jwks_url,
                    issuer,
                    audience,
                    jwks_timeout_secs: 5,
                    jwks_cache_ttl_secs: 600,
                    jwks_refresh_cooldown_secs: 30,
                }
            }
        };
        if let Some(v) = lookup("AUTH_JWKS_URL") {
            auth.jwks_url = v;
        }
        if let Some(v) = lookup("AUTH_ISSUER") {
            auth.issuer = v;
        }
        url::Url::parse(&auth.jwks_url).map_err(|_| ConfigError::Invalid {
            key: "AUTH_JWKS_URL",
            value: auth.jwks_url.clone(),
        })?;

        let config = match environment {
            Environment::Production => Self::production(auth),
            Environment::Staging => Self::staging(auth),
            Environment::Development => Self::development(auth),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("COFFEE_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("COFFEE_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "COFFEE_API_PORT", value: v })?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = parse_override(lookup, "DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = v;
        }
        if let Some(v) = parse_override(lookup, "DATABASE_CONNECTION_TIMEOUT")? {
            self.database.connection_timeout = v;
        }
        if let Some(v) = parse_override(lookup, "DATABASE_RESET_ON_START")? {
            self.database.reset_on_start = v;
        }

        // Key set fetch policy
        if let Some(v) = parse_override(lookup, "AUTH_JWKS_TIMEOUT_SECS")? {
            self.auth.jwks_timeout_secs = v;
        }
        if let Some(v) = parse_override(lookup, "AUTH_JWKS_CACHE_TTL_SECS")? {
            self.auth.jwks_cache_ttl_secs = v;
        }
        if let Some(v) = parse_override(lookup, "AUTH_JWKS_REFRESH_COOLDOWN_SECS")? {
            self.auth.jwks_refresh_cooldown_secs = v;
        }

        // Security overrides
        if let Some(v) = parse_override(lookup, "SECURITY_ENABLE_CORS")? {
            self.security.enable_cors = v;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    pub fn development(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                reset_on_start: false,
            },
            auth,
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn staging(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                reset_on_start: false,
            },
            auth,
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:8100".to_string()],
            },
        }
    }

    pub fn production(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                reset_on_start: false,
            },
            auth,
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parse an optional override. A value that is present but malformed is an
/// error rather than a silent fallback to the preset.
fn parse_override<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}
