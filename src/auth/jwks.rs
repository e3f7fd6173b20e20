use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::AuthError;
use crate::config::AuthConfig;

/// One entry of a published JSON Web Key Set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kid: Option<String>,
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// RSA signing keys by `kid`. Other key types and keys without a `kid`
    /// cannot verify RS256 tokens and are skipped.
    pub fn decoding_keys(&self) -> HashMap<String, DecodingKey> {
        let mut keys = HashMap::new();
        for jwk in &self.keys {
            let (Some(kid), Some(n), Some(e)) = (&jwk.kid, &jwk.n, &jwk.e) else {
                tracing::debug!(kty = %jwk.kty, "Skipping JWK without kid or RSA components");
                continue;
            };
            if jwk.kty != "RSA" {
                tracing::debug!(kid = %kid, kty = %jwk.kty, "Skipping non-RSA JWK");
                continue;
            }
            if matches!(jwk.use_.as_deref(), Some(u) if u != "sig") {
                continue;
            }
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(kid.clone(), key);
                }
                Err(err) => tracing::warn!(kid = %kid, "Invalid RSA key in JWKS: {}", err),
            }
        }
        keys
    }
}

/// Resolves a token's `kid` to the key that verifies its signature
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

/// Fixed keys, e.g. a test key pair or a key set shipped with the deployment
#[derive(Clone, Default)]
pub struct StaticKeys {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeys {
    pub fn new(keys: HashMap<String, DecodingKey>) -> Self {
        Self { keys }
    }

    pub fn from_jwks(set: &JwkSet) -> Self {
        Self::new(set.decoding_keys())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeySource for StaticKeys {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.keys.get(kid).cloned().ok_or(AuthError::UnknownKey)
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Key set fetched from the identity provider's JWKS URL.
///
/// Keys are cached for `cache_ttl`. An unknown `kid` triggers a refetch
/// (key rotation), but at most once per `refresh_cooldown`.
pub struct RemoteJwks {
    url: String,
    client: reqwest::Client,
    cache_ttl: Duration,
    refresh_cooldown: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.into(),
            client,
            cache_ttl: Duration::from_secs(600),
            refresh_cooldown: Duration::from_secs(30),
            cache: RwLock::new(None),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(&config.jwks_url, Duration::from_secs(config.jwks_timeout_secs))?
            .with_cache_ttl(Duration::from_secs(config.jwks_cache_ttl_secs))
            .with_refresh_cooldown(Duration::from_secs(config.jwks_refresh_cooldown_secs)))
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        let unavailable = |e: reqwest::Error| {
            tracing::error!(url = %self.url, "JWKS fetch failed: {}", e);
            AuthError::KeySetUnavailable(e.to_string())
        };

        let set: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let keys = set.decoding_keys();
        tracing::info!(url = %self.url, keys = keys.len(), "Fetched signing-key set");
        Ok(keys)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    if age < self.refresh_cooldown {
                        tracing::debug!(kid = kid, "Unknown kid, JWKS refresh on cooldown");
                        return Err(AuthError::UnknownKey);
                    }
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another request may have refreshed while this one waited for the lock
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.refresh_cooldown.min(self.cache_ttl) {
                return cached.keys.get(kid).cloned().ok_or(AuthError::UnknownKey);
            }
        }

        let keys = self.fetch().await?;
        let key = keys.get(kid).cloned();
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or(AuthError::UnknownKey)
    }
}
