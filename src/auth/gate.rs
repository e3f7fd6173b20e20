use axum::http::HeaderMap;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use std::sync::Arc;

use super::{bearer_token, AuthError, Claims, KeySource, Permission};
use crate::config::AuthConfig;

/// Verifies bearer tokens against the identity provider's signing keys and
/// checks the permission an endpoint requires.
pub struct AuthGate {
    keys: Arc<dyn KeySource>,
    validation: Validation,
}

impl AuthGate {
    pub fn new(keys: Arc<dyn KeySource>, audience: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        Self { keys, validation }
    }

    pub fn from_config(keys: Arc<dyn KeySource>, config: &AuthConfig) -> Self {
        Self::new(keys, &config.audience, &config.issuer)
    }

    /// Full gate: header extraction, token verification, permission check
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: Permission,
    ) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verify(token).await?;
        claims.require(permission)?;
        Ok(claims)
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = self.keys.key_for(&kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
            ErrorKind::MissingRequiredClaim(claim) if matches!(claim.as_str(), "aud" | "iss") => {
                AuthError::InvalidClaims
            }
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        Ok(data.claims)
    }
}
