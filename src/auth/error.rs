use axum::http::StatusCode;
use thiserror::Error;

/// Authorization failures raised before a protected handler runs.
/// Each variant maps to one HTTP status and one machine-readable code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Authorization malformed.")]
    MissingKeyId,

    #[error("Unable to find the appropriate key.")]
    UnknownKey,

    #[error("Unable to fetch signing keys.")]
    KeySetUnavailable(String),

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    InvalidToken(String),

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied(String),
}

impl AuthError {
    pub const NOT_BEARER: &'static str = "Authorization header must start with \"Bearer\".";
    pub const TOKEN_NOT_FOUND: &'static str = "Token not found.";
    pub const EXTRA_SEGMENTS: &'static str = "Authorization header must be bearer token.";

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader(_)
            | AuthError::MissingKeyId
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::UnknownKey
            | AuthError::InvalidToken(_)
            | AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_)
            | AuthError::MissingKeyId
            | AuthError::UnknownKey
            | AuthError::InvalidToken(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied(_) => "unauthorized",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
        }
    }
}
