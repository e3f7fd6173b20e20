use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Extract the bearer token from the Authorization header.
///
/// The header must be exactly two whitespace separated segments, the first
/// being `bearer` in any letter case.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let value = header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader(AuthError::NOT_BEARER))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => {
            Err(AuthError::MalformedHeader(AuthError::NOT_BEARER))
        }
        [] => Err(AuthError::MalformedHeader(AuthError::NOT_BEARER)),
        [_] => Err(AuthError::MalformedHeader(AuthError::TOKEN_NOT_FOUND)),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader(AuthError::EXTRA_SEGMENTS)),
    }
}
