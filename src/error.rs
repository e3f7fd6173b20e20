// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;

/// Every failure leaves the service as one of these, rendered as
/// `{success: false, error: <status>, message: <string>}`
#[derive(Debug)]
pub enum ApiError {
    // 400 / 401 / 403 / 503 from the authorization gate
    Auth(AuthError),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity
    UnprocessableEntity(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => err.status_code(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Auth(err) => err.to_string(),
            ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::UnprocessableEntity(msg) => msg.clone(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.status_code().as_u16(),
            "message": self.message(),
        });

        if let ApiError::Auth(err) = self {
            body["code"] = json!(err.code());
        }

        body
    }
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("resource not found".to_string())
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("method not allowed".to_string())
    }

    pub fn unprocessable() -> Self {
        ApiError::UnprocessableEntity("unprocessable".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

/// Storage failures are not distinguished for clients: an unknown id is a
/// 404, anything else (constraint violation or connectivity) is a 422.
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ApiError::not_found(),
            DatabaseError::UniqueViolation(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                ApiError::unprocessable()
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::unprocessable()
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let body = ApiError::unprocessable().to_json();
        assert_eq!(
            body,
            json!({"success": false, "error": 422, "message": "unprocessable"})
        );

        let body = ApiError::not_found().to_json();
        assert_eq!(body["error"], 404);
        assert_eq!(body["message"], "resource not found");
        assert!(body.get("code").is_none());

        let body = ApiError::method_not_allowed().to_json();
        assert_eq!(
            body,
            json!({"success": false, "error": 405, "message": "method not allowed"})
        );
    }

    #[test]
    fn auth_errors_carry_code() {
        let err: ApiError = AuthError::TokenExpired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            err.to_json(),
            json!({
                "success": false,
                "error": 401,
                "code": "token_expired",
                "message": "Token expired.",
            })
        );
    }

    #[test]
    fn database_errors_map_to_404_or_422() {
        let err: ApiError = DatabaseError::NotFound("drink 7".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = DatabaseError::UniqueViolation("title".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
