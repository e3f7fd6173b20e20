use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{AuthGate, Permission};
use crate::error::ApiError;
use crate::state::AppState;

/// Gate plus the one permission a route requires
#[derive(Clone)]
pub struct PermissionGuard {
    gate: Arc<AuthGate>,
    permission: Permission,
}

impl PermissionGuard {
    pub fn new(state: &AppState, permission: Permission) -> Self {
        Self {
            gate: state.gate.clone(),
            permission,
        }
    }
}

/// Rejects the request unless the bearer token verifies and grants the
/// guard's permission. Verified claims are injected as a request extension.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = guard
        .gate
        .authorize(request.headers(), guard.permission)
        .await
        .map_err(|err| {
            tracing::debug!(
                permission = %guard.permission,
                code = err.code(),
                "Authorization rejected: {}",
                err
            );
            ApiError::from(err)
        })?;

    tracing::debug!(
        permission = %guard.permission,
        sub = claims.sub.as_deref().unwrap_or("-"),
        "Authorization granted"
    );
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
