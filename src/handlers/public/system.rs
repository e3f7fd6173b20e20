use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service info
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "name": "Coffee Shop API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "drinks": "GET /drinks (public)",
            "drinks_detail": "GET /drinks-detail (get:drinks-detail)",
            "create": "POST /drinks (post:drinks)",
            "update": "PATCH /drinks/:id (patch:drinks)",
            "delete": "DELETE /drinks/:id (delete:drinks)",
        }
    }))
}

/// GET /health - storage liveness
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.drinks.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": 503,
                    "message": "database unavailable",
                    "status": "degraded",
                    "timestamp": now
                })),
            )
        }
    }
}

/// Unknown routes still answer with the error envelope
pub async fn fallback() -> ApiError {
    ApiError::not_found()
}

/// Known path, unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
