use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// `{success: true, drinks: [...]}` envelope shared by list, create and update
#[derive(Debug, Serialize)]
pub struct DrinksResponse<T: Serialize> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T: Serialize> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }

    /// Create and update answer with exactly one drink
    pub fn one(drink: T) -> Self {
        Self::new(vec![drink])
    }
}

impl<T: Serialize> IntoResponse for DrinksResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{success: true, delete: id}`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub delete: i32,
}

impl DeletedResponse {
    pub fn new(id: i32) -> Self {
        Self {
            success: true,
            delete: id,
        }
    }
}

impl IntoResponse for DeletedResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
