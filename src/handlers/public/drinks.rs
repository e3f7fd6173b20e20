use axum::extract::State;

use crate::api::DrinksResponse;
use crate::database::models::{Drink, DrinkShort};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /drinks - public menu, short view (ingredient names withheld)
pub async fn list(State(state): State<AppState>) -> Result<DrinksResponse<DrinkShort>, ApiError> {
    let drinks = state.drinks.list().await.map_err(|e| {
        tracing::error!("Failed to list drinks: {}", e);
        ApiError::not_found()
    })?;

    Ok(DrinksResponse::new(drinks.iter().map(Drink::short).collect()))
}
