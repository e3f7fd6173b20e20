use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::api::{DeletedResponse, DrinksResponse};
use crate::auth::Claims;
use crate::database::models::{Drink, DrinkChanges, DrinkLong, NewDrink};
use crate::error::ApiError;
use crate::state::AppState;

fn who(claims: &Claims) -> &str {
    claims.sub.as_deref().unwrap_or("unknown")
}

fn drink_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    // A non-integer id can never name a drink
    id.map(|Path(id)| id).map_err(|_| ApiError::not_found())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::unprocessable()
    })
}

/// GET /drinks-detail - full recipes, requires `get:drinks-detail`
pub async fn detail(State(state): State<AppState>) -> Result<DrinksResponse<DrinkLong>, ApiError> {
    let drinks = state.drinks.list().await?;
    Ok(DrinksResponse::new(drinks.iter().map(Drink::long).collect()))
}

/// POST /drinks - requires `post:drinks`
///
/// Both `title` and `recipe` must be present and well formed, otherwise 422.
/// A duplicate title is a storage constraint violation, also 422.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NewDrink>, JsonRejection>,
) -> Result<DrinksResponse<DrinkLong>, ApiError> {
    let new_drink = body(payload)?;
    if !new_drink.is_valid() {
        return Err(ApiError::unprocessable());
    }

    let drink = state
        .drinks
        .insert(new_drink)
        .await
        .map_err(|e| {
            tracing::warn!("Create by {} failed: {}", who(&claims), e);
            ApiError::unprocessable()
        })?;

    Ok(DrinksResponse::one(drink.long()))
}

/// PATCH /drinks/:id - requires `patch:drinks`
///
/// `title` and `recipe` are applied independently; whichever is absent is
/// left exactly as stored.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DrinkChanges>, JsonRejection>,
) -> Result<DrinksResponse<DrinkLong>, ApiError> {
    let id = drink_id(id)?;

    if state.drinks.get(id).await?.is_none() {
        return Err(ApiError::not_found());
    }

    let changes = body(payload)?;
    if !changes.is_valid() {
        return Err(ApiError::unprocessable());
    }

    let drink = state.drinks.update(id, changes).await?;
    tracing::debug!("Drink {} updated by {}", id, who(&claims));

    Ok(DrinksResponse::one(drink.long()))
}

/// DELETE /drinks/:id - requires `delete:drinks`
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<DeletedResponse, ApiError> {
    let id = drink_id(id)?;

    state.drinks.delete(id).await?;
    tracing::debug!("Drink {} deleted by {}", id, who(&claims));

    Ok(DeletedResponse::new(id))
}
