use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Permission;
use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{require_permission, PermissionGuard};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root).fallback(public::method_not_allowed))
        .route("/health", get(public::health).fallback(public::method_not_allowed))
        // Drink menu (public list, protected everything else)
        .merge(drink_routes(&state))
        .fallback(public::fallback)
        // Global middleware
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Method fallbacks go on the merged MethodRouter; route_layer guards never wrap them.
fn drink_routes(state: &AppState) -> Router<AppState> {
    let create_guard = PermissionGuard::new(state, Permission::CreateDrinks);
    let detail_guard = PermissionGuard::new(state, Permission::ReadDrinkDetail);
    let update_guard = PermissionGuard::new(state, Permission::UpdateDrinks);
    let delete_guard = PermissionGuard::new(state, Permission::DeleteDrinks);

    Router::new()
        .route(
            "/drinks",
            get(public::drinks_list)
                .merge(
                    post(protected::drink_create)
                        .route_layer(middleware::from_fn_with_state(create_guard, require_permission)),
                )
                .fallback(public::method_not_allowed),
        )
        .route(
            "/drinks-detail",
            get(protected::drinks_detail)
                .route_layer(middleware::from_fn_with_state(detail_guard, require_permission))
                .fallback(public::method_not_allowed),
        )
        .route(
            "/drinks/:id",
            patch(protected::drink_update)
                .route_layer(middleware::from_fn_with_state(update_guard, require_permission))
                .merge(
                    delete(protected::drink_delete)
                        .route_layer(middleware::from_fn_with_state(delete_guard, require_permission)),
                )
                .fallback(public::method_not_allowed),
        )
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }
    if config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
