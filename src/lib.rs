pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod supply;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;

/// Builds the full HTTP application over `state`.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(handlers::public::service::root))
        .route("/health", get(handlers::public::service::health))
        .merge(user_public_routes())
        // Protected API (JWT access token; admin routes add a role check)
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    use handlers::public::user;

    Router::new()
        .route("/user/register/", post(user::register_post))
        .route("/user/login/", post(user::login_post))
        .route("/user/token/refresh/", post(user::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user/me/", get(handlers::protected::me::me_get))
        .merge(node_routes())
        .merge(product_routes())
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state, middleware::jwt_auth_middleware))
}

fn node_routes() -> Router<AppState> {
    use axum::routing::{delete, put};
    use handlers::protected::supply::{node_products, nodes};

    Router::new()
        .route("/supply/nodes/", get(nodes::node_list))
        .route("/supply/nodes/create/", post(nodes::node_create))
        .route("/supply/nodes/:id/", get(nodes::node_get))
        .route("/supply/nodes/:id/update/", put(nodes::node_put).patch(nodes::node_patch))
        .route("/supply/nodes/:id/delete/", delete(nodes::node_delete))
        // Products nested under their owner
        .route("/supply/nodes/:id/products/", get(node_products::node_product_list))
        .route(
            "/supply/nodes/:id/products/:product_id/",
            get(node_products::node_product_get),
        )
}

fn product_routes() -> Router<AppState> {
    use axum::routing::{delete, put};
    use handlers::protected::supply::products;

    Router::new()
        .route("/supply/products/", get(products::product_list))
        .route("/supply/products/create/", post(products::product_create))
        .route("/supply/products/:id/", get(products::product_get))
        .route(
            "/supply/products/:id/update/",
            put(products::product_put).patch(products::product_patch),
        )
        .route("/supply/products/:id/delete/", delete(products::product_delete))
}

fn admin_routes() -> Router<AppState> {
    use handlers::elevated::supply;

    Router::new()
        .route("/supply/nodes/clear-debt/", post(supply::clear_debt_post))
        .route_layer(from_fn(middleware::require_admin_middleware))
}

/// Permissive in development, otherwise limited to the configured origins.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
