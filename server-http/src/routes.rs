use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use shared::config::ServerConfig;
use shared_http::TOTAL_COUNT_HEADER;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Build and configure the application router.
///
/// Trailing slashes are trimmed before routing, so the router comes back
/// wrapped; serve it with `ServiceExt::<Request>::into_make_service`.
pub fn build_router(state: AppState, config: &ServerConfig) -> NormalizePath<Router> {
    let api = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        );

    let router = Router::new()
        .nest("/api", api)
        // Middleware
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        // Browsers hide non-safelisted headers unless exposed.
        .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
