//! Application builder.
//!
//! Assembles routes, state and the middleware stack into an Axum router.

use crate::{
    middleware::{logging_middleware, request_id_middleware},
    routes,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use vcm_common::ServerConfig;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    let timeout = state.config.request_timeout();

    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::v1::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(logging_middleware))
                .layer(CompressionLayer::new())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout)),
        )
}

/// Build CORS layer from configuration; no configured origins means any origin
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_allowed_origins.is_empty()
        || config.cors_allowed_origins.iter().any(|o| o == "*")
    {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
