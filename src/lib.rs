pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Build the full application router on top of `state`.
///
/// Identity resolution and request logging run for every route, so tests
/// drive the exact stack the binary serves.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/feeds", routes::feeds::router())
        .nest("/api/checklists", routes::checklists::router())
        .nest("/api/items", routes::items::router())
        .nest("/api/comments", routes::comments::router())
        .nest("/api/categories", routes::categories::router())
        .nest("/api/notifications", routes::notifications::router())
        .nest("/api/users", routes::users::router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            utils::middleware::identity_middleware,
        ))
        .layer(middleware::from_fn(
            utils::middleware::request_logging_middleware,
        ))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "Checkfeed is running!"
}

fn cors_layer(config: &config::Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.is_development() {
        return CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .split(',')
        .filter_map(|origin| {
            let origin = origin.trim();
            match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(Any)
        .allow_origin(origins)
}
