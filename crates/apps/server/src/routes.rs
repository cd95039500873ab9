use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Static client files, plus a liveness probe. There is no API surface.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .fallback_service(ServeDir::new(&config.static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}
