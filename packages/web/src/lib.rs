//! HTTP server for the notes API: axum routes over the `api` crate.

pub mod error;
pub mod gate;
pub mod routes;
pub mod state;

use anyhow::Context as _;
use axum::http::header::{
    HeaderName, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, EXPIRES,
    ORIGIN, PRAGMA,
};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use routes::router;
pub use state::AppState;

/// CORS for the configured browser origins, with credentials.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
            CACHE_CONTROL,
            PRAGMA,
            EXPIRES,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([CONTENT_DISPOSITION]))
}

/// The full application: routes plus CORS and request tracing.
pub fn app(state: AppState, cors_origins: &[String]) -> anyhow::Result<Router> {
    Ok(router(state)
        .layer(cors_layer(cors_origins)?)
        .layer(TraceLayer::new_for_http()))
}
