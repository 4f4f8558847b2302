use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use leads_common::Config;

pub mod auth;
pub mod pages;
pub mod templates;

use auth::{Authenticator, SharedSecret};

// --- App State ---

pub struct AppState {
    pub config: Config,
    pub auth: Box<dyn Authenticator>,
}

impl AppState {
    /// State guarded by the configured shared secret.
    pub fn new(config: Config) -> Self {
        let auth = Box::new(SharedSecret::new(config.admin_secret.clone()));
        Self::with_authenticator(config, auth)
    }

    pub fn with_authenticator(config: Config, auth: Box<dyn Authenticator>) -> Self {
        Self { config, auth }
    }
}

// --- Router ---

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route("/admin", get(pages::admin_page))
        .route("/admin/login", post(pages::login_submit))
        .with_state(state)
        // Lead data must never be cached by browsers or proxies
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        // Only log the path: the query string may carry the admin secret
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
