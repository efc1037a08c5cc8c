mod docs;
/// Health check
pub mod health;
/// HTML pages
pub mod pages;
/// Versioned JSON API
pub mod v1;

use aide::axum::{routing::get, ApiRouter};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .merge(pages::handler())
        .api_route("/health", get(health::handler))
        .nest("/api/v1", v1::handler())
}
