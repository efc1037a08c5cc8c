//! Static HTML pages of the site

use aide::axum::ApiRouter;
use axum::{response::Html, routing::get};

const INDEX_PAGE: &str = include_str!("../../templates/index.html");
const SUBMIT_PAGE: &str = include_str!("../../templates/submit.html");

/// Routes for the hub page and the submission form
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .route("/", get(index))
        .route("/submit", get(submit))
}

#[allow(clippy::unused_async)]
async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

#[allow(clippy::unused_async)]
async fn submit() -> Html<&'static str> {
    Html(SUBMIT_PAGE)
}
