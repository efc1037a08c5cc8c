/// Image upload and gallery
pub mod images;
/// Resource submission and listing
pub mod resources;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/upload", post(images::upload_image))
        .api_route("/gallery", get(images::list_gallery))
        .api_route(
            "/resources",
            post(resources::create_resource).get(resources::list_resources),
        )
}
