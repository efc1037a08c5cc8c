//! Affordable IT Resources backend service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Image bucket operations
pub mod image_storage;

/// HTTP routes
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Application state
pub mod state;

/// Configuration, environment, errors and extractors
pub mod types;
