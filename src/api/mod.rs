//! HTTP server: static files plus a small JSON API

pub mod handlers;
pub mod listing;
pub mod models;
pub mod routes;

pub use routes::{AppState, create_router};
