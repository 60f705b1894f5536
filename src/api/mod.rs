//! HTTP surface for the extension and web UI.

pub mod routes;

pub use routes::{AppState, api_routes};
