//! HTTP surface: `POST /detect` and `GET /health`

pub mod errors;
pub mod handlers;
pub mod server;

pub use errors::ApiError;
pub use handlers::{detect_handler, health_handler};
pub use server::{router, serve, AppState};
