//! HTTP API module.
//!
//! Provides the REST endpoints for account management and authentication.

mod error;
mod handlers;
mod routes;
mod state;

// Re-export error types for external use
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
