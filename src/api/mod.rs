//! HTTP API
//!
//! - `POST /ask` - `{"question": "..."}` in, `{"answer": "..."}` out
//! - `GET /health` - status, version, chunk count and model names
//!
//! Errors are returned as `{"error": "..."}` with a 4xx/5xx status.

/// Request handlers for each endpoint.
pub mod handlers;
/// Router and middleware.
pub mod routes;

pub use routes::create_router;
