/// Question answering endpoint.
pub mod ask;
/// Health check endpoint.
pub mod health;
