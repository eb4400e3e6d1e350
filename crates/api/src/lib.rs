//! HTTP API layer for chirp.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: profiles, follows, posts, engagement, notifications,
//!   and direct messages
//! - **Extractors**: caller identity from the gateway-verified header
//! - **Response**: the JSON envelope shared by all endpoints
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
