//! # citrus-api
//!
//! HTTP API layer for CitrusNotes built on Axum.
//!
//! Provides the entry, favorites and health endpoints, the owner-identity
//! extractor, middleware (CORS, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
