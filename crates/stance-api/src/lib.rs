//! # Stance API
//!
//! HTTP surface of the thesis-stance study.
//!
//! Features:
//! - Axum router for the study conditions, the API tester and data export
//! - Tower middleware (request id, tracing, CORS, limits, security headers)
//! - SQLite-backed record store
//! - Graceful shutdown

pub mod error;
pub mod export;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult, StudyFailure};
pub use server::{ServerConfig, StanceServer};
pub use state::AppState;
