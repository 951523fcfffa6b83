//! Axum HTTP relay for the HotScore upload page.
//!
//! This crate provides:
//! - `POST /api/predict`, which validates an uploaded image and relays it
//!   to the hosted prediction space
//! - The upload page, health and readiness probes
//! - Request logging, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod relay;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use relay::PredictionRelay;
pub use routes::create_router;
pub use state::AppState;
