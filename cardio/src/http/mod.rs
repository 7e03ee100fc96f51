//! Server side of the prediction contract.
//!
//! Hosts any [`RiskModel`] behind the same `/predict` endpoint the client
//! talks to, with the request validation and `{"error": ...}` bodies the
//! client expects.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                  │
//! │  - JSON body parsing, field validation       │
//! │  - CORS, tracing, error bodies               │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  RiskModel (supplied by the integrator)      │
//! └──────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::{AppState, Classification, RiskModel};
