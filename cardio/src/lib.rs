//! # CardioAnalyzer
//!
//! Client side of a cardiovascular risk prediction service.
//!
//! The crate collects twelve patient measurements, posts them to a remote
//! `/predict` endpoint and turns the reply into a binary risk result that a
//! front end can show.
//!
//! ## Architecture
//!
//! - [`models`]: the payload, the service reply and the derived display result
//! - [`config`]: service and form settings from defaults, TOML and environment
//! - [`client`]: the [`client::Predictor`] seam and its HTTP implementation
//! - [`form`]: the input collector (fields, busy flag, submit/abort) and the
//!   form/result view toggle
//! - [`presentation`]: plain-text rendering of the result card
//! - [`http`]: server side of the same contract around a pluggable model
//!   (feature `http-server`)
//!
//! ## Example
//!
//! ```no_run
//! use cardio_rust::config::AppConfig;
//! use cardio_rust::form::AppView;
//! use cardio_rust::models::Field;
//! use cardio_rust::presentation::ResultCard;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let mut app = AppView::from_config(&config)?;
//! app.collector().set(Field::Age, 58.0);
//! app.submit().await;
//! if let Some(result) = app.result() {
//!     println!("{}", ResultCard::new(result));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod form;
pub mod models;
pub mod presentation;

#[cfg(feature = "http-server")]
pub mod http;
