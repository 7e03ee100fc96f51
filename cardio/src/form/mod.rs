//! Form state and the two-state view built on top of it.

pub mod collector;
pub mod view;

pub use collector::{InputCollector, RejectReason, SubmitOutcome};
pub use view::{AppView, View};
