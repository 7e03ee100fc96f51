//! Domain types shared by the form, the client and the endpoint contract.
//!
//! - [`PredictionRequest`]: the twelve-field payload
//! - [`PredictionResponse`]: the service reply, with a typed [`PredictionLabel`]
//! - [`DisplayResult`]: what the result card shows

pub mod fields;
pub mod request;
pub mod response;

use std::fmt;

pub use fields::{Field, FieldRange, Sex};
pub use request::PredictionRequest;
pub use response::{
    DisplayResult, PredictionLabel, PredictionResponse, RiskCategory, DEFAULT_PROBABILITY,
};

/// Errors raised while reading or writing a single field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("Invalid value for field {field}: {value} ({reason})")]
    InvalidValue {
        field: Field,
        value: String,
        reason: String,
    },
}

/// A field outside its advisory range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub field: Field,
    pub value: f64,
    pub range: FieldRange,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} (expected a whole number in {})",
            self.field, self.value, self.range
        )
    }
}

/// Advisory range check failure, listing every offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Out of range: {}", format_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<RangeViolation>,
}

fn format_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
