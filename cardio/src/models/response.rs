//! Prediction service replies and the view-level result derived from them.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Probability reported when the service omits one.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Classification tag returned by the service.
///
/// The wire carries a string; only the exact string `"1"` means high risk.
/// Every other value, including the number `1`, `"2"`, `null` or a missing
/// key, decodes to [`PredictionLabel::LowRisk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionLabel {
    HighRisk,
    #[default]
    LowRisk,
}

impl PredictionLabel {
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "1" => PredictionLabel::HighRisk,
            _ => PredictionLabel::LowRisk,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            PredictionLabel::HighRisk => "1",
            PredictionLabel::LowRisk => "0",
        }
    }
}

impl Serialize for PredictionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for PredictionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(PredictionLabel::from_wire(&value))
    }
}

/// Body of a successful `/predict` reply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub prediction: PredictionLabel,
    #[serde(
        default,
        deserialize_with = "deserialize_probability",
        skip_serializing_if = "Option::is_none"
    )]
    pub probability: Option<f64>,
}

/// Accepts a number, a numeric string, or `null`.
fn deserialize_probability<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("probability is not numeric: {:?}", s))),
        other => Err(de::Error::custom(format!("probability is not numeric: {}", other))),
    }
}

impl PredictionResponse {
    pub fn new(prediction: PredictionLabel, probability: f64) -> Self {
        Self {
            prediction,
            probability: Some(probability),
        }
    }

    /// Reported probability, or [`DEFAULT_PROBABILITY`] when absent.
    pub fn probability_or_default(&self) -> f64 {
        self.probability.unwrap_or(DEFAULT_PROBABILITY)
    }
}

/// Binary risk category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    High,
    Low,
}

impl From<PredictionLabel> for RiskCategory {
    fn from(label: PredictionLabel) -> Self {
        match label {
            PredictionLabel::HighRisk => RiskCategory::High,
            PredictionLabel::LowRisk => RiskCategory::Low,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskCategory::High => f.write_str("high"),
            RiskCategory::Low => f.write_str("low"),
        }
    }
}

/// Result held by the view between a successful submit and a reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayResult {
    pub risk: RiskCategory,
    pub probability: f64,
    /// Set when the service omitted the probability and the default was used.
    #[serde(default)]
    pub probability_defaulted: bool,
}

impl From<PredictionResponse> for DisplayResult {
    fn from(response: PredictionResponse) -> Self {
        Self {
            risk: response.prediction.into(),
            probability: response.probability_or_default(),
            probability_defaulted: response.probability.is_none(),
        }
    }
}
