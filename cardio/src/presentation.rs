//! Text rendering of the result card and form labels.

use std::fmt;

use crate::models::{DisplayResult, RiskCategory};

pub const SUBMIT_LABEL: &str = "Analyze Risk";
pub const BUSY_LABEL: &str = "Analyzing...";
pub const RESET_LABEL: &str = "Start New Analysis";
pub const DISCLAIMER: &str = "Disclaimer: This is a demonstration tool and should not be used as a \
substitute for professional medical advice. Always consult with a qualified healthcare provider \
for medical diagnosis and treatment.";

pub fn risk_heading(risk: RiskCategory) -> &'static str {
    match risk {
        RiskCategory::High => "High Risk Detected",
        RiskCategory::Low => "Low Risk Detected",
    }
}

pub fn advisory(risk: RiskCategory) -> &'static str {
    match risk {
        RiskCategory::High => {
            "Based on the provided parameters, our analysis indicates a higher risk of \
             cardiovascular disease. We recommend consulting with a healthcare professional."
        }
        RiskCategory::Low => {
            "Based on the provided parameters, our analysis indicates a lower risk of \
             cardiovascular disease. However, maintaining a healthy lifestyle is always recommended."
        }
    }
}

/// Probability as a percentage with one decimal, e.g. `83.0%`.
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Label of the submit control for the given busy state.
pub fn submit_label(busy: bool) -> &'static str {
    if busy {
        BUSY_LABEL
    } else {
        SUBMIT_LABEL
    }
}

/// Renders a [`DisplayResult`] as a plain-text card.
pub struct ResultCard<'a> {
    result: &'a DisplayResult,
}

impl<'a> ResultCard<'a> {
    pub fn new(result: &'a DisplayResult) -> Self {
        Self { result }
    }
}

impl fmt::Display for ResultCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let risk = self.result.risk;
        writeln!(f, "{}", risk_heading(risk))?;
        writeln!(f)?;
        writeln!(f, "Risk Probability: {}", format_probability(self.result.probability))?;
        if self.result.probability_defaulted {
            writeln!(f, "(the service did not report a probability; default shown)")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", advisory(risk))?;
        writeln!(f)?;
        write!(f, "[{}]", RESET_LABEL)
    }
}
