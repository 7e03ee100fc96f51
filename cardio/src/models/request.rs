//! The prediction payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::{Field, Sex};
use super::{FieldError, RangeViolation, ValidationError};

/// Twelve patient measurements sent to the prediction service.
///
/// Serializes to a flat JSON object keyed by [`Field::wire_name`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: f64,
    pub gender: f64,
    #[serde(rename = "chestpain")]
    pub chest_pain: f64,
    #[serde(rename = "restingBP")]
    pub resting_bp: f64,
    #[serde(rename = "serumcholestrol")]
    pub serum_cholesterol: f64,
    #[serde(rename = "fastingbloodsugar")]
    pub fasting_blood_sugar: f64,
    #[serde(rename = "restingrelectro")]
    pub resting_ecg: f64,
    #[serde(rename = "maxheartrate")]
    pub max_heart_rate: f64,
    #[serde(rename = "exerciseangia")]
    pub exercise_angina: f64,
    pub oldpeak: f64,
    pub slope: f64,
    #[serde(rename = "noofmajorvessels")]
    pub major_vessels: f64,
}

impl Default for PredictionRequest {
    /// Neutral baseline the form starts from.
    fn default() -> Self {
        Self {
            age: 45.0,
            gender: Sex::Male.code(),
            chest_pain: 0.0,
            resting_bp: 120.0,
            serum_cholesterol: 200.0,
            fasting_blood_sugar: 0.0,
            resting_ecg: 0.0,
            max_heart_rate: 150.0,
            exercise_angina: 0.0,
            oldpeak: 0.0,
            slope: 0.0,
            major_vessels: 0.0,
        }
    }
}

impl PredictionRequest {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Age => self.age,
            Field::Gender => self.gender,
            Field::ChestPain => self.chest_pain,
            Field::RestingBp => self.resting_bp,
            Field::SerumCholesterol => self.serum_cholesterol,
            Field::FastingBloodSugar => self.fasting_blood_sugar,
            Field::RestingEcg => self.resting_ecg,
            Field::MaxHeartRate => self.max_heart_rate,
            Field::ExerciseAngina => self.exercise_angina,
            Field::Oldpeak => self.oldpeak,
            Field::Slope => self.slope,
            Field::MajorVessels => self.major_vessels,
        }
    }

    pub fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Age => &mut self.age,
            Field::Gender => &mut self.gender,
            Field::ChestPain => &mut self.chest_pain,
            Field::RestingBp => &mut self.resting_bp,
            Field::SerumCholesterol => &mut self.serum_cholesterol,
            Field::FastingBloodSugar => &mut self.fasting_blood_sugar,
            Field::RestingEcg => &mut self.resting_ecg,
            Field::MaxHeartRate => &mut self.max_heart_rate,
            Field::ExerciseAngina => &mut self.exercise_angina,
            Field::Oldpeak => &mut self.oldpeak,
            Field::Slope => &mut self.slope,
            Field::MajorVessels => &mut self.major_vessels,
        };
        *slot = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, value);
        self
    }

    pub fn sex(&self) -> Sex {
        Sex::from_code(self.gender)
    }

    /// Field/value pairs in form order.
    pub fn entries(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Reject NaN and infinities, which have no JSON encoding.
    pub fn ensure_finite(&self) -> Result<(), FieldError> {
        match self.entries().find(|(_, v)| !v.is_finite()) {
            Some((field, value)) => Err(FieldError::InvalidValue {
                field,
                value: value.to_string(),
                reason: "value must be a finite number".to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Check every field against its advisory range.
    ///
    /// Collects all violations instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations: Vec<RangeViolation> = self
            .entries()
            .filter_map(|(field, value)| {
                let range = field.range()?;
                let in_range = range.contains(value);
                let whole = !field.is_integral() || value.fract() == 0.0;
                if in_range && whole {
                    None
                } else {
                    Some(RangeViolation {
                        field,
                        value,
                        range,
                    })
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Build a request from a loosely typed JSON object.
    ///
    /// Every wire key must be present. Values may be JSON numbers or strings
    /// holding a number, which is what the Python service accepted.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, FieldError> {
        let mut request = PredictionRequest::default();
        for field in Field::ALL {
            let raw = object
                .get(field.wire_name())
                .ok_or(FieldError::MissingField(field))?;
            let value = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            }
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::InvalidValue {
                field,
                value: raw.to_string(),
                reason: "expected a number".to_string(),
            })?;
            request.set(field, value);
        }
        Ok(request)
    }
}
