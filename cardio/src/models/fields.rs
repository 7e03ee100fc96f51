//! Field catalogue for the cardiovascular input form.
//!
//! Each [`Field`] knows its wire key, the label shown to users, an optional
//! help hint and the advisory range the form suggests. Wire keys keep the
//! spelling the prediction service was trained with (`serumcholestrol`,
//! `restingrelectro`, `exerciseangia`), so they must not be "fixed".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FieldError;

/// Inclusive advisory range for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for FieldRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// The twelve measurements collected by the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Age,
    Gender,
    ChestPain,
    RestingBp,
    SerumCholesterol,
    FastingBloodSugar,
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    Oldpeak,
    Slope,
    MajorVessels,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 12] = [
        Field::Age,
        Field::Gender,
        Field::ChestPain,
        Field::RestingBp,
        Field::SerumCholesterol,
        Field::FastingBloodSugar,
        Field::RestingEcg,
        Field::MaxHeartRate,
        Field::ExerciseAngina,
        Field::Oldpeak,
        Field::Slope,
        Field::MajorVessels,
    ];

    /// JSON key used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Gender => "gender",
            Field::ChestPain => "chestpain",
            Field::RestingBp => "restingBP",
            Field::SerumCholesterol => "serumcholestrol",
            Field::FastingBloodSugar => "fastingbloodsugar",
            Field::RestingEcg => "restingrelectro",
            Field::MaxHeartRate => "maxheartrate",
            Field::ExerciseAngina => "exerciseangia",
            Field::Oldpeak => "oldpeak",
            Field::Slope => "slope",
            Field::MajorVessels => "noofmajorvessels",
        }
    }

    /// Look a field up by its wire key.
    pub fn from_wire_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Gender => "Gender",
            Field::ChestPain => "Chest Pain Type",
            Field::RestingBp => "Resting Blood Pressure",
            Field::SerumCholesterol => "Serum Cholesterol",
            Field::FastingBloodSugar => "Fasting Blood Sugar",
            Field::RestingEcg => "Resting ECG (0-2)",
            Field::MaxHeartRate => "Maximum Heart Rate",
            Field::ExerciseAngina => "Exercise Angina (0-1)",
            Field::Oldpeak => "ST Depression (Old Peak)",
            Field::Slope => "Slope (0-2)",
            Field::MajorVessels => "Number of Major Vessels",
        }
    }

    /// Reference values shown under the input.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Field::Age => None,
            Field::Gender => Some("male | female"),
            Field::ChestPain => Some(
                "0 : Asymptomatic | 1 : Typical angina | 2 : Atypical angina | 3 : Non-anginal pain",
            ),
            Field::RestingBp => Some("Normal: 90-120 mmHg"),
            Field::SerumCholesterol => Some("Normal: < 200 mg/dL | High: >= 240 mg/dL"),
            Field::FastingBloodSugar => Some("0 : < 120 mg/dL | 1 : >= 120 mg/dL"),
            Field::RestingEcg => Some(
                "0 : Normal | 1 : ST-T wave abnormality | 2 : probable or definite left ventricular hypertrophy",
            ),
            Field::MaxHeartRate => Some("Normal: 220 - age"),
            Field::ExerciseAngina => Some("0 : No Angina | 1 : Angina Present"),
            Field::Oldpeak => Some("0 : ~0.0 (no depression)"),
            Field::Slope => Some("0 : Upsloping | 1 : Flat | 2 : Downsloping"),
            Field::MajorVessels => Some("Normal: 0 (no major vessel blockages)"),
        }
    }

    /// Advisory range; `None` for free-form measurements.
    pub fn range(self) -> Option<FieldRange> {
        match self {
            Field::Gender | Field::FastingBloodSugar | Field::ExerciseAngina => {
                Some(FieldRange::new(0.0, 1.0))
            }
            Field::ChestPain => Some(FieldRange::new(0.0, 3.0)),
            Field::RestingEcg | Field::Slope => Some(FieldRange::new(0.0, 2.0)),
            Field::MajorVessels => Some(FieldRange::new(0.0, 4.0)),
            Field::Age
            | Field::RestingBp
            | Field::SerumCholesterol
            | Field::MaxHeartRate
            | Field::Oldpeak => None,
        }
    }

    /// Categorical and flag fields only take whole numbers.
    pub fn is_integral(self) -> bool {
        self.range().is_some()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_wire_name(s).ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

/// Biological sex as captured by the gender select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Numeric encoding expected by the model (male = 1).
    pub fn code(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }

    pub fn from_code(code: f64) -> Sex {
        if code == 1.0 {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

impl FromStr for Sex {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Sex::Male),
            "female" | "f" | "0" => Ok(Sex::Female),
            other => Err(FieldError::InvalidValue {
                field: Field::Gender,
                value: other.to_string(),
                reason: "expected male or female".to_string(),
            }),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}
