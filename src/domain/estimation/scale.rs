//! Estimation units and discrete scales.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const FIBONACCI: [f64; 7] = [1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0];

/// What an estimate is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstimationUnit {
    #[default]
    PersonDays,
    StoryPoints,
}

impl EstimationUnit {
    /// The label personas are asked to answer with, e.g. `Person-days: 3.5`.
    pub fn field_label(&self) -> &'static str {
        match self {
            EstimationUnit::PersonDays => "Person-days",
            EstimationUnit::StoryPoints => "Story Points",
        }
    }
}

impl fmt::Display for EstimationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_label())
    }
}

/// An ascending set of allowed estimate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct EstimationScale(Vec<f64>);

impl EstimationScale {
    /// Builds a scale from strictly ascending, positive, finite values.
    pub fn new(values: Vec<f64>) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::empty_field("point_scale"));
        }
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ValidationError::invalid_format(
                "point_scale",
                "values must be positive and finite",
            ));
        }
        if values.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ValidationError::invalid_format(
                "point_scale",
                "values must be strictly ascending",
            ));
        }
        Ok(Self(values))
    }

    /// The story-point scale `1, 2, 3, 5, 8, 13, 21`.
    pub fn fibonacci() -> Self {
        Self(FIBONACCI.to_vec())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.0.iter().any(|v| (v - value).abs() < f64::EPSILON)
    }

    /// Nearest scale member by absolute distance; ties go to the lower value.
    pub fn snap(&self, value: f64) -> f64 {
        let mut best = self.0[0];
        for candidate in &self.0[1..] {
            if (candidate - value).abs() < (best - value).abs() {
                best = *candidate;
            }
        }
        best
    }

    /// Comma-separated list for prompts, e.g. `1, 2, 3, 5`.
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for EstimationScale {
    fn default() -> Self {
        Self::fibonacci()
    }
}

impl TryFrom<Vec<f64>> for EstimationScale {
    type Error = ValidationError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<EstimationScale> for Vec<f64> {
    fn from(scale: EstimationScale) -> Self {
        scale.0
    }
}
