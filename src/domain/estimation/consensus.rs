use serde::{Deserialize, Serialize};

use super::record::EstimateRecord;
use super::scale::{EstimationScale, EstimationUnit};

/// Aggregate of every usable estimate from one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusEstimate {
    pub unit: EstimationUnit,
    pub individual_estimates: Vec<f64>,
    pub mean: f64,
    pub snapped_value: Option<f64>,
    pub contributor_count: usize,
}

impl ConsensusEstimate {
    /// Folds records into a consensus.
    ///
    /// Records without an estimate are skipped. With no usable estimates the
    /// mean is `0` and nothing is snapped.
    pub fn from_records(
        unit: EstimationUnit,
        records: &[EstimateRecord],
        scale: Option<&EstimationScale>,
    ) -> Self {
        let individual_estimates: Vec<f64> =
            records.iter().filter_map(|r| r.raw_estimate).collect();
        let contributor_count = individual_estimates.len();

        if contributor_count == 0 {
            return Self {
                unit,
                individual_estimates,
                mean: 0.0,
                snapped_value: None,
                contributor_count,
            };
        }

        let mean = individual_estimates.iter().sum::<f64>() / contributor_count as f64;
        Self {
            unit,
            snapped_value: scale.map(|s| s.snap(mean)),
            individual_estimates,
            mean,
            contributor_count,
        }
    }

    /// Mean rounded to one decimal place, for display.
    pub fn rounded_mean(&self) -> f64 {
        (self.mean * 10.0).round() / 10.0
    }

    /// The value to report: the snapped value if any, else the rounded mean.
    pub fn headline_value(&self) -> f64 {
        self.snapped_value.unwrap_or_else(|| self.rounded_mean())
    }

    pub fn is_degraded(&self) -> bool {
        self.contributor_count == 0
    }
}

/// A consensus together with the records it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEstimation {
    pub consensus: ConsensusEstimate,
    pub records: Vec<EstimateRecord>,
}

impl TeamEstimation {
    pub fn new(
        unit: EstimationUnit,
        records: Vec<EstimateRecord>,
        scale: Option<&EstimationScale>,
    ) -> Self {
        Self {
            consensus: ConsensusEstimate::from_records(unit, &records, scale),
            records,
        }
    }
}
