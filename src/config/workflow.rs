//! Review workflow configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::application::{RejectionPolicy, WorkflowSettings, DEFAULT_MAX_CONCURRENCY};
use crate::domain::estimation::{EstimationScale, EstimationUnit};
use crate::domain::extraction::{MarkerConfigError, MarkerSet};

/// Workflow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Cap on simultaneous estimator calls
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Unit used when an estimate request does not name one
    #[serde(default)]
    pub default_unit: EstimationUnit,

    /// Outcome of rejecting the technical review without an edit
    #[serde(default)]
    pub rejection_policy: RejectionPolicy,

    /// YAML file overriding the built-in section markers
    pub markers_path: Option<PathBuf>,

    /// Story point scale, ascending
    #[serde(default = "default_point_scale")]
    pub point_scale: Vec<f64>,
}

impl WorkflowConfig {
    pub fn point_scale(&self) -> Result<EstimationScale, ValidationError> {
        EstimationScale::new(self.point_scale.clone())
            .map_err(|e| ValidationError::InvalidPointScale(e.to_string()))
    }

    /// Built-in markers, or the ones from `markers_path` when set.
    pub fn load_markers(&self) -> Result<MarkerSet, MarkerConfigError> {
        match &self.markers_path {
            Some(path) => MarkerSet::from_yaml_file(path),
            None => Ok(MarkerSet::default()),
        }
    }

    pub fn settings(&self, ai: &super::AiConfig) -> WorkflowSettings {
        WorkflowSettings {
            completion: ai.completion_settings(),
            max_concurrency: self.max_concurrency,
            default_unit: self.default_unit,
            rejection_policy: self.rejection_policy,
        }
    }

    /// Validate workflow configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        self.point_scale()?;
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_unit: EstimationUnit::default(),
            rejection_policy: RejectionPolicy::default(),
            markers_path: None,
            point_scale: default_point_scale(),
        }
    }
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_point_scale() -> Vec<f64> {
    EstimationScale::fibonacci().values().to_vec()
}
