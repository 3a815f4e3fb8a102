//! Estimation module - team effort estimates and their consensus.
//!
//! Individual persona answers become [`EstimateRecord`]s; the records are
//! folded into a [`ConsensusEstimate`] once every persona has answered.

mod consensus;
mod record;
mod scale;

pub use consensus::{ConsensusEstimate, TeamEstimation};
pub use record::{Confidence, EstimateRecord};
pub use scale::{EstimationScale, EstimationUnit};
