//! Domain layer containing review types and pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machine)
//! - `story` - Stories, review stage status and per-stage results
//! - `extraction` - Marker-based parsing of free-text completions
//! - `estimation` - Estimate records, scales and consensus
//! - `persona` - Reviewer and estimator roster with prompt rendering

pub mod estimation;
pub mod extraction;
pub mod foundation;
pub mod persona;
pub mod story;
