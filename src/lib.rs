//! Story Review - multi-persona review and estimation of user stories
//!
//! A story moves through an agile review and a technical review, each gated
//! by a user decision, and can be estimated by a team of personas whose
//! answers are combined into a consensus value.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
