//! Persona module - the simulated reviewers and estimators.

mod profile;
mod prompts;
mod registry;

pub use profile::{PersonaProfile, PromptTemplate};
pub use registry::PersonaRegistry;
