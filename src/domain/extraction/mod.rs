//! Extraction of structured fields from free-text model output.
//!
//! Model answers follow a requested layout only loosely, so every routine
//! here degrades to an absent value instead of failing.

mod extractor;
mod markers;
mod normalize;

pub use extractor::{strip_bullet, ResponseExtractor};
pub use markers::{MarkerConfigError, MarkerSet, SectionKind};
pub use normalize::normalize_story;
