//! Marker candidate lists used to delimit sections in model output.
//!
//! Candidates are plain data so new output formats can be supported by
//! editing a YAML file rather than code. Within a list, order is priority:
//! the first candidate that occurs in the text wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or compiling a marker set.
#[derive(Debug, Error)]
pub enum MarkerConfigError {
    #[error("failed to read marker file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse marker file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("marker list '{0}' has no candidates")]
    EmptyCandidates(&'static str),

    #[error("marker '{marker}' could not be compiled: {source}")]
    InvalidPattern {
        marker: String,
        #[source]
        source: regex::Error,
    },
}

/// Named sections that can be cut out of a model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    ImprovedStory,
    AcceptanceCriteria,
    InvestAnalysis,
    Clarifications,
    ImplementationDetails,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::ImprovedStory,
        SectionKind::AcceptanceCriteria,
        SectionKind::InvestAnalysis,
        SectionKind::Clarifications,
        SectionKind::ImplementationDetails,
    ];

    fn config_key(&self) -> &'static str {
        match self {
            SectionKind::ImprovedStory => "improved_story",
            SectionKind::AcceptanceCriteria => "acceptance_criteria",
            SectionKind::InvestAnalysis => "invest_analysis",
            SectionKind::Clarifications => "clarifications",
            SectionKind::ImplementationDetails => "implementation_details",
        }
    }
}

/// Ordered candidate header strings for every section.
///
/// Missing keys in a YAML override fall back to the built-in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    #[serde(default = "default_improved_story")]
    pub improved_story: Vec<String>,

    #[serde(default = "default_acceptance_criteria")]
    pub acceptance_criteria: Vec<String>,

    #[serde(default = "default_invest_analysis")]
    pub invest_analysis: Vec<String>,

    #[serde(default = "default_clarifications")]
    pub clarifications: Vec<String>,

    #[serde(default = "default_implementation_details")]
    pub implementation_details: Vec<String>,

    /// Headers that only ever end a section.
    #[serde(default = "default_terminators")]
    pub terminators: Vec<String>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            improved_story: default_improved_story(),
            acceptance_criteria: default_acceptance_criteria(),
            invest_analysis: default_invest_analysis(),
            clarifications: default_clarifications(),
            implementation_details: default_implementation_details(),
            terminators: default_terminators(),
        }
    }
}

impl MarkerSet {
    /// Parses a marker set from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, MarkerConfigError> {
        let set: MarkerSet = serde_yaml::from_str(yaml)?;
        set.validate()?;
        Ok(set)
    }

    /// Reads and parses a marker set from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MarkerConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Candidates for one section, in priority order.
    pub fn candidates(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::ImprovedStory => &self.improved_story,
            SectionKind::AcceptanceCriteria => &self.acceptance_criteria,
            SectionKind::InvestAnalysis => &self.invest_analysis,
            SectionKind::Clarifications => &self.clarifications,
            SectionKind::ImplementationDetails => &self.implementation_details,
        }
    }

    /// Every section list must have at least one usable candidate.
    pub fn validate(&self) -> Result<(), MarkerConfigError> {
        for kind in SectionKind::ALL {
            if self.candidates(kind).iter().all(|c| c.trim().is_empty()) {
                return Err(MarkerConfigError::EmptyCandidates(kind.config_key()));
            }
        }
        Ok(())
    }
}

/// Compiles a header such as `"Improved Story:"` into a tolerant pattern.
///
/// Matching ignores case, accepts any whitespace run between words and
/// allows whitespace or markdown emphasis before the trailing colon.
pub(crate) fn compile_marker(marker: &str) -> Result<Regex, MarkerConfigError> {
    let trimmed = marker.trim();
    let (body, has_colon) = match trimmed.strip_suffix(':') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    let words: Vec<String> = body.split_whitespace().map(regex::escape).collect();
    let mut pattern = String::from("(?i)");
    if body.starts_with(|c: char| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&words.join(r"\s+"));
    if has_colon {
        pattern.push_str(r"[ \t]*(?:\*\*|__)?[ \t]*:");
    }

    Regex::new(&pattern).map_err(|source| MarkerConfigError::InvalidPattern {
        marker: marker.to_string(),
        source,
    })
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_improved_story() -> Vec<String> {
    owned(&[
        "Improved Story:",
        "Improved User Story:",
        "Enhanced Story:",
        "Enhanced User Story:",
        "Improved version of the story:",
        "Improved Version:",
        "Revised Story:",
        "Refined Story:",
    ])
}

fn default_acceptance_criteria() -> Vec<String> {
    owned(&[
        "Enhanced Acceptance Criteria:",
        "Improved Acceptance Criteria:",
        "Revised Acceptance Criteria:",
        "Updated Acceptance Criteria:",
        "Acceptance Criteria:",
    ])
}

fn default_invest_analysis() -> Vec<String> {
    owned(&["INVEST Analysis:", "INVEST Criteria:", "INVEST:"])
}

fn default_clarifications() -> Vec<String> {
    owned(&[
        "Areas for Clarification:",
        "Areas Needing Clarification:",
        "Clarification Needed:",
        "Questions:",
    ])
}

fn default_implementation_details() -> Vec<String> {
    owned(&["Implementation Details:", "Implementation Approach:"])
}

fn default_terminators() -> Vec<String> {
    owned(&[
        "Technical Analysis:",
        "Technical Considerations:",
        "Testing Considerations:",
        "Potential Challenges:",
        "Required Dependencies:",
        "Complexity Estimate:",
        "Risk Factors:",
        "Explanation:",
        "Additional Considerations:",
        "Notes:",
    ])
}
