use serde::{Deserialize, Serialize};
use std::fmt;

/// How sure a persona is about its estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Parses free text such as `High`, `medium - unclear scope` or `[Low]`.
    ///
    /// A list of choices like `[High/Medium/Low]` is an unfilled template,
    /// not an answer, and yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if label.contains('/') || label.contains('|') {
            return None;
        }
        let levels_named = label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .take(3)
            .filter(|word| Self::level_word(word))
            .count();
        if levels_named > 1 {
            return None;
        }

        if label.starts_with("high") {
            Some(Confidence::High)
        } else if label.starts_with("med") {
            Some(Confidence::Medium)
        } else if label.starts_with("low") {
            Some(Confidence::Low)
        } else {
            None
        }
    }

    fn level_word(word: &str) -> bool {
        ["high", "med", "low"].iter().any(|level| word.starts_with(level))
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

/// One persona's answer in an estimation round.
///
/// `raw_estimate` is `None` when the persona's call failed or its answer
/// held no usable number; `justification_text` then carries the raw answer
/// or the failure description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub persona_name: String,
    pub role_title: String,
    pub experience_years: f32,
    pub raw_estimate: Option<f64>,
    pub confidence: Option<Confidence>,
    pub justification_text: String,
}

impl EstimateRecord {
    pub fn has_estimate(&self) -> bool {
        self.raw_estimate.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_parses_variants() {
        assert_eq!(Confidence::from_label("High"), Some(Confidence::High));
        assert_eq!(Confidence::from_label(" medium - scope unclear"), Some(Confidence::Medium));
        assert_eq!(Confidence::from_label("[LOW]"), Some(Confidence::Low));
        assert_eq!(Confidence::from_label("unsure"), None);
        assert_eq!(Confidence::from_label(""), None);
    }

    #[test]
    fn confidence_choice_list_is_not_an_answer() {
        assert_eq!(Confidence::from_label("[High/Medium/Low]"), None);
        assert_eq!(Confidence::from_label("High | Medium | Low"), None);
        assert_eq!(Confidence::from_label("High, Medium or Low"), None);
        assert_eq!(Confidence::from_label("Low - the scope is unclear"), Some(Confidence::Low));
    }

    #[test]
    fn record_without_estimate() {
        let record = EstimateRecord {
            persona_name: "Ryan Foster".to_string(),
            role_title: "Junior Developer".to_string(),
            experience_years: 2.0,
            raw_estimate: None,
            confidence: None,
            justification_text: "timeout".to_string(),
        };
        assert!(!record.has_estimate());
    }
}
