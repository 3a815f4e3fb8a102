//! Marker-driven extraction of stories, criteria and labeled values.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

use super::markers::{compile_marker, MarkerConfigError, MarkerSet, SectionKind};
use super::normalize::story_body;
use crate::domain::estimation::Confidence;
use crate::domain::story::{Story, StructuredFields};

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•+]|\d{1,3}[.)])\s+").expect("bullet prefix pattern is valid")
});

/// Lines left behind by list numbering or markdown once a header is cut out.
static NOISE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s#*_=-]*(?:\d{1,3}[.)])?[\s#*_=-]*$").expect("noise line pattern is valid")
});

/// Labels scanned for in technical reviews, keyed by their field name.
const TECHNICAL_LABELS: [(&str, &str); 4] = [
    ("feasibility", "Feasibility"),
    ("complexity", "Complexity"),
    ("dependencies", "Dependencies"),
    ("technical_risks", "Technical Risks"),
];

/// Parses raw completion text into structured review data.
///
/// Built once from a [`MarkerSet`] and shared read-only; every lookup
/// returns `None` (or an empty value) when the text does not contain what
/// was asked for.
#[derive(Debug, Clone)]
pub struct ResponseExtractor {
    starts: HashMap<SectionKind, Vec<Regex>>,
    terminators: Vec<Regex>,
}

impl ResponseExtractor {
    /// Compiles every candidate in the marker set.
    pub fn new(markers: &MarkerSet) -> Result<Self, MarkerConfigError> {
        markers.validate()?;

        let mut starts = HashMap::new();
        for kind in SectionKind::ALL {
            starts.insert(kind, compile_all(markers.candidates(kind))?);
        }

        Ok(Self {
            starts,
            terminators: compile_all(&markers.terminators)?,
        })
    }

    /// Extracts the improved story and its criteria.
    ///
    /// The result is a revision of `original` (version + 1). When no
    /// criteria section follows the story, the original criteria carry over.
    pub fn extract_improved_story(&self, raw_text: &str, original: &Story) -> Option<Story> {
        let Some(range) = self.locate(raw_text, SectionKind::ImprovedStory, 0) else {
            debug!("No improved story marker found in completion");
            return None;
        };

        let text = clean_paragraph(&raw_text[range.clone()]);
        if story_body(&text).is_empty() {
            debug!("Improved story section held no story text");
            return None;
        }

        let criteria = self
            .locate(raw_text, SectionKind::AcceptanceCriteria, range.start)
            .map(|criteria_range| clean_list(&raw_text[criteria_range]))
            .filter(|criteria| !criteria.is_empty())
            .unwrap_or_else(|| {
                debug!("No enhanced acceptance criteria found; keeping the originals");
                original.acceptance_criteria().to_vec()
            });

        Some(original.revision(text, criteria))
    }

    /// Extracts the acceptance criteria list, one entry per non-empty line.
    ///
    /// Searching starts after the improved story header when there is one,
    /// so criteria echoed back from the prompt are skipped.
    pub fn extract_acceptance_criteria(&self, raw_text: &str) -> Vec<String> {
        let from = self
            .locate(raw_text, SectionKind::ImprovedStory, 0)
            .map(|range| range.start)
            .unwrap_or(0);

        self.locate(raw_text, SectionKind::AcceptanceCriteria, from)
            .map(|range| clean_list(&raw_text[range]))
            .unwrap_or_default()
    }

    /// Returns the trimmed body of a section, one cleaned line per row.
    pub fn extract_section(&self, raw_text: &str, kind: SectionKind) -> Option<String> {
        let range = self.locate(raw_text, kind, 0)?;
        let body = clean_list(&raw_text[range]).join("\n");
        if body.is_empty() {
            None
        } else {
            Some(body)
        }
    }

    /// Parses a numeric value from the first usable `<label>: <number>` line.
    ///
    /// Lines whose remainder is not a finite, non-negative number, or is not
    /// in `valid_values` when that is given, are skipped.
    pub fn extract_numeric_field(
        &self,
        raw_text: &str,
        field_label: &str,
        valid_values: Option<&[f64]>,
    ) -> Option<f64> {
        let value = labeled_lines(raw_text, field_label).find_map(|remainder| {
            let value = remainder.parse::<f64>().ok()?;
            if !value.is_finite() || value < 0.0 {
                return None;
            }
            match valid_values {
                Some(allowed) if !allowed.iter().any(|v| (v - value).abs() < f64::EPSILON) => {
                    debug!(field_label, value, "Parsed value outside the allowed set");
                    None
                }
                _ => Some(value),
            }
        });

        if value.is_none() {
            debug!(field_label, "No numeric value found");
        }
        value
    }

    /// Returns the first non-empty `<label>: <value>` remainder.
    pub fn extract_labeled_value(&self, raw_text: &str, field_label: &str) -> Option<String> {
        labeled_lines(raw_text, field_label)
            .next()
            .map(str::to_string)
    }

    /// Parses the estimator's confidence level.
    pub fn extract_confidence(&self, raw_text: &str) -> Option<Confidence> {
        labeled_lines(raw_text, "Confidence Level")
            .chain(labeled_lines(raw_text, "Confidence"))
            .find_map(Confidence::from_label)
    }

    /// Fields produced by an agile review.
    pub fn agile_fields(&self, raw_text: &str) -> StructuredFields {
        let mut fields = StructuredFields::new();
        if let Some(invest) = self.extract_section(raw_text, SectionKind::InvestAnalysis) {
            fields.insert("invest_analysis".to_string(), invest.into());
        }
        if let Some(questions) = self.extract_section(raw_text, SectionKind::Clarifications) {
            fields.insert("areas_for_clarification".to_string(), questions.into());
        }
        let criteria = self.extract_acceptance_criteria(raw_text);
        if !criteria.is_empty() {
            fields.insert("acceptance_criteria".to_string(), criteria.into());
        }
        fields
    }

    /// Fields produced by a technical review.
    pub fn technical_fields(&self, raw_text: &str) -> StructuredFields {
        let mut fields = StructuredFields::new();
        for (key, label) in TECHNICAL_LABELS {
            if let Some(value) = self.extract_labeled_value(raw_text, label) {
                fields.insert(key.to_string(), value.into());
            }
        }
        if let Some(details) = self.extract_section(raw_text, SectionKind::ImplementationDetails) {
            fields.insert("implementation_details".to_string(), details.into());
        }
        fields
    }

    /// Finds the body range of a section starting at or after `from`.
    ///
    /// The start is the first candidate, in priority order, that occurs.
    /// The end is the nearest later header of any section, a repeat of
    /// this one included, or end of text. A repeat with nothing but
    /// whitespace before it restates the header and is skipped.
    fn locate(&self, text: &str, kind: SectionKind, from: usize) -> Option<Range<usize>> {
        let haystack = text.get(from..)?;
        let mut start = self
            .starts
            .get(&kind)?
            .iter()
            .find_map(|re| re.find(haystack))
            .map(|m| from + m.end())?;

        loop {
            let tail = &text[start..];
            match self.next_header(tail, kind) {
                Some(header) if header.same_kind && is_blank(&tail[..header.start]) && header.end > 0 => {
                    start += header.end;
                }
                Some(header) => return Some(start..start + header.start),
                None => return Some(start..text.len()),
            }
        }
    }

    fn next_header(&self, tail: &str, kind: SectionKind) -> Option<HeaderHit> {
        let section_headers = self.starts.iter().flat_map(|(section, patterns)| {
            patterns.iter().map(move |re| (*section == kind, re))
        });
        section_headers
            .chain(self.terminators.iter().map(|re| (false, re)))
            .filter_map(|(same_kind, re)| {
                re.find(tail).map(|m| HeaderHit {
                    start: m.start(),
                    end: m.end(),
                    same_kind,
                })
            })
            .min_by_key(|hit| (hit.start, !hit.same_kind))
    }
}

struct HeaderHit {
    start: usize,
    end: usize,
    same_kind: bool,
}

fn is_blank(text: &str) -> bool {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*').is_empty()
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new(&MarkerSet::default()).expect("built-in marker set compiles")
    }
}

/// Removes a leading list bullet or number and surrounding whitespace.
pub fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    match BULLET_PREFIX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line,
    }
}

fn compile_all(candidates: &[String]) -> Result<Vec<Regex>, MarkerConfigError> {
    candidates
        .iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| compile_marker(c))
        .collect()
}

/// Yields cleaned remainders of lines that mention `label` before a colon.
fn labeled_lines<'a>(raw_text: &'a str, label: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let needle = label.to_lowercase();
    raw_text.lines().filter_map(move |line| {
        let (head, remainder) = line.split_once(':')?;
        if !head.to_lowercase().contains(&needle) {
            return None;
        }
        let value = clean_value(remainder);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn clean_value(value: &str) -> &str {
    value
        .trim()
        .trim_matches('*')
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
}

/// Drops closing emphasis left over from a `**Header:**` line.
fn strip_emphasis_residue(line: &str) -> &str {
    let trimmed = line.trim_start();
    let rest = trimmed.trim_start_matches('*');
    if rest.len() != trimmed.len() && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        rest.trim_start()
    } else {
        trimmed
    }
}

fn clean_lines(section: &str) -> impl Iterator<Item = &str> {
    section
        .lines()
        .map(strip_emphasis_residue)
        .filter(|line| !NOISE_LINE.is_match(line))
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
}

fn clean_list(section: &str) -> Vec<String> {
    clean_lines(section).map(str::to_string).collect()
}

fn clean_paragraph(section: &str) -> String {
    clean_lines(section).collect::<Vec<_>>().join(" ")
}
