use once_cell::sync::Lazy;
use regex::Regex;

use super::extractor::strip_bullet;
use crate::domain::story::Story;

static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?\s*(?:(?:improved|enhanced|revised|user)\s+)*story\s*(?:\*\*)?\s*:\s*(?:\*\*)?")
        .expect("story label pattern is valid")
});

/// Cleans up a story before it is handed to the next reviewer.
///
/// Drops a leading `Story:`-style label and wrapping quotes from the text,
/// strips bullets from each criterion and discards empty ones. The version
/// and context are left alone.
pub fn normalize_story(story: &Story) -> Story {
    let text = story_body(story.text());

    let criteria = story
        .acceptance_criteria()
        .iter()
        .map(|criterion| strip_quotes(strip_bullet(criterion)).trim().to_string())
        .filter(|criterion| !criterion.is_empty())
        .collect();

    story.with_content(text, criteria)
}

/// Story text without its leading label and wrapping quotes.
pub(crate) fn story_body(text: &str) -> String {
    let text = LABEL_PREFIX.replace(text, "");
    strip_quotes(text.trim()).trim().to_string()
}

fn strip_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 3] = [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}')];
    for (open, close) in PAIRS {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(text: &str, criteria: &[&str]) -> Story {
        Story::new(text, criteria.iter().map(|c| c.to_string()).collect(), "ctx")
    }

    #[test]
    fn strips_label_and_quotes() {
        let story = with("Improved Story: \"As a user I log in\"", &["a"]);
        assert_eq!(normalize_story(&story).text(), "As a user I log in");

        let story = with("**User Story:** As an admin I audit", &["a"]);
        assert_eq!(normalize_story(&story).text(), "As an admin I audit");
    }

    #[test]
    fn plain_text_is_untouched() {
        let story = with("As a user, my story matters", &["a"]);
        assert_eq!(normalize_story(&story).text(), "As a user, my story matters");
    }

    #[test]
    fn cleans_criteria() {
        let story = with("text", &["- first", "  ", "2. second", "\"third\""]);
        assert_eq!(
            normalize_story(&story).acceptance_criteria(),
            &["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }

    #[test]
    fn keeps_version_and_context() {
        let story = with("text", &["a"]).revision("Story: revised", vec!["b".to_string()]);
        let normalized = normalize_story(&story);
        assert_eq!(normalized.version(), story.version());
        assert_eq!(normalized.context(), "ctx");
        assert_eq!(normalized.text(), "revised");
    }
}
