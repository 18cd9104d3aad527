//! Title, type and location extraction from free-text phrases.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::CommitmentType;

/// Fields recognized in a phrase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    /// True when the title came from the keyword-split fallback rather than
    /// the primary prefix pattern. Scored lower by the parser.
    pub title_from_fallback: bool,
    pub commitment_type: Option<CommitmentType>,
    pub location: Option<String>,
}

/// Keyword table for commitment types. Categories are tried in declaration
/// order and the first containment match wins; an input may match none.
pub const TYPE_KEYWORDS: &[(CommitmentType, &[&str])] = &[
    (CommitmentType::Class, &["class", "lecture", "course", "lesson", "seminar"]),
    (CommitmentType::Gym, &["gym", "workout", "exercise", "fitness", "training"]),
    (CommitmentType::Social, &["dinner", "lunch", "coffee", "party", "hangout", "social"]),
    (CommitmentType::Exam, &["exam", "test", "quiz", "assessment"]),
    (CommitmentType::Hackathon, &["hackathon", "coding competition", "hack"]),
];

/// Title is whatever precedes the first time/date keyword.
static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s+(?:at|on|from|tomorrow|today|next|this)\b").unwrap()
});

static TITLE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:at|on|from|tomorrow|today|next|this)\b").unwrap());

/// Location patterns in priority order. Each capture stops at the next
/// "from"/"for"/"at <digit>" boundary or the end of the phrase.
static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bat\s+([a-z][a-z0-9\s]*?)(?:\s+(?:from|for)\b|\s+at\s+\d|\s*$)")
            .unwrap(),
        Regex::new(r"(?i)\bin\s+([a-z][a-z0-9\s]*?)(?:\s+(?:from|for)\b|\s+at\s+\d|\s*$)")
            .unwrap(),
        Regex::new(r"(?i)location:\s*([a-z0-9][a-z0-9\s]*?)(?:\s+(?:from|for)\b|\s+at\s+\d|\s*$)")
            .unwrap(),
    ]
});

/// Extract the title, reporting whether the fallback split produced it.
pub fn extract_title(input: &str) -> (Option<String>, bool) {
    if let Some(caps) = TITLE_PREFIX.captures(input) {
        let title = caps[1].trim().to_string();
        if !title.is_empty() {
            debug!("Title from prefix pattern: '{}'", title);
            return (Some(title), false);
        }
    }

    if let Some(boundary) = TITLE_BOUNDARY.find(input) {
        let prefix = input[..boundary.start()].trim();
        if !prefix.is_empty() {
            debug!("Title from keyword split: '{}'", prefix);
            return (Some(prefix.to_string()), true);
        }
        return (None, false);
    }

    (None, false)
}

/// Classify the commitment type by keyword containment.
pub fn extract_type(input: &str) -> Option<CommitmentType> {
    let input_lower = input.to_lowercase();
    for (kind, keywords) in TYPE_KEYWORDS {
        if keywords.iter().any(|kw| input_lower.contains(kw)) {
            debug!("Type keyword match: {:?}", kind);
            return Some(*kind);
        }
    }
    None
}

/// Extract a location phrase. The "at X" form only matches when X does not
/// start with a digit, which keeps clock times out of the location field.
pub fn extract_location(input: &str) -> Option<String> {
    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(input) {
            let location = caps[1].trim().to_string();
            if !location.is_empty() {
                debug!("Location match: '{}'", location);
                return Some(location);
            }
        }
    }
    None
}

/// Extract all fields from a phrase.
pub fn extract_fields(input: &str) -> ExtractedFields {
    let (title, title_from_fallback) = extract_title(input);
    ExtractedFields {
        title,
        title_from_fallback,
        commitment_type: extract_type(input),
        location: extract_location(input),
    }
}
