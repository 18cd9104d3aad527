//! Natural language commitment parsing.
//!
//! Free text goes in, a [`ParsedCommitment`] with a heuristic confidence
//! score comes out. Unrecognized fields are simply absent; nothing in here
//! raises on unparseable input. The reference instant is always an explicit
//! parameter so two calls with identical `(text, now)` produce identical
//! results.

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

pub mod field_extractor;
pub mod time_extractor;

pub use field_extractor::{extract_fields, ExtractedFields};
pub use time_extractor::{extract_time, ExtractedTime};

/// Commitment categories recognized by the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentType {
    Class,
    Hackathon,
    Gym,
    Social,
    Exam,
}

impl CommitmentType {
    pub fn label(&self) -> &'static str {
        match self {
            CommitmentType::Class => "class",
            CommitmentType::Hackathon => "hackathon",
            CommitmentType::Gym => "gym",
            CommitmentType::Social => "social",
            CommitmentType::Exam => "exam",
        }
    }
}

/// A parsed commitment. Immutable once produced; the confidence is a
/// heuristic score, not a probability — thresholds on it are product policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommitment {
    pub title: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub commitment_type: Option<CommitmentType>,
    pub confidence: f64,
}

const BASE_CONFIDENCE: f64 = 0.30;
const TITLE_PRIMARY_BONUS: f64 = 0.20;
const TITLE_FALLBACK_BONUS: f64 = 0.10;
const TYPE_BONUS: f64 = 0.10;
const LOCATION_BONUS: f64 = 0.10;
const START_TIME_BONUS: f64 = 0.20;
const END_TIME_BONUS: f64 = 0.10;

/// Parse a phrase into a structured commitment, scoring confidence by the
/// fields that were recognized.
pub fn parse_commitment(input: &str, now: NaiveDateTime) -> ParsedCommitment {
    let fields = extract_fields(input);
    let times = extract_time(input, now);

    let mut confidence = BASE_CONFIDENCE;
    if fields.title.is_some() {
        confidence +=
            if fields.title_from_fallback { TITLE_FALLBACK_BONUS } else { TITLE_PRIMARY_BONUS };
    }
    if fields.commitment_type.is_some() {
        confidence += TYPE_BONUS;
    }
    if fields.location.is_some() {
        confidence += LOCATION_BONUS;
    }
    if times.start_time.is_some() {
        confidence += START_TIME_BONUS;
    }
    if times.end_time.is_some() || times.duration_minutes.is_some() {
        confidence += END_TIME_BONUS;
    }
    let confidence = confidence.min(1.0);

    debug!("Parsed '{}' with confidence {:.2}", input, confidence);

    ParsedCommitment {
        title: fields.title,
        start_time: times.start_time,
        end_time: times.end_time,
        duration_minutes: times.duration_minutes,
        location: fields.location,
        commitment_type: fields.commitment_type,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_phrase_scores_high() {
        let parsed = parse_commitment("team dinner at 7pm tomorrow for 2 hours", reference());
        assert_eq!(parsed.title.as_deref(), Some("team dinner"));
        assert_eq!(parsed.commitment_type, Some(CommitmentType::Social));
        assert!(parsed.start_time.is_some());
        assert!(parsed.end_time.is_some());
        // base 0.3 + title 0.2 + type 0.1 + start 0.2 + duration 0.1
        assert!((parsed.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_no_time_phrase_caps_confidence() {
        let parsed = parse_commitment("gym session", reference());
        assert_eq!(parsed.start_time, None);
        assert!(parsed.confidence <= 0.5);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = parse_commitment("physics exam on friday at 9am", reference());
        let b = parse_commitment("physics exam on friday at 9am", reference());
        assert_eq!(a, b);
    }

    #[test]
    fn test_end_time_round_trip() {
        let parsed = parse_commitment("standup at 10am for 30 minutes", reference());
        let start = parsed.start_time.unwrap();
        let end = parsed.end_time.unwrap();
        assert_eq!(end - start, chrono::Duration::minutes(parsed.duration_minutes.unwrap()));
    }

    #[test]
    fn test_confidence_never_exceeds_one() {
        let parsed = parse_commitment(
            "physics exam at main hall on friday at 9:00am for 2 hours",
            reference(),
        );
        assert!(parsed.confidence <= 1.0);
    }
}
