//! Recurring-pattern detection, priority classification and travel-time
//! estimation.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};

use crate::parser::CommitmentType;
use crate::store::ExistingEvent;

/// Callers only surface patterns above this confidence.
pub const PATTERN_SUGGESTION_THRESHOLD: f64 = 0.6;

pub const DEFAULT_TRAVEL_MINUTES: i64 = 20;

/// Travel-time keyword table; first matching row wins.
pub const TRAVEL_KEYWORDS: &[(&[&str], i64)] = &[
    (&["online", "virtual", "zoom", "teams"], 0),
    (&["home", "house"], 0),
    (&["campus", "library", "hall", "building"], 10),
    (&["gym", "fitness"], 15),
];

/// A detected weekly pattern: the same title recurring on the same weekday
/// at the same hour.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringPattern {
    pub title: String,
    pub weekday: Weekday,
    pub hour: u32,
    pub count: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Detect recurring weekly patterns by grouping on (normalized title,
/// weekday, start hour). Confidence grows with repetition count and caps at
/// four occurrences.
pub fn detect_recurring(events: &[ExistingEvent]) -> Vec<RecurringPattern> {
    let mut groups: HashMap<(String, Weekday, u32), usize> = HashMap::new();
    for event in events {
        let key = (
            event.title.trim().to_lowercase(),
            event.start_time.weekday(),
            event.start_time.hour(),
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    let mut patterns: Vec<RecurringPattern> = groups
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|((title, weekday, hour), count)| RecurringPattern {
            title,
            weekday,
            hour,
            count,
            confidence: (count as f64 / 4.0).min(1.0),
        })
        .collect();

    // HashMap iteration order is arbitrary; sort for stable output.
    patterns.sort_by(|a, b| {
        b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal).then_with(
            || a.title.cmp(&b.title),
        )
    });
    patterns
}

/// Classify how soon a commitment needs attention. Anything within two
/// hours is urgent regardless of type; beyond that the type decides.
pub fn classify_priority(
    kind: Option<CommitmentType>,
    start_time: NaiveDateTime,
    now: NaiveDateTime,
) -> Priority {
    let until = start_time - now;
    if until <= Duration::hours(2) {
        return Priority::Urgent;
    }
    match kind {
        Some(CommitmentType::Exam) | Some(CommitmentType::Class) => {
            if until <= Duration::hours(24) {
                Priority::Urgent
            } else {
                Priority::High
            }
        }
        Some(CommitmentType::Hackathon) | Some(CommitmentType::Social) => {
            if until <= Duration::hours(6) {
                Priority::High
            } else {
                Priority::Medium
            }
        }
        _ => {
            if until <= Duration::hours(6) {
                Priority::Medium
            } else {
                Priority::Low
            }
        }
    }
}

/// Estimate travel time in minutes from location keywords.
pub fn estimate_travel_minutes(location: &str) -> i64 {
    let location_lower = location.to_lowercase();
    for (keywords, minutes) in TRAVEL_KEYWORDS {
        if keywords.iter().any(|kw| location_lower.contains(kw)) {
            return *minutes;
        }
    }
    DEFAULT_TRAVEL_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn on(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn event(title: &str, start: NaiveDateTime) -> ExistingEvent {
        ExistingEvent {
            id: format!("{}-{}", title, start),
            title: title.to_string(),
            start_time: start,
            end_time: start + Duration::hours(1),
            location: None,
            commitment_type: Some(CommitmentType::Gym),
        }
    }

    #[test]
    fn test_recurring_needs_two_occurrences() {
        // Jan 10 and Jan 17, 2024 are both Wednesdays
        let events = vec![
            event("Gym", on(10, 18)),
            event("gym ", on(17, 18)),
            event("One-off", on(10, 9)),
        ];
        let patterns = detect_recurring(&events);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].title, "gym");
        assert_eq!(patterns[0].weekday, Weekday::Wed);
        assert_eq!(patterns[0].hour, 18);
        assert_eq!(patterns[0].count, 2);
        assert!((patterns[0].confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recurring_confidence_caps_at_one() {
        // Five consecutive Wednesdays
        let events: Vec<ExistingEvent> =
            [3, 10, 17, 24, 31].iter().map(|d| event("Gym", on(*d, 18))).collect();
        let patterns = detect_recurring(&events);
        assert_eq!(patterns[0].count, 5);
        assert!((patterns[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_surfaced_patterns_cross_threshold_at_three() {
        let two = detect_recurring(&[event("Gym", on(10, 18)), event("Gym", on(17, 18))]);
        assert!(two[0].confidence <= PATTERN_SUGGESTION_THRESHOLD);

        let three = detect_recurring(&[
            event("Gym", on(10, 18)),
            event("Gym", on(17, 18)),
            event("Gym", on(24, 18)),
        ]);
        assert!(three[0].confidence > PATTERN_SUGGESTION_THRESHOLD);
    }

    #[test]
    fn test_priority_urgent_within_two_hours() {
        let now = on(10, 12);
        assert_eq!(
            classify_priority(Some(CommitmentType::Gym), now + Duration::hours(1), now),
            Priority::Urgent
        );
    }

    #[test]
    fn test_exam_priority_brackets() {
        let now = on(10, 12);
        assert_eq!(
            classify_priority(Some(CommitmentType::Exam), now + Duration::hours(20), now),
            Priority::Urgent
        );
        assert_eq!(
            classify_priority(Some(CommitmentType::Exam), now + Duration::hours(30), now),
            Priority::High
        );
    }

    #[test]
    fn test_social_and_untyped_brackets() {
        let now = on(10, 12);
        assert_eq!(
            classify_priority(Some(CommitmentType::Social), now + Duration::hours(5), now),
            Priority::High
        );
        assert_eq!(
            classify_priority(Some(CommitmentType::Social), now + Duration::hours(10), now),
            Priority::Medium
        );
        assert_eq!(classify_priority(None, now + Duration::hours(5), now), Priority::Medium);
        assert_eq!(classify_priority(None, now + Duration::hours(10), now), Priority::Low);
    }

    #[test]
    fn test_travel_table_first_match_wins() {
        // "zoom" is checked before "building"
        assert_eq!(estimate_travel_minutes("zoom link in science building"), 0);
        assert_eq!(estimate_travel_minutes("science building"), 10);
        assert_eq!(estimate_travel_minutes("campus gym"), 10);
        assert_eq!(estimate_travel_minutes("gym"), 15);
        assert_eq!(estimate_travel_minutes("downtown cafe"), 20);
    }
}
