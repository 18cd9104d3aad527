//! Overlap detection between a candidate time range and existing events.

use chrono::NaiveDateTime;
use log::debug;

use crate::store::ExistingEvent;

/// Result of checking a candidate range against existing events.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictResult {
    pub has_conflict: bool,
    /// Conflicting events in the order they appeared in the input list.
    pub conflicting_events: Vec<ExistingEvent>,
    /// Human-readable summary of the conflicting ranges; empty when clear.
    pub suggestion_text: String,
}

/// Check a candidate `[start, end)` range against existing events.
///
/// Intervals are half-open: an event ending exactly when the candidate
/// starts does not conflict.
pub fn detect_conflicts(
    start: NaiveDateTime,
    end: NaiveDateTime,
    events: &[ExistingEvent],
) -> ConflictResult {
    let conflicting_events: Vec<ExistingEvent> = events
        .iter()
        .filter(|event| start < event.end_time && end > event.start_time)
        .cloned()
        .collect();

    let suggestion_text = if conflicting_events.is_empty() {
        String::new()
    } else {
        let ranges: Vec<String> = conflicting_events
            .iter()
            .map(|event| {
                format!(
                    "{} ({} - {})",
                    event.title,
                    event.start_time.format("%H:%M"),
                    event.end_time.format("%H:%M")
                )
            })
            .collect();
        format!("Conflicts with {}", ranges.join(", "))
    };

    debug!(
        "Conflict check [{} - {}]: {} overlap(s)",
        start.format("%Y-%m-%d %H:%M"),
        end.format("%H:%M"),
        conflicting_events.len()
    );

    ConflictResult { has_conflict: !conflicting_events.is_empty(), conflicting_events, suggestion_text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CommitmentType;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn event(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> ExistingEvent {
        ExistingEvent {
            id: title.to_string(),
            title: title.to_string(),
            start_time: start,
            end_time: end,
            location: None,
            commitment_type: Some(CommitmentType::Class),
        }
    }

    #[test]
    fn test_overlap_is_reported() {
        let events = vec![event("Algorithms", at(10, 0), at(11, 0))];
        let result = detect_conflicts(at(10, 30), at(11, 30), &events);
        assert!(result.has_conflict);
        assert_eq!(result.conflicting_events.len(), 1);
        assert!(result.suggestion_text.contains("Algorithms"));
        assert!(result.suggestion_text.contains("10:00 - 11:00"));
    }

    #[test]
    fn test_touching_boundary_does_not_conflict() {
        let events = vec![event("Algorithms", at(10, 0), at(11, 0))];
        let result = detect_conflicts(at(11, 0), at(12, 0), &events);
        assert!(!result.has_conflict);
        assert!(result.conflicting_events.is_empty());
        assert_eq!(result.suggestion_text, "");
    }

    #[test]
    fn test_conflicts_keep_input_order() {
        let events = vec![
            event("Second", at(11, 0), at(12, 0)),
            event("First", at(10, 0), at(11, 0)),
        ];
        let result = detect_conflicts(at(10, 30), at(11, 30), &events);
        assert_eq!(result.conflicting_events[0].title, "Second");
        assert_eq!(result.conflicting_events[1].title, "First");
    }

    #[test]
    fn test_candidate_containing_event_conflicts() {
        let events = vec![event("Standup", at(10, 0), at(10, 15))];
        let result = detect_conflicts(at(9, 0), at(12, 0), &events);
        assert!(result.has_conflict);
    }
}
