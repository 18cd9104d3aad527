//! Free-slot search for rescheduling around existing commitments.

use chrono::{Duration, NaiveDateTime, Timelike};
use log::debug;

use super::ScheduleError;
use crate::store::ExistingEvent;

/// Scheduling day starts at 08:00; the after-commitments tier refuses to
/// suggest anything ending past 22:00.
pub const DAY_START_HOUR: u32 = 8;
pub const DAY_END_HOUR: u32 = 22;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

const GAP_CONFIDENCE: f64 = 0.8;
const AFTER_EVENTS_CONFIDENCE: f64 = 0.7;
const NEXT_DAY_CONFIDENCE: f64 = 0.6;

/// A proposed alternative slot. Confidence is a fixed per-tier constant:
/// same-day gaps rank above after-commitments, which rank above next-day.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSuggestion {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub confidence: f64,
    pub reason: String,
}

/// Search for free slots of `duration_minutes` near `desired_start`.
///
/// Tiers, in order: gaps between same-day events walked from 08:00, then a
/// single slot after the last commitment, then the same clock time on the
/// next day. Stops once `max_suggestions` have been produced.
pub fn suggest_slots(
    desired_start: NaiveDateTime,
    duration_minutes: i64,
    events: &[ExistingEvent],
    max_suggestions: usize,
) -> Result<Vec<SlotSuggestion>, ScheduleError> {
    if max_suggestions == 0 {
        return Err(ScheduleError::InvalidMaxSuggestions);
    }
    if duration_minutes <= 0 {
        return Err(ScheduleError::InvalidDuration(duration_minutes));
    }

    let day = desired_start.date();
    let duration = Duration::minutes(duration_minutes);

    let mut same_day: Vec<&ExistingEvent> =
        events.iter().filter(|event| event.start_time.date() == day).collect();
    same_day.sort_by_key(|event| event.start_time);

    let mut suggestions = Vec::new();
    let mut cursor = day.and_hms_opt(DAY_START_HOUR, 0, 0).expect("valid day start");

    for event in &same_day {
        if suggestions.len() >= max_suggestions {
            break;
        }
        if event.start_time - cursor >= duration {
            debug!(
                "Gap before '{}' fits {} min at {}",
                event.title,
                duration_minutes,
                cursor.format("%H:%M")
            );
            suggestions.push(SlotSuggestion {
                start_time: cursor,
                end_time: cursor + duration,
                confidence: GAP_CONFIDENCE,
                reason: format!("Available slot before {}", event.title),
            });
        }
        // Cursor always moves to the event's end, whether or not a slot fit.
        cursor = event.end_time;
    }

    if suggestions.len() < max_suggestions {
        let end = cursor + duration;
        if end.hour() <= DAY_END_HOUR {
            suggestions.push(SlotSuggestion {
                start_time: cursor,
                end_time: end,
                confidence: AFTER_EVENTS_CONFIDENCE,
                reason: "Available slot after existing commitments".to_string(),
            });
        } else {
            debug!("Skipping after-commitments slot ending at {}", end.format("%H:%M"));
        }
    }

    if suggestions.len() < max_suggestions {
        let next_day_start = desired_start + Duration::days(1);
        suggestions.push(SlotSuggestion {
            start_time: next_day_start,
            end_time: next_day_start + duration,
            confidence: NEXT_DAY_CONFIDENCE,
            reason: "Same time tomorrow".to_string(),
        });
    }

    Ok(suggestions)
}
