//! Time and date extraction from free-text phrases.
//!
//! Every function takes the reference instant as an explicit parameter so
//! parsing is deterministic for a given input. Pattern lists are ordered and
//! first match wins; callers should expect lower recall on complex sentences.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Times recognized in a phrase, resolved against a reference instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTime {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
}

/// Duration patterns in priority order, each with its minutes-per-unit factor.
static DURATION_PATTERNS: Lazy<Vec<(Regex, i64)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)for\s+(\d{1,3})\s*hours?\b").unwrap(), 60),
        (Regex::new(r"(?i)for\s+(\d{1,3})\s*min(?:ute)?s?\b").unwrap(), 1),
        (Regex::new(r"(?i)(\d{1,3})\s*hours?\s+(?:long|duration)\b").unwrap(), 60),
    ]
});

struct ClockPattern {
    regex: Regex,
    has_minutes: bool,
}

/// Clock time patterns in priority order. The "at"-prefixed forms are tried
/// before bare times so "at 3pm" is not shadowed by a stray number earlier
/// in the sentence.
static CLOCK_PATTERNS: Lazy<Vec<ClockPattern>> = Lazy::new(|| {
    vec![
        ClockPattern {
            regex: Regex::new(r"(?i)\bat\s+(\d{1,2}):(\d{2})\s*(am|pm)\b").unwrap(),
            has_minutes: true,
        },
        ClockPattern {
            regex: Regex::new(r"(?i)\bat\s+(\d{1,2})\s*(am|pm)\b").unwrap(),
            has_minutes: false,
        },
        ClockPattern {
            regex: Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*(am|pm)\b").unwrap(),
            has_minutes: true,
        },
        ClockPattern {
            regex: Regex::new(r"(?i)\b(\d{1,2})\s*(am|pm)\b").unwrap(),
            has_minutes: false,
        },
    ]
});

static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})\b").unwrap());

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Convert a 12-hour clock reading to 24-hour form.
fn convert_to_24_hour(hour: u32, meridiem: &str) -> u32 {
    match (hour, meridiem.to_lowercase().as_str()) {
        (12, "am") => 0,
        (h, "am") => h,
        (12, "pm") => 12,
        (h, "pm") => h + 12,
        _ => hour,
    }
}

/// Extract an explicit duration, in minutes. No match leaves it unset.
pub fn extract_duration(input: &str) -> Option<i64> {
    for (pattern, factor) in DURATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(input) {
            if let Ok(value) = caps[1].parse::<i64>() {
                debug!("Matched duration pattern: {} -> {} min", &caps[0], value * factor);
                return Some(value * factor);
            }
        }
    }
    None
}

/// Extract a clock time as (hour, minute) in 24-hour form.
pub fn extract_clock_time(input: &str) -> Option<(u32, u32)> {
    for pattern in CLOCK_PATTERNS.iter() {
        if let Some(caps) = pattern.regex.captures(input) {
            let hour: u32 = caps[1].parse().ok()?;
            let (minute, meridiem_idx) = if pattern.has_minutes {
                (caps[2].parse::<u32>().ok()?, 3)
            } else {
                (0, 2)
            };
            if hour == 0 || hour > 12 || minute > 59 {
                continue;
            }
            let hour_24 = convert_to_24_hour(hour, &caps[meridiem_idx]);
            debug!("Matched clock pattern: {} -> {:02}:{:02}", &caps[0], hour_24, minute);
            return Some((hour_24, minute));
        }
    }
    None
}

/// Resolve the calendar date a phrase refers to, relative to `now`.
///
/// Weekday names always resolve forward: naming today's weekday lands a full
/// week out. "MM/DD" dates already past roll to the next year. With no date
/// phrase at all the reference date is used.
pub fn resolve_date(input: &str, now: NaiveDateTime) -> NaiveDate {
    let input_lower = input.to_lowercase();
    let today = now.date();

    if input_lower.contains("today") {
        return today;
    }
    if input_lower.contains("tomorrow") {
        return today + Duration::days(1);
    }
    if input_lower.contains("next week") {
        return today + Duration::days(7);
    }

    for (name, weekday) in WEEKDAYS {
        if input_lower.contains(name) {
            let mut delta = weekday.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64;
            if delta <= 0 {
                delta += 7;
            }
            return today + Duration::days(delta);
        }
    }

    if let Some(caps) = NUMERIC_DATE.captures(&input_lower) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        if let Some(mut date) = NaiveDate::from_ymd_opt(today.year(), month, day) {
            if date < today {
                if let Some(next_year) = NaiveDate::from_ymd_opt(today.year() + 1, month, day) {
                    date = next_year;
                }
            }
            return date;
        }
    }

    today
}

/// Extract start time, end time and duration from a phrase.
///
/// A date phrase on its own does not produce a start time; the date is only
/// resolved once a clock time has been recognized.
pub fn extract_time(input: &str, now: NaiveDateTime) -> ExtractedTime {
    let duration_minutes = extract_duration(input);

    let Some((hour, minute)) = extract_clock_time(input) else {
        debug!("No clock time recognized in: '{}'", input);
        return ExtractedTime { start_time: None, end_time: None, duration_minutes };
    };

    let date = resolve_date(input, now);
    let start_time = date.and_hms_opt(hour, minute, 0);

    let end_time = match (start_time, duration_minutes) {
        (Some(start), Some(minutes)) => Some(start + Duration::minutes(minutes)),
        _ => None,
    };

    ExtractedTime { start_time, end_time, duration_minutes }
}
