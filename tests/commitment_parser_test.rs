use chrono::{NaiveDate, NaiveDateTime, Timelike};
use dayweave::parser::{parse_commitment, CommitmentType};
use pretty_assertions::assert_eq;

/// Wednesday, 2024-01-10 at noon.
fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

fn datetime(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn test_clock_time_parsing() {
    let cases = vec![
        ("meeting at 3pm", (15, 0)),
        ("call at 9:30am", (9, 30)),
        ("lunch at 12pm", (12, 0)),
        ("shift starts at 12am", (0, 0)),
        ("review 4:45pm", (16, 45)),
    ];

    for (input, expected) in cases {
        let parsed = parse_commitment(input, reference());
        let start = parsed.start_time.unwrap_or_else(|| panic!("no start for '{}'", input));
        assert_eq!((start.hour(), start.minute()), expected, "failed for input: {}", input);
    }
}

#[test]
fn test_weekday_rolls_forward() {
    // Friday is still ahead this week
    let parsed = parse_commitment("lunch on friday at 12pm", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 12, 12, 0)));

    // Monday already passed, so it lands next week
    let parsed = parse_commitment("lunch on monday at 12pm", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 15, 12, 0)));
}

#[test]
fn test_date_words() {
    let parsed = parse_commitment("dentist tomorrow at 10am", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 11, 10, 0)));

    let parsed = parse_commitment("checkup next week at 10am", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 17, 10, 0)));

    // No date phrase defaults to the reference date
    let parsed = parse_commitment("sync at 4pm", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 10, 16, 0)));
}

#[test]
fn test_duration_produces_end_time() {
    let parsed = parse_commitment("workshop at 2pm for 90 minutes", reference());
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 10, 14, 0)));
    assert_eq!(parsed.end_time, Some(datetime(2024, 1, 10, 15, 30)));
    assert_eq!(parsed.duration_minutes, Some(90));
}

#[test]
fn test_fields_extracted_together() {
    let parsed = parse_commitment("physics exam on friday at 9am in main hall", reference());
    assert_eq!(parsed.title.as_deref(), Some("physics exam"));
    assert_eq!(parsed.commitment_type, Some(CommitmentType::Exam));
    assert_eq!(parsed.location.as_deref(), Some("main hall"));
    assert_eq!(parsed.start_time, Some(datetime(2024, 1, 12, 9, 0)));
}

#[test]
fn test_unparseable_input_degrades_gracefully() {
    let parsed = parse_commitment("xyzzy plugh", reference());
    assert_eq!(parsed.title, None);
    assert_eq!(parsed.start_time, None);
    assert_eq!(parsed.end_time, None);
    assert_eq!(parsed.location, None);
    assert_eq!(parsed.commitment_type, None);
    // Base score only
    assert!((parsed.confidence - 0.3).abs() < 1e-9);
}

#[test]
fn test_inputs_without_time_phrase_stay_below_half() {
    for input in ["gym session", "dinner with friends", "study for the quiz"] {
        let parsed = parse_commitment(input, reference());
        assert_eq!(parsed.start_time, None, "unexpected start for '{}'", input);
        assert!(parsed.confidence <= 0.5, "confidence too high for '{}'", input);
    }
}

#[test]
fn test_parsing_is_idempotent() {
    let input = "team dinner tomorrow at 7pm for 2 hours in the city";
    let first = parse_commitment(input, reference());
    let second = parse_commitment(input, reference());
    assert_eq!(first, second);
}

#[test]
fn test_serde_round_trip() {
    let parsed = parse_commitment("yoga class at 6pm for 1 hour", reference());
    let json = serde_json::to_string(&parsed).unwrap();
    let back: dayweave::ParsedCommitment = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, back);
    // The type tag serializes under its wire name
    assert!(json.contains("\"type\":\"class\""));
}
