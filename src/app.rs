use crate::agent::{describe_reply, AgentClient};
use crate::config::Config;
use crate::parser::field_extractor::extract_type;
use crate::parser::{parse_commitment, ParsedCommitment};
use crate::schedule::{
    classify_priority, detect_conflicts, detect_recurring, estimate_travel_minutes,
    suggest_slots, SlotSuggestion, PATTERN_SUGGESTION_THRESHOLD,
};
use crate::store::{EventStore, ExistingEvent, NewEvent};
use crate::validation::{validate_date_format, validate_time_format};
use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime};
use rustyline::DefaultEditor;
use std::io::{self, Write};

pub struct Application {
    config: Config,
    store: EventStore,
}

impl Application {
    pub fn new() -> Result<Self> {
        Ok(Self { config: Config::load()?, store: EventStore::new()? })
    }

    pub async fn run(&self) -> Result<()> {
        log::info!("Starting Dayweave Terminal");

        let mut rl = DefaultEditor::new()?;

        println!("Welcome to Dayweave! Describe a commitment in plain words to schedule it.");
        println!("Example: team dinner tomorrow at 7pm for 2 hours");
        let prompt = "📅 ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if line.trim() == "exit" || line.trim() == "quit" {
                        break;
                    }
                    if let Err(err) = self.process_input(&line).await {
                        log::error!("Failed to process input: {:?}", err);
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn process_input(&self, input: &str) -> Result<()> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let (command, rest) = match trimmed.split_once(' ') {
            Some((head, tail)) => (head, tail.trim()),
            None => (trimmed, ""),
        };

        // Bare words are commands; "today at 3pm gym" is a commitment phrase.
        match (command, rest.is_empty()) {
            ("help", true) => {
                self.print_help();
                Ok(())
            }
            ("list", true) => self.list_events(false),
            ("today", true) => self.list_events(true),
            ("patterns", true) => self.show_patterns(),
            ("delete", _) => self.delete_event(rest),
            ("add", _) => self.add_event(rest),
            ("ask", _) => self.ask_agent(rest).await,
            _ => self.schedule_from_text(trimmed),
        }
    }

    fn print_help(&self) {
        println!("Available commands:");
        println!("  list              - Show upcoming commitments");
        println!("  today             - Show today's commitments");
        println!("  delete <number>   - Delete a commitment by its list position");
        println!("  add \"<title>\" <date> <start> <end> [\"<location>\"] - Add without parsing");
        println!("  patterns          - Show detected recurring commitments");
        println!("  ask <question>    - Ask the planner assistant (needs configuration)");
        println!("  help              - Show this help");
        println!("  exit              - Exit the application");
        println!();
        println!("Anything else is parsed as a new commitment, e.g.");
        println!("  physics exam on friday at 9am in main hall");
    }

    fn list_events(&self, today_only: bool) -> Result<()> {
        let now = Local::now().naive_local();
        let events = self.store.list_events()?;
        let shown: Vec<&ExistingEvent> = events
            .iter()
            .filter(|event| !today_only || event.start_time.date() == now.date())
            .collect();

        if shown.is_empty() {
            println!("Nothing scheduled.");
            return Ok(());
        }

        for (index, event) in shown.iter().enumerate() {
            let priority = classify_priority(event.commitment_type, event.start_time, now);
            let kind = event
                .commitment_type
                .map(|kind| format!(" [{}]", kind.label()))
                .unwrap_or_default();
            let travel = event
                .location
                .as_deref()
                .map(|location| {
                    let minutes = estimate_travel_minutes(location);
                    format!(" @ {} (~{} min travel)", location, minutes)
                })
                .unwrap_or_default();
            println!(
                "{}. {} - {} to {}{} ({}){}",
                index + 1,
                event.title,
                event.start_time.format("%a %Y-%m-%d %H:%M"),
                event.end_time.format("%H:%M"),
                kind,
                priority.label(),
                travel
            );
        }
        Ok(())
    }

    fn delete_event(&self, arg: &str) -> Result<()> {
        let Ok(position) = arg.parse::<usize>() else {
            println!("Usage: delete <number> (see 'list' for numbers)");
            return Ok(());
        };
        let events = self.store.list_events()?;
        let Some(event) = position.checked_sub(1).and_then(|i| events.get(i)) else {
            println!("No commitment at position {}.", position);
            return Ok(());
        };
        self.store.delete_event(&event.id)?;
        println!("Deleted '{}'.", event.title);
        Ok(())
    }

    fn add_event(&self, rest: &str) -> Result<()> {
        let parts = split_quoted(rest);
        if parts.len() < 4 {
            println!("Usage: add \"<title>\" <YYYY-MM-DD> <HH:MM> <HH:MM> [\"<location>\"]");
            return Ok(());
        }
        let (title, date, start, end) = (&parts[0], &parts[1], &parts[2], &parts[3]);

        if !validate_date_format(date) {
            println!("Invalid date '{}', expected YYYY-MM-DD.", date);
            return Ok(());
        }
        if !validate_time_format(start) || !validate_time_format(end) {
            println!("Invalid time, expected HH:MM.");
            return Ok(());
        }

        let start_time =
            NaiveDateTime::parse_from_str(&format!("{} {}", date, start), "%Y-%m-%d %H:%M")?;
        let end_time =
            NaiveDateTime::parse_from_str(&format!("{} {}", date, end), "%Y-%m-%d %H:%M")?;

        let created = self.store.create_event(NewEvent {
            title: title.clone(),
            start_time,
            end_time,
            location: parts.get(4).cloned(),
            commitment_type: extract_type(title),
        })?;
        println!("✅ Added '{}' on {}.", created.title, created.start_time.format("%Y-%m-%d %H:%M"));
        Ok(())
    }

    fn show_patterns(&self) -> Result<()> {
        let events = self.store.list_events()?;
        let patterns: Vec<_> = detect_recurring(&events)
            .into_iter()
            .filter(|pattern| pattern.confidence > PATTERN_SUGGESTION_THRESHOLD)
            .collect();

        if patterns.is_empty() {
            println!("No recurring commitments detected yet.");
            return Ok(());
        }

        println!("Recurring commitments:");
        for pattern in patterns {
            println!(
                "  '{}' every {} around {:02}:00 (seen {} times)",
                pattern.title, pattern.weekday, pattern.hour, pattern.count
            );
        }
        Ok(())
    }

    async fn ask_agent(&self, question: &str) -> Result<()> {
        if question.is_empty() {
            println!("Usage: ask <question>");
            return Ok(());
        }
        let Some(client) = AgentClient::from_config(&self.config.agent) else {
            println!("No planner endpoint configured. Set [agent] endpoint in the config file.");
            return Ok(());
        };
        match client.ask(question).await {
            Ok(reply) => println!("{}", describe_reply(&reply)),
            Err(e) => println!("❌ Planner request failed: {}", e),
        }
        Ok(())
    }

    fn schedule_from_text(&self, input: &str) -> Result<()> {
        let now = Local::now().naive_local();
        let parsed = parse_commitment(input, now);
        let policy = &self.config.scheduler;

        if parsed.confidence <= policy.preview_threshold {
            println!(
                "I couldn't make enough sense of that (confidence {:.0}%).",
                parsed.confidence * 100.0
            );
            println!("Try something like: 'lunch with Sam tomorrow at 12pm'.");
            return Ok(());
        }

        self.print_preview(&parsed);
        if parsed.confidence < policy.low_confidence_threshold {
            println!("⚠️  Low confidence, double-check the details above.");
        }

        let Some(start) = parsed.start_time else {
            println!("No start time recognized; add one, e.g. 'at 3pm tomorrow'.");
            return Ok(());
        };
        let duration_minutes =
            parsed.duration_minutes.unwrap_or(policy.default_duration_minutes);
        let end = parsed.end_time.unwrap_or(start + Duration::minutes(duration_minutes));

        let events = self.store.list_events()?;
        let conflict = detect_conflicts(start, end, &events);

        let (final_start, final_end) = if conflict.has_conflict {
            println!("⚠️  {}", conflict.suggestion_text);
            let slots = suggest_slots(start, duration_minutes, &events, policy.max_suggestions)?;
            match choose_slot(&slots, start, end)? {
                Some(range) => range,
                None => {
                    println!("Not scheduled.");
                    return Ok(());
                }
            }
        } else {
            (start, end)
        };

        let created = self.store.create_event(NewEvent {
            title: parsed.title.clone().unwrap_or_else(|| "Untitled commitment".to_string()),
            start_time: final_start,
            end_time: final_end,
            location: parsed.location.clone(),
            commitment_type: parsed.commitment_type,
        })?;

        println!(
            "✅ Scheduled '{}' for {} to {}.",
            created.title,
            created.start_time.format("%a %Y-%m-%d %H:%M"),
            created.end_time.format("%H:%M")
        );
        Ok(())
    }

    fn print_preview(&self, parsed: &ParsedCommitment) {
        println!("Here's what I understood (confidence {:.0}%):", parsed.confidence * 100.0);
        println!("  Title:    {}", parsed.title.as_deref().unwrap_or("(none)"));
        match parsed.start_time {
            Some(start) => println!("  Start:    {}", start.format("%a %Y-%m-%d %H:%M")),
            None => println!("  Start:    (none)"),
        }
        match parsed.end_time {
            Some(end) => println!("  End:      {}", end.format("%H:%M")),
            None => println!("  End:      (none)"),
        }
        if let Some(minutes) = parsed.duration_minutes {
            println!("  Duration: {} min", minutes);
        }
        if let Some(kind) = parsed.commitment_type {
            println!("  Type:     {}", kind.label());
        }
        if let Some(location) = &parsed.location {
            println!("  Location: {}", location);
        }
    }
}

/// Split on spaces, keeping quoted sections together.
fn split_quoted(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                if !in_quotes && !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

/// Offer the suggested slots and read the user's pick from stdin. Returns
/// `None` when the user cancels.
fn choose_slot(
    slots: &[SlotSuggestion],
    original_start: NaiveDateTime,
    original_end: NaiveDateTime,
) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
    if slots.is_empty() {
        print!("No free slots found. Keep the original time anyway? (y/N): ");
    } else {
        println!("Free slots nearby:");
        for (index, slot) in slots.iter().enumerate() {
            println!(
                "{}. {} to {} - {} ({:.0}%)",
                index + 1,
                slot.start_time.format("%a %Y-%m-%d %H:%M"),
                slot.end_time.format("%H:%M"),
                slot.reason,
                slot.confidence * 100.0
            );
        }
        print!("Pick a slot number, 'y' to keep the original time, or Enter to cancel: ");
    }
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;
    let choice = choice.trim();

    if choice.eq_ignore_ascii_case("y") {
        return Ok(Some((original_start, original_end)));
    }
    if let Ok(number) = choice.parse::<usize>() {
        if let Some(slot) = number.checked_sub(1).and_then(|i| slots.get(i)) {
            return Ok(Some((slot.start_time, slot.end_time)));
        }
    }
    Ok(None)
}
