//! JSON-backed event store.
//!
//! This is the data-access side of the application: the parsing and
//! scheduling functions never touch it. Callers list events once and pass
//! the slice into the pure functions.

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use crate::parser::CommitmentType;

const STATE_DIR: &str = ".dayweave";
const EVENTS_FILE: &str = "events.json";
// Caps on file size and item count keep a corrupted or hostile state file
// from exhausting memory on load.
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const MAX_EVENTS: usize = 10_000;

/// A persisted commitment, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingEvent {
    pub id: String,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub commitment_type: Option<CommitmentType>,
}

/// Fields for a new event; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: Option<String>,
    pub commitment_type: Option<CommitmentType>,
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub commitment_type: Option<CommitmentType>,
}

pub struct EventStore {
    state_dir: PathBuf,
}

impl EventStore {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Self::at(home_dir.join(STATE_DIR))
    }

    /// Open a store rooted at an explicit directory. Tests use this to stay
    /// off the real home directory.
    pub fn at(state_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir })
    }

    fn events_path(&self) -> PathBuf {
        self.state_dir.join(EVENTS_FILE)
    }

    /// All stored events, sorted ascending by start time.
    pub fn list_events(&self) -> Result<Vec<ExistingEvent>> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let metadata = std::fs::metadata(&path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow!("Event file size exceeds security limits"));
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut events: Vec<ExistingEvent> = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("Failed to parse event data: {}", e))?;

        if events.len() > MAX_EVENTS {
            return Err(anyhow!("Too many events in file (maximum {})", MAX_EVENTS));
        }

        events.sort_by_key(|event| event.start_time);
        Ok(events)
    }

    pub fn create_event(&self, data: NewEvent) -> Result<ExistingEvent> {
        validate_range(data.start_time, data.end_time)?;

        let event = ExistingEvent {
            id: uuid::Uuid::new_v4().to_string(),
            title: data.title,
            start_time: data.start_time,
            end_time: data.end_time,
            location: data.location,
            commitment_type: data.commitment_type,
        };

        let mut events = self.list_events()?;
        events.push(event.clone());
        self.save(&events)?;
        debug!("Created event {} '{}'", event.id, event.title);
        Ok(event)
    }

    pub fn update_event(&self, id: &str, patch: EventPatch) -> Result<ExistingEvent> {
        let mut events = self.list_events()?;
        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| anyhow!("No event with id {}", id))?;

        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(start_time) = patch.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            event.end_time = end_time;
        }
        if let Some(location) = patch.location {
            event.location = Some(location);
        }
        if let Some(kind) = patch.commitment_type {
            event.commitment_type = Some(kind);
        }
        validate_range(event.start_time, event.end_time)?;

        let updated = event.clone();
        self.save(&events)?;
        debug!("Updated event {}", id);
        Ok(updated)
    }

    pub fn delete_event(&self, id: &str) -> Result<()> {
        let mut events = self.list_events()?;
        let before = events.len();
        events.retain(|event| event.id != id);
        if events.len() == before {
            return Err(anyhow!("No event with id {}", id));
        }
        self.save(&events)?;
        debug!("Deleted event {}", id);
        Ok(())
    }

    fn save(&self, events: &[ExistingEvent]) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.events_path())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, events)?;
        Ok(())
    }
}

fn validate_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if start >= end {
        return Err(anyhow!("Event must start before it ends ({} >= {})", start, end));
    }
    Ok(())
}
