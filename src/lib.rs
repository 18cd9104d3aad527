pub mod agent;
pub mod app;
pub mod config;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod validation;

use anyhow::Result;
use log::*;

pub async fn run() -> Result<()> {
    let app = app::Application::new()?;
    info!("Initializing Dayweave application");
    app.run().await
}

pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use parser::{parse_commitment, CommitmentType, ParsedCommitment};
pub use schedule::{detect_conflicts, suggest_slots, ConflictResult, SlotSuggestion};
pub use store::{EventStore, ExistingEvent};
