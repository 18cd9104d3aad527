use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Product policy around the heuristic confidence score and slot search.
/// The parsing core never reads these; callers apply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Below this the parse is not shown as a preview at all.
    pub preview_threshold: f64,
    /// Below this a preview is shown but flagged for confirmation.
    pub low_confidence_threshold: f64,
    /// Assumed length for commitments parsed without an end time.
    pub default_duration_minutes: i64,
    pub max_suggestions: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            preview_threshold: 0.5,
            low_confidence_threshold: 0.7,
            default_duration_minutes: 60,
            max_suggestions: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    /// Hosted planner endpoint; unset disables the `ask` command.
    pub endpoint: Option<String>,
    pub user_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self { scheduler: SchedulerConfig::default(), agent: AgentConfig::default() }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "dayweave", "dayweave")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.scheduler.preview_threshold, 0.5);
        assert_eq!(config.scheduler.low_confidence_threshold, 0.7);
        assert_eq!(config.scheduler.default_duration_minutes, 60);
        assert_eq!(config.scheduler.max_suggestions, 3);
        assert!(config.agent.endpoint.is_none());
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;

        // Set up temporary config directory
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let config = Config::default();
        config.save()?;

        let loaded = Config::load()?;
        assert_eq!(loaded.scheduler.max_suggestions, config.scheduler.max_suggestions);

        Ok(())
    }
}
