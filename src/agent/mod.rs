//! Bridge to the hosted AI planner endpoint.
//!
//! The endpoint answers free-form planning questions and can create items
//! server-side. Its JSON replies are decoded into [`AgentReply`] so callers
//! handle every response kind exhaustively instead of probing fields.

use anyhow::{anyhow, Result};
use log::debug;
use lru::LruCache;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::config::AgentConfig;

const MAX_INPUT_LEN: usize = 1000;

/// One reply from the planner endpoint, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentReply {
    CreationSuccess {
        item_type: String,
        title: String,
        #[serde(default)]
        message: Option<String>,
    },
    Answer {
        message: String,
    },
    PlanCreated {
        topic: String,
        #[serde(default)]
        weeks: Option<u32>,
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Cache of replies keyed by sanitized input, to avoid repeated calls while
/// the user rephrases around the same question.
static REPLY_CACHE: Lazy<Mutex<LruCache<String, AgentReply>>> =
    Lazy::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(100).unwrap())));

pub struct AgentClient {
    endpoint: String,
    user_id: String,
    client: Client,
}

impl AgentClient {
    /// Build a client from config; `None` when no endpoint is configured.
    pub fn from_config(config: &AgentConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;
        let user_id = config.user_id.clone().unwrap_or_else(|| "local".to_string());
        Some(Self { endpoint, user_id, client: Client::new() })
    }

    /// Send a question to the planner and decode its reply.
    pub async fn ask(&self, input: &str) -> Result<AgentReply> {
        if input.is_empty() {
            return Err(anyhow!("Empty input provided"));
        }
        if input.len() > MAX_INPUT_LEN {
            return Err(anyhow!("Input too long (max {} characters)", MAX_INPUT_LEN));
        }

        let sanitized_input = sanitize_user_input(input);

        let cached_reply = {
            let mut cache = REPLY_CACHE
                .lock()
                .map_err(|e| anyhow!("Failed to acquire cache lock: {}", e.to_string()))?;
            cache.get(&sanitized_input).cloned()
        };
        if let Some(cached) = cached_reply {
            debug!("Using cached agent reply for: {}", sanitized_input);
            return Ok(cached);
        }

        debug!("Calling planner endpoint for: {}", sanitized_input);
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "userInput": sanitized_input,
            "userId": self.user_id,
        }));
        if let Ok(token) = env::var("DAYWEAVE_AGENT_TOKEN") {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Planner endpoint returned status {}", response.status()));
        }

        let reply: AgentReply = response
            .json()
            .await
            .map_err(|e| anyhow!("Unrecognized planner response shape: {}", e))?;

        if let Ok(mut cache) = REPLY_CACHE.lock() {
            cache.put(sanitized_input, reply.clone());
        }

        Ok(reply)
    }
}

/// Strip control characters from user input before it goes on the wire.
pub fn sanitize_user_input(input: &str) -> String {
    input.chars().filter(|&c| !c.is_control() || c == '\n' || c == '\t').collect()
}

/// Render a reply for the terminal. Every kind is handled; adding a variant
/// breaks this match on purpose.
pub fn describe_reply(reply: &AgentReply) -> String {
    match reply {
        AgentReply::CreationSuccess { item_type, title, message } => match message {
            Some(msg) => format!("Created {} '{}': {}", item_type, title, msg),
            None => format!("Created {} '{}'", item_type, title),
        },
        AgentReply::Answer { message } => message.clone(),
        AgentReply::PlanCreated { topic, weeks, message } => {
            let mut text = match weeks {
                Some(weeks) => format!("Created a {}-week plan for '{}'", weeks, topic),
                None => format!("Created a plan for '{}'", topic),
            };
            if let Some(msg) = message {
                text.push_str(": ");
                text.push_str(msg);
            }
            text
        }
        AgentReply::Error { message } => format!("Planner error: {}", message),
    }
}
