use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw status payload as returned by the backend's task endpoint.
///
/// Fields the backend may omit default to empty values; interpretation is left
/// to [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: String,
    /// Backend-supplied percentage; may be missing or out of range.
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub completed_items: u32,
    #[serde(default)]
    pub failed_items: u32,
    #[serde(default)]
    pub results: Vec<RawItemResult>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawItemResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub game_id: Option<GameRef>,
    #[serde(default)]
    pub matchup: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Game identifiers come back as either integers or strings depending on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameRef::Number(id) => write!(f, "{id}"),
            GameRef::Text(id) => write!(f, "{id}"),
        }
    }
}
