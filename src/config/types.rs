use serde::{Deserialize, Serialize};

use crate::store::{DEFAULT_HISTORY_CAPACITY, DEFAULT_STATE_HISTORY};
use crate::tree::RouterDeclaration;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub state: StateConfig,
    /// Router tree declaration, rooted at this table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<RouterDeclaration>,
}

/// Location history kept by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries (default: 100).
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Previous states kept per router (default: 10).
    #[serde(default = "default_state_history_capacity")]
    pub history_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_state_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_state_history_capacity() -> usize {
    DEFAULT_STATE_HISTORY
}
