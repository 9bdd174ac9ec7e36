//! Load State Machine
//!
//! ```text
//! Idle ──→ Started ──→ Committed ──→ Finished
//!             │            │
//!             └────────────┴──────→ Failed
//! ```
//!
//! Any state may move to Started (a new load supersedes whatever was
//! going on). Failed is terminal until the next Started.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Request sent, nothing received
    Started,
    /// First bytes received, the URI is now the page's
    Committed,
    /// Load completed
    Finished,
    /// Load failed
    Failed,
}

impl LoadState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: LoadState) -> bool {
        match (self, target) {
            (_, LoadState::Started) => true,
            (LoadState::Started, LoadState::Committed) => true,
            (LoadState::Started, LoadState::Failed) => true,
            (LoadState::Committed, LoadState::Finished) => true,
            (LoadState::Committed, LoadState::Failed) => true,
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Started | LoadState::Committed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Started => "started",
            LoadState::Committed => "committed",
            LoadState::Finished => "finished",
            LoadState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LoadState; 5] = [
        LoadState::Idle,
        LoadState::Started,
        LoadState::Committed,
        LoadState::Finished,
        LoadState::Failed,
    ];

    #[test]
    fn test_valid_transitions() {
        assert!(LoadState::Idle.can_transition_to(LoadState::Started));
        assert!(LoadState::Started.can_transition_to(LoadState::Committed));
        assert!(LoadState::Committed.can_transition_to(LoadState::Finished));
        assert!(LoadState::Started.can_transition_to(LoadState::Failed));
        assert!(LoadState::Committed.can_transition_to(LoadState::Failed));
        // A new load may start from anywhere
        for state in ALL {
            assert!(state.can_transition_to(LoadState::Started));
        }
    }

    #[test]
    fn test_failed_only_from_loading_states() {
        for state in ALL {
            assert_eq!(state.can_transition_to(LoadState::Failed), state.is_loading());
        }
        assert!(!LoadState::Failed.can_transition_to(LoadState::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!LoadState::Idle.can_transition_to(LoadState::Committed));
        assert!(!LoadState::Started.can_transition_to(LoadState::Finished));
        assert!(!LoadState::Failed.can_transition_to(LoadState::Finished));
        assert!(!LoadState::Finished.can_transition_to(LoadState::Committed));
        assert!(!LoadState::Committed.can_transition_to(LoadState::Committed));
    }
}
