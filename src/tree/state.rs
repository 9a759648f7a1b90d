// src/tree/state.rs

//! Task lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task node.
///
/// A node starts `Declared` and settles into one of the two terminal states.
/// A node that never finishes keeps `Declared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Declared,
    Completed,
    Failed,
}

impl Default for TaskState {
    fn default() -> Self {
        TaskState::Declared
    }
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Declared)
    }

    /// Validate a transition, returning the resulting state.
    ///
    /// Legal moves are `Declared -> Completed`, `Declared -> Failed`, and
    /// re-entering the terminal state a node already holds (a re-run of a
    /// finished node). Nothing ever moves back to `Declared`, and a node never
    /// switches between `Completed` and `Failed`.
    pub fn transition(self, next: TaskState) -> Option<TaskState> {
        match (self, next) {
            (_, TaskState::Declared) => None,
            (TaskState::Declared, next) => Some(next),
            (current, next) if current == next => Some(next),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Declared => "declared",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
