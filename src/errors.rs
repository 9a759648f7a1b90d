// src/errors.rs

//! Crate-wide error type and result alias.

use std::sync::Arc;

use thiserror::Error;

use crate::tree::TaskState;

#[derive(Error, Debug)]
pub enum TaskError {
    /// Bad constructor or setter input. Nothing was mutated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The node already belongs to another parent, or attaching it would
    /// create a cycle.
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Invalid state transition for task '{task}': {from} -> {to}")]
    InvalidTransition {
        task: String,
        from: TaskState,
        to: TaskState,
    },

    /// An action's own failure. `error` is the exact value stored on the
    /// node (see [`crate::Task::error`]).
    #[error("Task '{task}' failed: {error}")]
    ActionFailure {
        task: String,
        error: Arc<anyhow::Error>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TaskError {
    /// The action error carried by an `ActionFailure`, if any.
    pub fn action_error(&self) -> Option<&Arc<anyhow::Error>> {
        match self {
            TaskError::ActionFailure { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskError>;
