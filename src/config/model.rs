// src/config/model.rs

use serde::Deserialize;

use crate::engine::DEFAULT_FAILURE_STATUS;
use crate::types::{IdStrategy, LogLevel};

/// Raw engine configuration as read from a TOML file.
///
/// ```toml
/// [ids]
/// strategy = "sequential"
/// prefix = "task"
///
/// [status]
/// failed = "The task has failed due to an error."
///
/// [logging]
/// level = "debug"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEngineConfig {
    #[serde(default)]
    pub ids: IdsSection,

    #[serde(default)]
    pub status: StatusSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Validated engine configuration.
///
/// Only obtainable through `TryFrom<RawEngineConfig>` (or `Default`, which is
/// valid by construction).
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub ids: IdsSection,
    pub status: StatusSection,
    pub logging: LoggingSection,
}

impl EngineConfig {
    pub(crate) fn new_unchecked(
        ids: IdsSection,
        status: StatusSection,
        logging: LoggingSection,
    ) -> Self {
        Self {
            ids,
            status,
            logging,
        }
    }
}

/// `[ids]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IdsSection {
    /// `"uuid"` (default) or `"sequential"`.
    #[serde(default)]
    pub strategy: IdStrategy,

    /// Prefix for sequential ids (`{prefix}-{n}`).
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "task".to_string()
}

impl Default for IdsSection {
    fn default() -> Self {
        Self {
            strategy: IdStrategy::default(),
            prefix: default_prefix(),
        }
    }
}

/// `[status]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSection {
    /// Status text set on a node whose own action failed.
    #[serde(default = "default_failed_status")]
    pub failed: String,
}

fn default_failed_status() -> String {
    DEFAULT_FAILURE_STATUS.to_string()
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            failed: default_failed_status(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    /// If `None`, `TASKTREE_LOG` or `info` is used.
    #[serde(default)]
    pub level: Option<LogLevel>,
}
