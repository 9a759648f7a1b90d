// src/engine/context.rs

//! Engine-wide settings shared by every node of a tree.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::tree::ids::{IdGenerator, SequentialIdGenerator, TaskId, UuidIdGenerator};
use crate::types::IdStrategy;

/// Status text a node receives when its own action fails.
pub const DEFAULT_FAILURE_STATUS: &str = "The task has failed due to an error.";

/// Settings handed to a root task and inherited by every child and parallel
/// branch created from it.
#[derive(Debug, Clone)]
pub struct EngineContext {
    ids: Arc<dyn IdGenerator>,
    failure_status: Arc<str>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Arc::new(UuidIdGenerator), DEFAULT_FAILURE_STATUS)
    }
}

impl EngineContext {
    pub fn new(ids: Arc<dyn IdGenerator>, failure_status: impl Into<Arc<str>>) -> Self {
        Self {
            ids,
            failure_status: failure_status.into(),
        }
    }

    /// Build a context from a validated [`EngineConfig`].
    pub fn from_config(cfg: &EngineConfig) -> Self {
        let ids: Arc<dyn IdGenerator> = match cfg.ids.strategy {
            IdStrategy::Uuid => Arc::new(UuidIdGenerator),
            IdStrategy::Sequential => Arc::new(SequentialIdGenerator::new(cfg.ids.prefix.clone())),
        };
        Self::new(ids, cfg.status.failed.as_str())
    }

    /// Same settings, different id source.
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn next_id(&self) -> TaskId {
        self.ids.next_id()
    }

    pub fn failure_status(&self) -> &str {
        &self.failure_status
    }
}
