// src/config/validate.rs

use crate::config::model::{EngineConfig, RawEngineConfig};
use crate::errors::{Result, TaskError};
use crate::types::IdStrategy;

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = TaskError;

    fn try_from(raw: RawEngineConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(EngineConfig::new_unchecked(raw.ids, raw.status, raw.logging))
    }
}

fn validate_raw_config(cfg: &RawEngineConfig) -> Result<()> {
    validate_ids(cfg)?;
    validate_status(cfg)?;
    Ok(())
}

fn validate_ids(cfg: &RawEngineConfig) -> Result<()> {
    if cfg.ids.strategy == IdStrategy::Sequential && cfg.ids.prefix.trim().is_empty() {
        return Err(TaskError::ConfigError(
            "[ids].prefix must be non-empty when strategy = \"sequential\"".to_string(),
        ));
    }
    Ok(())
}

fn validate_status(cfg: &RawEngineConfig) -> Result<()> {
    if cfg.status.failed.trim().is_empty() {
        return Err(TaskError::ConfigError(
            "[status].failed must be a non-empty message".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::try_from(RawEngineConfig::default()).unwrap();
        assert_eq!(cfg.ids.strategy, IdStrategy::Uuid);
        assert_eq!(cfg.status.failed, "The task has failed due to an error.");
    }

    #[test]
    fn sequential_needs_prefix() {
        let mut raw = RawEngineConfig::default();
        raw.ids.strategy = IdStrategy::Sequential;
        raw.ids.prefix = " ".to_string();

        match EngineConfig::try_from(raw) {
            Err(TaskError::ConfigError(msg)) => assert!(msg.contains("[ids].prefix")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn uuid_ignores_prefix() {
        let mut raw = RawEngineConfig::default();
        raw.ids.prefix = String::new();
        assert!(EngineConfig::try_from(raw).is_ok());
    }

    #[test]
    fn failed_status_must_not_be_empty() {
        let mut raw = RawEngineConfig::default();
        raw.status.failed = String::new();
        assert!(matches!(
            EngineConfig::try_from(raw),
            Err(TaskError::ConfigError(_))
        ));
    }
}
