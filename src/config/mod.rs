// src/config/mod.rs

//! Engine configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk or a string (`loader.rs`).
//! - Validate it into an [`EngineConfig`] (`validate.rs`).
//!
//! A validated config becomes runtime settings through
//! [`crate::engine::EngineContext::from_config`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, from_toml_str, load_and_validate, load_from_path};
pub use model::{EngineConfig, IdsSection, LoggingSection, RawEngineConfig, StatusSection};
