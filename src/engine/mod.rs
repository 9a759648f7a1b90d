// src/engine/mod.rs

//! Execution engine.
//!
//! - [`run`] implements `Task::run` / `Task::run_with`: resolve the data,
//!   run the action phase, then run ordinary children one after another.
//! - [`fanout`] implements the batch action phase: one branch per item,
//!   spawned together, folded into the parent's progress/status/state as
//!   each one settles.
//! - [`context`] holds the engine-wide settings a tree shares (id source,
//!   failure status text).
//!
//! Failure policy: a scalar action failure is recorded on its node and
//! returned from `run`; batch branch failures are recorded and absorbed.

pub mod context;
pub mod fanout;
pub mod run;

pub use context::{DEFAULT_FAILURE_STATUS, EngineContext};
pub use run::RunFuture;
