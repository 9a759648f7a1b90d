// src/exec/mod.rs

//! Action layer.
//!
//! - [`action`] defines [`Action`], the sync-or-async callable a task node
//!   wraps, and [`Payload`], the tagged scalar/batch data a node runs with.
//!
//! Actions never see the engine's bookkeeping: they receive the task handle
//! and their data item, and report back through their return value (and,
//! optionally, through `update_progress` / `set_status` on the handle).

pub mod action;

pub use action::{Action, ActionFuture, Payload};
