// src/tree/mod.rs

//! Task tree representation.
//!
//! - [`node`] holds the [`Task`] node itself: identity, weak parent link,
//!   owned children, construction and `add`.
//! - [`state`] defines the [`TaskState`] lifecycle and its transition rules.
//! - [`ids`] provides [`TaskId`] and the pluggable id generators.
//! - [`snapshot`] exports a live tree as plain [`TaskSnapshot`] data.
//!
//! Running a tree lives in [`crate::engine`]; change notifications in
//! [`crate::events`].

pub mod ids;
pub mod node;
pub mod snapshot;
pub mod state;

pub use ids::{IdGenerator, SequentialIdGenerator, TaskId, UuidIdGenerator};
pub use node::{ANONYMOUS, Child, Task, TaskBuilder, TaskData, TaskSpec};
pub use snapshot::TaskSnapshot;
pub use state::TaskState;
