// src/lib.rs

//! Hierarchical task execution with upward state propagation.
//!
//! A tree of [`Task`] nodes, each optionally backed by an [`Action`], is
//! composed with [`Task::add`] and executed with [`Task::run`]:
//!
//! - a node runs its own action first, once with scalar data or once per
//!   item (in parallel branches) with batch data,
//! - then runs its children one after another, in the order they were added.
//!
//! Every progress/status/state change on a node is emitted on that node,
//! relayed as `ChildUpdated` to each ancestor and finally as `TreeUpdated` on
//! the root. [`Task::export_snapshot`] renders the live tree as plain data.
//!
//! ```no_run
//! use tasktree::{Action, Payload, Task};
//!
//! # async fn demo() -> tasktree::Result<()> {
//! let root: Task<u64> = Task::new("deploy")?;
//! root.add(Action::<u64>::named_fn("build", |_, _| Ok(())))?
//!     .add_with(
//!         Action::<u64>::named("upload", |task, part| async move {
//!             task.set_status(format!("uploading part {part:?}"));
//!             Ok::<_, tasktree::errors::Error>(())
//!         }),
//!         Payload::batch([1, 2, 3]),
//!     )?;
//!
//! root.run().await?;
//! println!("{}", root.export_snapshot().to_json().unwrap());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod logging;
pub mod tree;
pub mod types;

pub use engine::{EngineContext, RunFuture};
pub use errors::{Result, TaskError};
pub use events::{EventKind, SubscriptionId, TaskChange, TaskEvent};
pub use exec::{Action, Payload};
pub use tree::{
    Child, IdGenerator, SequentialIdGenerator, Task, TaskBuilder, TaskData, TaskId, TaskSnapshot,
    TaskSpec, TaskState, UuidIdGenerator,
};
pub use types::{IdStrategy, LogLevel};
