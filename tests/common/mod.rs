#![allow(dead_code)]

pub use tasktree_test_utils::builders::{chain, Journal};
pub use tasktree_test_utils::recorder::EventRecorder;
pub use tasktree_test_utils::{init_tracing, with_timeout};
