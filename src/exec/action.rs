// src/exec/action.rs

//! Actions: the unit of work a task node runs.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::tree::{Task, TaskData};

/// Boxed future returned by an action invocation.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

type ActionFn<D> = dyn Fn(Task<D>, Option<D>) -> ActionFuture + Send + Sync;

/// A callable `(task, data) -> result`, sync or async, optionally named.
///
/// The task handle passed in is the node the action runs on, so an action can
/// report progress and status, or add further children that run after it.
/// `data` is `None` when the node was run without data.
pub struct Action<D> {
    name: Option<String>,
    func: Arc<ActionFn<D>>,
}

impl<D> Clone for Action<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<D> fmt::Debug for Action<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<D: TaskData> Action<D> {
    /// Anonymous async action.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Task<D>, Option<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: None,
            func: Arc::new(move |task, data| Box::pin(func(task, data))),
        }
    }

    /// Named async action. The name becomes the task's name.
    pub fn named<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Task<D>, Option<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(func)
        }
    }

    /// Anonymous synchronous action. It runs to completion when invoked.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&Task<D>, Option<D>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(move |task, data| {
                let result = func(&task, data);
                Box::pin(async move { result })
            }),
        }
    }

    /// Named synchronous action.
    pub fn named_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Task<D>, Option<D>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            ..Self::from_fn(func)
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn invoke(&self, task: Task<D>, data: Option<D>) -> ActionFuture {
        (self.func)(task, data)
    }
}

/// Data a task runs with.
///
/// The variant decides the run mode once, at the `run` boundary: a `Scalar`
/// is handed to the node's own action, a `Batch` fans out into one parallel
/// branch per item.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<D> {
    Scalar(D),
    Batch(Vec<D>),
}

impl<D> Payload<D> {
    pub fn scalar(value: D) -> Self {
        Payload::Scalar(value)
    }

    pub fn batch(items: impl IntoIterator<Item = D>) -> Self {
        Payload::Batch(items.into_iter().collect())
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Payload::Scalar(_) => "scalar",
            Payload::Batch(_) => "batch",
        }
    }
}
