// src/engine/run.rs

//! The `run` algorithm: action phase, then children phase.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{Result, TaskError};
use crate::exec::Payload;
use crate::tree::{Task, TaskData, TaskState};

/// Boxed future returned by [`Task::run`] and [`Task::run_with`].
pub type RunFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

impl<D: TaskData> Task<D> {
    /// Run this node with its bound data (if any), then its children.
    ///
    /// Resolves once the whole subtree has finished. Rejects only when a
    /// scalar action in this subtree failed; batch failures are absorbed
    /// into the batch node's state and status.
    pub fn run(&self) -> RunFuture {
        self.run_inner(None)
    }

    /// Run with explicit data. The data is remembered as the node's bound
    /// data if it had none.
    pub fn run_with(&self, payload: Payload<D>) -> RunFuture {
        self.run_inner(Some(payload))
    }

    fn run_inner(&self, input: Option<Payload<D>>) -> RunFuture {
        let task = self.clone();
        Box::pin(async move { task.execute(input).await })
    }

    async fn execute(&self, input: Option<Payload<D>>) -> Result<()> {
        let payload = self.resolve_payload(input);
        info!(
            task = %self.name(),
            id = %self.id(),
            mode = payload.as_ref().map_or("none", Payload::mode),
            "running task"
        );

        let outcome = match payload {
            Some(Payload::Batch(items)) if self.has_action() => {
                self.fan_out(items).await;
                Ok(())
            }
            Some(Payload::Batch(_)) => {
                debug!(task = %self.name(), "no action; batch data ignored");
                Ok(())
            }
            Some(Payload::Scalar(data)) => self.run_action(Some(data)).await,
            None => self.run_action(None).await,
        };

        // Children run whatever the action phase did; a failing child stops
        // the remaining siblings. This node's own failure is reported first.
        let mut index = 0;
        while let Some(child) = self.child_at(index) {
            if let Err(err) = child.run().await {
                return outcome.and(Err(err));
            }
            index += 1;
        }

        info!(
            task = %self.name(),
            id = %self.id(),
            state = %self.state(),
            "task finished"
        );
        outcome
    }

    /// Explicit data wins; otherwise fall back to bound data.
    fn resolve_payload(&self, input: Option<Payload<D>>) -> Option<Payload<D>> {
        let mut fields = self.fields();
        match input {
            Some(payload) => {
                if fields.bound.is_none() {
                    fields.bound = Some(payload.clone());
                }
                Some(payload)
            }
            None => fields.bound.clone(),
        }
    }

    /// Scalar mode: invoke the action once.
    async fn run_action(&self, data: Option<D>) -> Result<()> {
        let Some(action) = self.inner.action.clone() else {
            debug!(task = %self.name(), "no action; grouping node");
            return Ok(());
        };

        match action.invoke(self.clone(), data).await {
            Ok(()) => {
                self.write_progress(1.0);
                self.settle(TaskState::Completed);
                Ok(())
            }
            Err(err) => {
                let err = Arc::new(err);
                warn!(task = %self.name(), id = %self.id(), error = %err, "task action failed");
                self.fail(Arc::clone(&err));
                Err(TaskError::ActionFailure {
                    task: self.name().to_string(),
                    error: err,
                })
            }
        }
    }

    /// Record a failure on this node: error, fixed status, `Failed` state.
    ///
    /// A node already `Completed` keeps its state and status; only the error
    /// is stored.
    pub(crate) fn fail(&self, err: Arc<anyhow::Error>) {
        self.record_error(err);
        if self.state().transition(TaskState::Failed).is_none() {
            warn!(task = %self.name(), id = %self.id(), "completed task failed on rerun; state kept");
            return;
        }
        let status = self.context().failure_status().to_string();
        self.set_status(status);
        self.settle(TaskState::Failed);
    }

    /// Engine-driven transition. A rejected transition (e.g. re-running a
    /// failed node to success) leaves the state untouched.
    pub(crate) fn settle(&self, next: TaskState) {
        if let Err(err) = self.set_state(next) {
            warn!(task = %self.name(), id = %self.id(), error = %err, "state transition rejected");
        }
    }
}
