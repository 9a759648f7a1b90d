// src/events/propagate.rs

//! Mutators and the upward cascade.
//!
//! Each mutator applies the change under the node lock, releases it, emits
//! the node-scoped event, then walks the ancestor chain: every ancestor emits
//! `ChildUpdated` (carrying the node that changed), and the topmost node
//! emits a payload-free `TreeUpdated`. Observers always run with no engine
//! lock held, so they may freely read the tree or export a snapshot.

use std::sync::{Arc, PoisonError};

use tracing::{debug, trace};

use crate::errors::{Result, TaskError};
use crate::events::{EventKind, SubscriptionId, TaskChange, TaskEvent};
use crate::tree::{Task, TaskData, TaskState};

impl<D: TaskData> Task<D> {
    /// Subscribe to one kind of event on this node.
    pub fn on<F>(&self, kind: EventKind, observer: F) -> SubscriptionId
    where
        F: Fn(&TaskEvent<D>) + Send + Sync + 'static,
    {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribe(kind, Arc::new(observer))
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsubscribe(id)
    }

    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count(kind)
    }

    /// Set progress in `[0, 1]`. Anything else (including NaN) is rejected
    /// without touching the node.
    pub fn update_progress(&self, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(TaskError::InvalidArgument(format!(
                "progress must be a number in [0, 1], got {value}"
            )));
        }
        self.write_progress(value);
        Ok(())
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.fields().status = status.clone();
        debug!(task = %self.name(), id = %self.id(), status = %status, "status updated");
        self.notify(TaskChange::Status(status));
    }

    /// Move the node to `next`, rejecting illegal transitions (see
    /// [`TaskState::transition`]).
    pub fn set_state(&self, next: TaskState) -> Result<()> {
        let from = {
            let mut fields = self.fields();
            let from = fields.state;
            match from.transition(next) {
                Some(state) => fields.state = state,
                None => {
                    return Err(TaskError::InvalidTransition {
                        task: self.name().to_string(),
                        from,
                        to: next,
                    });
                }
            }
            from
        };
        debug!(task = %self.name(), id = %self.id(), %from, to = %next, "state updated");
        self.notify(TaskChange::State(next));
        Ok(())
    }

    /// Unchecked progress write for engine-computed fractions.
    pub(crate) fn write_progress(&self, value: f64) {
        self.fields().progress = value;
        debug!(task = %self.name(), id = %self.id(), progress = value, "progress updated");
        self.notify(TaskChange::Progress(value));
    }

    pub(crate) fn record_error(&self, error: Arc<anyhow::Error>) {
        self.fields().error = Some(error);
    }

    /// Emit the local event for `change`, then cascade upward.
    pub(crate) fn notify(&self, change: TaskChange) {
        self.emit(&TaskEvent::from(change.clone()));
        self.propagate(change);
    }

    fn propagate(&self, change: TaskChange) {
        let mut current = self.clone();
        loop {
            if current.is_root() {
                current.emit(&TaskEvent::TreeUpdated);
                return;
            }
            let Some(parent) = current.parent() else {
                trace!(task = %current.name(), "parent dropped; propagation stops");
                return;
            };
            parent.emit(&TaskEvent::ChildUpdated {
                child: self.clone(),
                change: change.clone(),
            });
            current = parent;
        }
    }

    pub(crate) fn emit(&self, event: &TaskEvent<D>) {
        let observers = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observers_for(event.kind());
        for observer in observers {
            observer(event);
        }
    }
}
