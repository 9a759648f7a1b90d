// src/events/mod.rs

//! Per-node change notifications.
//!
//! Every node owns an [`ObserverRegistry`]: observers subscribe to one
//! [`EventKind`] and are called synchronously, in subscription order, when
//! an event of that kind is emitted on the node. There is no global bus;
//! tree-wide observation happens by subscribing to `TreeUpdated` on the root.
//!
//! - [`propagate`] implements emission and the upward cascade.

pub mod propagate;

use std::fmt;
use std::sync::Arc;

use crate::tree::{Task, TaskState};

/// Selector used when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Progress,
    Status,
    State,
    ChildUpdated,
    TreeUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Progress,
        EventKind::Status,
        EventKind::State,
        EventKind::ChildUpdated,
        EventKind::TreeUpdated,
    ];
}

/// A single local mutation, as carried upward to ancestors.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskChange {
    Progress(f64),
    Status(String),
    State(TaskState),
}

/// Event delivered to observers of one node.
#[derive(Debug, Clone)]
pub enum TaskEvent<D> {
    /// This node's progress changed.
    Progress(f64),
    /// This node's status changed.
    Status(String),
    /// This node's state changed.
    State(TaskState),
    /// A descendant of this node mutated. `child` is the node that changed.
    ChildUpdated { child: Task<D>, change: TaskChange },
    /// Emitted on the root only: something in the tree changed.
    TreeUpdated,
}

impl<D> TaskEvent<D> {
    pub fn kind(&self) -> EventKind {
        match self {
            TaskEvent::Progress(_) => EventKind::Progress,
            TaskEvent::Status(_) => EventKind::Status,
            TaskEvent::State(_) => EventKind::State,
            TaskEvent::ChildUpdated { .. } => EventKind::ChildUpdated,
            TaskEvent::TreeUpdated => EventKind::TreeUpdated,
        }
    }
}

impl<D> From<TaskChange> for TaskEvent<D> {
    fn from(change: TaskChange) -> Self {
        match change {
            TaskChange::Progress(v) => TaskEvent::Progress(v),
            TaskChange::Status(s) => TaskEvent::Status(s),
            TaskChange::State(s) => TaskEvent::State(s),
        }
    }
}

pub type Observer<D> = Arc<dyn Fn(&TaskEvent<D>) + Send + Sync>;

/// Handle returned by [`Task::on`]; pass it to [`Task::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription<D> {
    id: SubscriptionId,
    kind: EventKind,
    observer: Observer<D>,
}

/// Observers of a single node, keyed by event kind.
pub struct ObserverRegistry<D> {
    next_id: u64,
    entries: Vec<Subscription<D>>,
}

impl<D> Default for ObserverRegistry<D> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<D> fmt::Debug for ObserverRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("subscriptions", &self.entries.len())
            .finish()
    }
}

impl<D> ObserverRegistry<D> {
    pub fn subscribe(&mut self, kind: EventKind, observer: Observer<D>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscription { id, kind, observer });
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    /// Observers for `kind`, in subscription order.
    ///
    /// Returned as owned handles so the caller can release the registry lock
    /// before dispatching.
    pub fn observers_for(&self, kind: EventKind) -> Vec<Observer<D>> {
        self.entries
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.observer))
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|s| s.kind == kind).count()
    }
}
