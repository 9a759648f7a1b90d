#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tasktree::{EventKind, SubscriptionId, Task, TaskData, TaskEvent};

/// Records every event emitted on one node, in emission order.
pub struct EventRecorder<D> {
    events: Arc<Mutex<Vec<TaskEvent<D>>>>,
    subscriptions: Vec<SubscriptionId>,
}

impl<D: TaskData> EventRecorder<D> {
    /// Subscribe to all event kinds on `task`.
    pub fn attach(task: &Task<D>) -> Self {
        Self::attach_kinds(task, &EventKind::ALL)
    }

    pub fn attach_kinds(task: &Task<D>, kinds: &[EventKind]) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = kinds
            .iter()
            .map(|kind| {
                let sink = Arc::clone(&events);
                task.on(*kind, move |event: &TaskEvent<D>| {
                    sink.lock().unwrap().push(event.clone());
                })
            })
            .collect();

        Self {
            events,
            subscriptions,
        }
    }

    pub fn events(&self) -> Vec<TaskEvent<D>> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(TaskEvent::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Unsubscribe from `task`. Returns how many subscriptions were removed.
    pub fn detach(&mut self, task: &Task<D>) -> usize {
        self.subscriptions
            .drain(..)
            .filter(|id| task.off(*id))
            .count()
    }
}
