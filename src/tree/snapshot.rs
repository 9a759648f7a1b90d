// src/tree/snapshot.rs

//! Plain-data export of a live task tree.

use serde::{Deserialize, Serialize};

use crate::tree::ids::TaskId;
use crate::tree::state::TaskState;
use crate::tree::{Task, TaskData};

/// Owned, acyclic copy of a node's observable fields and those of its
/// descendants. Later changes to the tree never show up in an existing
/// snapshot.
///
/// `children` is present only when the node has children; `parallel` only
/// when the node has been run with batch data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub name: String,
    pub state: TaskState,
    pub status: String,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TaskSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<Vec<TaskSnapshot>>,
}

impl TaskSnapshot {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn count(&self) -> usize {
        1 + self.nested().map(TaskSnapshot::count).sum::<usize>()
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &TaskId) -> Option<&TaskSnapshot> {
        if &self.id == id {
            return Some(self);
        }
        self.nested().find_map(|s| s.find(id))
    }

    fn nested(&self) -> impl Iterator<Item = &TaskSnapshot> {
        self.children
            .iter()
            .flatten()
            .chain(self.parallel.iter().flatten())
    }
}

impl<D: TaskData> Task<D> {
    /// Rebuild a snapshot of this node and everything below it.
    pub fn export_snapshot(&self) -> TaskSnapshot {
        let (state, status, progress, children, parallel) = {
            let fields = self.fields();
            (
                fields.state,
                fields.status.clone(),
                fields.progress,
                fields.children.clone(),
                fields.parallel.clone(),
            )
        };

        TaskSnapshot {
            id: self.id().clone(),
            name: self.name().to_string(),
            state,
            status,
            progress,
            children: if children.is_empty() {
                None
            } else {
                Some(children.iter().map(Task::export_snapshot).collect())
            },
            parallel: parallel.map(|branches| branches.iter().map(Task::export_snapshot).collect()),
        }
    }
}
