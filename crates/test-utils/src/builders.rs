#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tasktree::{Action, Task, TaskData};

/// Build a linear chain `root -> n1 -> ... -> n{depth}`.
///
/// Returns every node, root first; the last element is the deepest leaf.
pub fn chain<D: TaskData>(depth: usize) -> Vec<Task<D>> {
    let root = Task::new("root").expect("root name is valid");
    let mut nodes = vec![root];

    for level in 1..=depth {
        let child = Task::new(format!("n{level}")).expect("generated name is valid");
        nodes
            .last()
            .expect("chain is never empty")
            .add_task(&child)
            .expect("fresh child attaches");
        nodes.push(child);
    }

    nodes
}

/// Ordered, shared log of what actions did during a run.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Action that appends `label` (and its data, if any) to this journal.
    pub fn action<D>(&self, label: &str) -> Action<D>
    where
        D: TaskData + std::fmt::Debug,
    {
        let journal = self.clone();
        let label = label.to_string();
        Action::named_fn(label.clone(), move |_, data: Option<D>| {
            match data {
                Some(d) => journal.push(format!("{label}:{d:?}")),
                None => journal.push(label.clone()),
            }
            Ok(())
        })
    }

    /// Like [`Journal::action`], but sleeps `millis * data` first.
    ///
    /// Used to make parallel branches finish in a chosen order.
    pub fn sleepy_action(&self, label: &str, millis: u64) -> Action<u64> {
        let journal = self.clone();
        let label = label.to_string();
        Action::named(label.clone(), move |_, data: Option<u64>| {
            let journal = journal.clone();
            let label = label.clone();
            async move {
                let n = data.unwrap_or(0);
                tokio::time::sleep(std::time::Duration::from_millis(millis * n)).await;
                journal.push(format!("{label}:{n}"));
                Ok::<(), anyhow::Error>(())
            }
        })
    }

    /// Action that always fails with `message`, after journaling `label`.
    pub fn failing_action<D: TaskData>(&self, label: &str, message: &str) -> Action<D> {
        let journal = self.clone();
        let label = label.to_string();
        let message = message.to_string();
        Action::named_fn(label.clone(), move |_, _: Option<D>| {
            journal.push(label.clone());
            Err(anyhow::anyhow!(message.clone()))
        })
    }
}
