// src/engine/fanout.rs

//! Batch mode: one parallel branch per data item.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::tree::{Task, TaskData, TaskState};

impl<D: TaskData> Task<D> {
    /// Spawn a branch per item, settle them in completion order, and fold
    /// the outcomes into this node's progress, status and state.
    ///
    /// Branch failures are recorded (on the branch and here) but never
    /// returned: this always resolves once every branch has settled.
    pub(crate) async fn fan_out(&self, items: Vec<D>) {
        let total = items.len();
        let branches: Vec<Task<D>> = items.into_iter().map(|item| self.make_branch(item)).collect();
        self.fields().parallel = Some(branches.clone());

        info!(task = %self.name(), id = %self.id(), total, "fanning out over batch");

        if total == 0 {
            self.write_progress(1.0);
            self.set_status("0/0 tasks completed.");
            self.settle(TaskState::Completed);
            return;
        }

        let mut set = JoinSet::new();
        let mut spawned = HashMap::with_capacity(total);
        for (index, branch) in branches.iter().enumerate() {
            let branch = branch.clone();
            let handle = set.spawn(async move { branch.run().await });
            spawned.insert(handle.id(), index);
        }

        let mut completed = 0usize;
        let mut failures: Vec<Arc<anyhow::Error>> = Vec::new();

        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_, Ok(()))) => {
                    completed += 1;
                    debug!(task = %self.name(), completed, total, "branch completed");
                    self.write_progress(completed as f64 / total as f64);
                    self.set_status(format!("{completed}/{total} tasks completed."));
                    if completed == total {
                        self.settle(TaskState::Completed);
                    }
                }
                Ok((_, Err(err))) => {
                    warn!(task = %self.name(), error = %err, "branch failed");
                    let err = err
                        .action_error()
                        .cloned()
                        .unwrap_or_else(|| Arc::new(anyhow::Error::new(err)));
                    failures.push(err);
                }
                Err(join_err) => {
                    // The branch's action panicked before it could record
                    // anything, so record the failure on the branch here.
                    let err = Arc::new(anyhow!("branch panicked: {join_err}"));
                    warn!(task = %self.name(), error = %err, "branch aborted");
                    if let Some(branch) = spawned.get(&join_err.id()).and_then(|&i| branches.get(i)) {
                        branch.fail(Arc::clone(&err));
                    }
                    failures.push(err);
                }
            }
        }

        if let Some(first) = failures.first() {
            let failed = failures.len();
            self.record_error(Arc::clone(first));
            self.settle(TaskState::Failed);
            self.set_status(format!("{failed}/{total} tasks failed, the rest completed."));
            info!(task = %self.name(), failed, total, "batch finished with failures");
        } else {
            info!(task = %self.name(), total, "batch completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::exec::{Action, Payload};

    fn collecting(log: &Arc<Mutex<Vec<u64>>>) -> Action<u64> {
        let log = Arc::clone(log);
        Action::new(move |_, data| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().extend(data);
                Ok::<(), anyhow::Error>(())
            }
        })
    }

    #[tokio::test]
    async fn batch_completes_every_branch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = Task::new(collecting(&log)).unwrap();

        task.run_with(Payload::batch([1, 2, 3])).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.progress(), 1.0);
        assert_eq!(task.status(), "3/3 tasks completed.");

        let branches = task.parallel_branches().unwrap();
        assert_eq!(branches.len(), 3);
        for branch in &branches {
            assert_eq!(branch.parent().unwrap(), task);
            assert_eq!(branch.state(), TaskState::Completed);
            assert_eq!(branch.name(), task.name());
        }
        assert!(task.children().is_empty());
    }

    #[tokio::test]
    async fn batch_settles_in_completion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let task = Task::new(Action::<u64>::new(move |_, data| {
            let log = Arc::clone(&l);
            async move {
                let ms = data.unwrap_or_default();
                tokio::time::sleep(Duration::from_millis(ms)).await;
                log.lock().unwrap().push(ms);
                Ok::<(), anyhow::Error>(())
            }
        }))
        .unwrap();

        task.run_with(Payload::batch([30, 10, 20])).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn partial_failure_is_absorbed() {
        let task = Task::new(Action::<u64>::new(|_, data| async move {
            match data {
                Some(2) => Err(anyhow!("two is bad")),
                _ => Ok(()),
            }
        }))
        .unwrap();

        task.run_with(Payload::batch([1, 2, 3])).await.unwrap();

        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(task.status(), "1/3 tasks failed, the rest completed.");
        assert!((task.progress() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(task.error().unwrap().to_string(), "two is bad");

        let states: Vec<_> = task
            .parallel_branches()
            .unwrap()
            .iter()
            .map(Task::state)
            .collect();
        assert_eq!(
            states,
            vec![TaskState::Completed, TaskState::Failed, TaskState::Completed]
        );
    }

    #[tokio::test]
    async fn panicking_branch_counts_as_failure() {
        let task = Task::new(Action::<u64>::from_fn(|_, data| {
            if data == Some(1) {
                panic!("kaboom");
            }
            Ok(())
        }))
        .unwrap();

        task.run_with(Payload::batch([0, 1])).await.unwrap();

        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(task.status(), "1/2 tasks failed, the rest completed.");
        let branches = task.parallel_branches().unwrap();
        assert_eq!(branches[1].state(), TaskState::Failed);
        assert!(branches[1].error().is_some());
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let task = Task::new(Action::<u64>::from_fn(|_, _| Ok(()))).unwrap();
        task.run_with(Payload::batch([])).await.unwrap();

        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.progress(), 1.0);
        assert_eq!(task.status(), "0/0 tasks completed.");
        assert_eq!(task.parallel_branches().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn children_wait_for_all_branches() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let task = Task::new(Action::<u64>::new(move |_, data| {
            let log = Arc::clone(&l);
            async move {
                let ms = data.unwrap_or_default();
                tokio::time::sleep(Duration::from_millis(ms)).await;
                log.lock().unwrap().push(ms);
                Ok::<(), anyhow::Error>(())
            }
        }))
        .unwrap();
        let l = Arc::clone(&log);
        task.add(Action::<u64>::from_fn(move |_, _| {
            l.lock().unwrap().push(0);
            Ok(())
        }))
        .unwrap();

        task.run_with(Payload::batch([20, 5])).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![5, 20, 0]);
    }

    #[tokio::test]
    async fn batch_without_action_skips_fan_out() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task: Task<u64> = Task::new("group").unwrap();
        task.add(collecting(&log)).unwrap();

        task.run_with(Payload::batch([1, 2, 3])).await.unwrap();

        assert!(task.parallel_branches().is_none());
        assert_eq!(task.state(), TaskState::Declared);
        assert_eq!(task.status(), "");
        assert_eq!(task.progress(), 0.0);
        // The child has no bound data and runs once, without any.
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(task.children()[0].state(), TaskState::Completed);
    }
}
