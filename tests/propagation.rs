// tests/propagation.rs

mod common;

use tasktree::{Action, EventKind, Payload, Task, TaskChange, TaskEvent, TaskState};

use common::{chain, init_tracing, with_timeout, EventRecorder};

#[test]
fn leaf_change_reaches_every_ancestor_once() {
    init_tracing();
    let nodes = chain::<u32>(4);
    let recorders: Vec<_> = nodes.iter().map(EventRecorder::attach).collect();
    let leaf = nodes.last().unwrap();

    leaf.update_progress(0.4).unwrap();

    let (leaf_rec, ancestors) = recorders.split_last().unwrap();
    assert_eq!(leaf_rec.kinds(), vec![EventKind::Progress]);
    for rec in &ancestors[1..] {
        assert_eq!(rec.kinds(), vec![EventKind::ChildUpdated]);
    }
    assert_eq!(
        ancestors[0].kinds(),
        vec![EventKind::ChildUpdated, EventKind::TreeUpdated]
    );
}

#[test]
fn child_updated_names_the_changed_node() {
    let nodes = chain::<u32>(2);
    let root_rec = EventRecorder::attach_kinds(&nodes[0], &[EventKind::ChildUpdated]);

    nodes[2].set_status("working");

    match root_rec.events().as_slice() {
        [TaskEvent::ChildUpdated { child, change }] => {
            assert!(child.ptr_eq(&nodes[2]));
            assert_eq!(change, &TaskChange::Status("working".to_string()));
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn root_mutation_only_raises_tree_updated_on_itself() {
    let root: Task<u32> = Task::new("root").unwrap();
    root.add("child").unwrap();
    let child_rec = EventRecorder::attach(&root.children()[0]);
    let root_rec = EventRecorder::attach(&root);

    root.set_state(TaskState::Completed).unwrap();

    assert_eq!(
        root_rec.kinds(),
        vec![EventKind::State, EventKind::TreeUpdated]
    );
    assert!(child_rec.events().is_empty());
}

#[test]
fn detached_recorder_stops_receiving() {
    let root: Task<u32> = Task::new("root").unwrap();
    let mut rec = EventRecorder::attach(&root);
    root.set_status("one");
    assert_eq!(rec.count(EventKind::Status), 1);

    assert_eq!(rec.detach(&root), EventKind::ALL.len());
    assert_eq!(root.observer_count(EventKind::Status), 0);

    root.set_status("two");
    assert_eq!(rec.kinds(), vec![EventKind::Status, EventKind::TreeUpdated]);
}

#[tokio::test]
async fn running_a_tree_reports_to_the_root() {
    init_tracing();
    let root: Task<u32> = Task::new("root").unwrap();
    root.add(Action::<u32>::named_fn("a", |_, _| Ok(())))
        .unwrap()
        .add_with(
            Action::<u32>::named_fn("b", |_, _| Ok(())),
            Payload::batch([1, 2]),
        )
        .unwrap();
    let rec = EventRecorder::attach(&root);

    with_timeout(root.run()).await.unwrap();

    // `a`: progress + state. `b`: two branches (progress + state each, each
    // relayed through `b`), then per-branch progress + status on `b` and its
    // final state.
    let child_updates = rec.count(EventKind::ChildUpdated);
    assert_eq!(child_updates, rec.count(EventKind::TreeUpdated));
    assert_eq!(child_updates, 2 + 4 + 4 + 1);

    let changed: Vec<String> = rec
        .events()
        .iter()
        .filter_map(|e| match e {
            TaskEvent::ChildUpdated {
                child,
                change: TaskChange::State(TaskState::Completed),
            } => Some(child.name().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(changed, vec!["a", "b", "b", "b"]);
}

#[test]
fn observers_can_snapshot_during_cascade() {
    let nodes = chain::<u32>(3);
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&seen);
    let root = nodes[0].clone();

    nodes[0].on(EventKind::TreeUpdated, move |_| {
        let snapshot = root.export_snapshot();
        let leaf = &snapshot.children.as_ref().unwrap()[0]
            .children
            .as_ref()
            .unwrap()[0]
            .children
            .as_ref()
            .unwrap()[0];
        sink.lock().unwrap().push(leaf.status.clone());
    });

    nodes[3].set_status("visible");
    assert_eq!(*seen.lock().unwrap(), vec!["visible".to_string()]);
}
