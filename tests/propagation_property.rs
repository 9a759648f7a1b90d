// tests/propagation_property.rs

mod common;

use proptest::prelude::*;
use tasktree::{EventKind, TaskError};

use common::{chain, EventRecorder};

proptest! {
    #[test]
    fn leaf_change_cascades_exactly_once_per_ancestor(
        depth in 0usize..12,
        status in "[a-z ]{0,16}",
    ) {
        let nodes = chain::<u32>(depth);
        let recorders: Vec<_> = nodes.iter().map(EventRecorder::attach).collect();

        nodes[depth].set_status(status.clone());

        let total_child_updates: usize = recorders
            .iter()
            .map(|r| r.count(EventKind::ChildUpdated))
            .sum();
        let total_tree_updates: usize = recorders
            .iter()
            .map(|r| r.count(EventKind::TreeUpdated))
            .sum();

        prop_assert_eq!(total_child_updates, depth);
        prop_assert_eq!(total_tree_updates, 1);
        prop_assert_eq!(recorders[0].count(EventKind::TreeUpdated), 1);
        prop_assert_eq!(recorders[depth].count(EventKind::Status), 1);
        prop_assert_eq!(nodes[depth].status(), status);
    }

    #[test]
    fn progress_outside_unit_interval_is_rejected(value in any::<f64>()) {
        let nodes = chain::<u32>(1);
        let leaf = &nodes[1];
        let rec = EventRecorder::attach(&nodes[0]);

        let result = leaf.update_progress(value);

        if (0.0..=1.0).contains(&value) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(leaf.progress(), value);
            prop_assert_eq!(rec.count(EventKind::TreeUpdated), 1);
        } else {
            prop_assert!(matches!(result, Err(TaskError::InvalidArgument(_))));
            prop_assert_eq!(leaf.progress(), 0.0);
            prop_assert!(rec.events().is_empty());
        }
    }
}
