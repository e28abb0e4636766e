// tests/property/edge_filter.rs

use std::collections::HashSet;

use proptest::prelude::*;
use traceview::dag::{
    filter_critical_edges, highlight_toggle, reconstruct_order, Edge, EdgeKind, HighlightState,
    NodeShapeIndex, ShapeKind,
};

fn edge_strategy() -> impl Strategy<Value = Edge> {
    prop_oneof![
        (0u64..20, 0u64..20)
            .prop_map(|(a, b)| Edge::new(a.to_string(), b.to_string(), EdgeKind::TaskToTask)),
        (0u64..20, 0usize..5)
            .prop_map(|(a, f)| Edge::new(a.to_string(), format!("file{f}"), EdgeKind::TaskToFile)),
    ]
}

proptest! {
    #[test]
    fn test_filtered_edges_touch_only_critical_tasks(
        edges in proptest::collection::vec(edge_strategy(), 0..40),
        critical in proptest::collection::hash_set(0u64..20, 0..10),
    ) {
        let kept = filter_critical_edges(&edges, &critical);

        for edge in &kept {
            prop_assert!(critical.contains(&edge.source_task().unwrap()));
            if let Some(target) = edge.target_task() {
                prop_assert!(critical.contains(&target));
            }
        }
        let expected = edges
            .iter()
            .filter(|e| {
                critical.contains(&e.source_task().unwrap())
                    && e.target_task().is_none_or(|t| critical.contains(&t))
            })
            .count();
        prop_assert_eq!(kept.len(), expected);
    }

    #[test]
    fn test_highlight_round_trip_restores_every_fill(
        fills in proptest::collection::vec(
            prop_oneof![Just("white"), Just("none"), Just("lightgrey"), Just("#ea67a9")],
            20,
        ),
        edges in proptest::collection::vec(edge_strategy(), 0..20),
        critical in proptest::collection::vec(0u64..25, 0..10),
    ) {
        let mut index = NodeShapeIndex::new();
        for (id, fill) in fills.iter().enumerate() {
            index.insert(id.to_string(), ShapeKind::Ellipse, *fill);
        }
        index.insert("file0", ShapeKind::Box, "white");
        let before = index.clone();

        let (on, _) = highlight_toggle(HighlightState::default(), true, &edges, &critical, &mut index, "orange");
        let (off, _) = highlight_toggle(on, false, &[], &[], &mut index, "orange");

        prop_assert!(!off.is_active());
        prop_assert_eq!(index, before);
    }

    #[test]
    fn test_reconstructed_path_follows_critical_order(
        edges in proptest::collection::vec(edge_strategy(), 0..40),
        critical in proptest::collection::vec(0u64..20, 0..10),
    ) {
        let mut distinct = HashSet::new();
        let critical: Vec<u64> = critical.into_iter().filter(|id| distinct.insert(*id)).collect();
        let set: HashSet<u64> = critical.iter().copied().collect();
        let filtered = filter_critical_edges(&edges, &set);

        let ordered = reconstruct_order(&critical, &filtered);

        // Sources appear grouped in the order their ids first occur.
        let mut seen: Vec<u64> = Vec::new();
        for edge in &ordered {
            let source = edge.source_task().unwrap();
            if seen.last() != Some(&source) {
                seen.push(source);
            }
        }
        let expected: Vec<u64> = critical
            .iter()
            .copied()
            .filter(|id| filtered.iter().any(|e| e.source_task() == Some(*id)))
            .collect();
        prop_assert_eq!(seen, expected);
    }
}
