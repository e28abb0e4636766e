// tests/property/row_index.rs

use std::collections::HashSet;

use proptest::prelude::*;
use traceview::timeline::{build_row_index, BandScale, RowKey};
use traceview::trace::WorkerSummary;

fn worker(worker_id: u32, cores: u32) -> WorkerSummary {
    WorkerSummary {
        worker_id,
        hash: String::new(),
        machine_name: String::new(),
        cores,
        time_connected: 0.0,
        time_disconnected: 1.0,
    }
}

// Distinct worker ids with 1..=8 cores each, in arbitrary order.
fn workers_strategy() -> impl Strategy<Value = Vec<WorkerSummary>> {
    proptest::collection::hash_map(0u32..500, 1u32..=8, 1..20).prop_map(|m| {
        m.into_iter()
            .map(|(id, cores)| worker(id, cores))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn test_every_worker_gets_one_unique_row_per_core(workers in workers_strategy()) {
        let index = build_row_index(&workers).unwrap();

        let total: u32 = workers.iter().map(|w| w.cores).sum();
        prop_assert_eq!(index.len(), total as usize);

        let unique: HashSet<_> = index.keys().iter().copied().collect();
        prop_assert_eq!(unique.len(), index.len());

        for w in &workers {
            let rows = index.worker_rows(w.worker_id).unwrap();
            prop_assert_eq!(rows.cores, w.cores);
            for core in 1..=w.cores {
                let key = RowKey::new(w.worker_id, core);
                prop_assert_eq!(index.slot(key), Some(rows.first + core as usize - 1));
            }
        }
    }

    #[test]
    fn test_bands_stay_in_range_and_do_not_overlap(
        count in 1usize..60,
        height in 10.0f64..2000.0,
        padding in 0.0f64..0.9,
    ) {
        let scale = BandScale::new(count, (height, 0.0), padding);

        for slot in 0..count {
            let top = scale.position(slot).unwrap();
            prop_assert!(top >= -1e-9);
            prop_assert!(top + scale.bandwidth() <= height + 1e-9);
            if slot > 0 {
                let below = scale.position(slot - 1).unwrap();
                prop_assert!(top + scale.bandwidth() <= below + 1e-9);
            }
        }
    }
}
