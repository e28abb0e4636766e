// tests/timeline_layout.rs

mod common;

use common::builders::{
    chain_dataset, failed_attempt, lifecycle_from, worker, ConfigFileBuilder, DatasetBuilder,
    TaskBuilder,
};
use common::init_tracing;
use traceview::errors::{DiagnosticKind, TraceviewError};
use traceview::timeline::{
    build_row_index, layout_critical_strip, layout_failed_interval, layout_task_interval,
    layout_trace, layout_worker_band, quarter_ticks, row_to_y, time_to_x, worker_ticks, BandScale,
    HoverState, IntervalKind, PhaseOptions, RecordRef, RowKey, TimelineGeometry,
};
use traceview::types::WorkerOrder;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Chain trace on a 1000x300 canvas without row padding: one second is
/// 10px, every row is 100px high and slots sit at y = 200, 100, 0.
fn chain_geometry() -> TimelineGeometry {
    let ds = chain_dataset("chain");
    let rows = build_row_index(ds.workers()).unwrap();
    TimelineGeometry::new(rows, ds.trace_start(), ds.duration(), 1000.0, 300.0, 0.0)
}

fn task_record(task_id: u64) -> RecordRef {
    RecordRef::Task { task_id, try_id: 1 }
}

#[test]
fn test_row_index_allocates_contiguous_slots_per_worker() {
    let rows = build_row_index(&[worker(1, 2, 0.0, 10.0), worker(2, 1, 0.0, 10.0)]).unwrap();

    assert_eq!(
        rows.keys(),
        &[RowKey::new(1, 1), RowKey::new(1, 2), RowKey::new(2, 1)]
    );
    assert_eq!(rows.slot(RowKey::new(2, 1)), Some(2));
    assert_eq!(rows.worker_rows(1).map(|w| (w.first, w.last())), Some((0, 1)));
    assert_eq!(rows.slot(RowKey::new(2, 2)), None);
}

#[test]
fn test_repeated_worker_shares_rows_of_first_entry() {
    let rows = build_row_index(&[
        worker(1, 2, 0.0, 10.0),
        worker(2, 1, 0.0, 10.0),
        worker(1, 1, 20.0, 30.0),
    ])
    .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows.workers().len(), 2);
}

#[test]
fn test_repeated_worker_with_more_cores_is_config_error() {
    let result = build_row_index(&[worker(1, 1, 0.0, 10.0), worker(1, 4, 20.0, 30.0)]);

    match result {
        Err(TraceviewError::ConfigError(msg)) => {
            assert!(msg.contains("worker 1"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_cores_and_no_workers_are_config_errors() {
    match build_row_index(&[worker(3, 0, 0.0, 10.0)]) {
        Err(TraceviewError::ConfigError(msg)) => assert!(msg.contains("worker 3")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
    match build_row_index(&[]) {
        Err(TraceviewError::ConfigError(_)) => {}
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_band_scale_reversed_range_puts_first_slot_at_bottom() {
    let scale = BandScale::new(3, (300.0, 0.0), 0.0);

    assert!(close(scale.bandwidth(), 100.0));
    assert_eq!(scale.position(0), Some(200.0));
    assert_eq!(scale.position(1), Some(100.0));
    assert_eq!(scale.position(2), Some(0.0));
    assert_eq!(scale.position(3), None);
}

#[test]
fn test_band_scale_padding_is_centred() {
    let scale = BandScale::new(1, (0.0, 100.0), 0.1);
    let top = scale.position(0).unwrap();

    // Outer padding is split evenly above and below the single band.
    assert!(close(top * 2.0 + scale.bandwidth(), 100.0));
    assert!(top > 0.0);
}

#[test]
fn test_row_to_y_uses_default_padding_and_reports_missing_rows() {
    let rows = build_row_index(&[worker(1, 1, 0.0, 10.0)]).unwrap();

    let y = row_to_y(RowKey::new(1, 1), &rows, (100.0, 0.0)).unwrap();
    let expected = BandScale::new(1, (100.0, 0.0), 0.1).position(0).unwrap();
    assert!(close(y, expected));

    match row_to_y(RowKey::new(7, 2), &rows, (100.0, 0.0)) {
        Err(TraceviewError::MissingRow {
            worker_id, core_id, ..
        }) => {
            assert_eq!((worker_id, core_id), (7, 2));
        }
        other => panic!("Expected MissingRow, got: {:?}", other),
    }
}

#[test]
fn test_time_to_x_is_linear_and_centres_empty_domain() {
    assert!(close(time_to_x(25.0, (0.0, 100.0), (0.0, 1000.0)), 250.0));
    assert!(close(time_to_x(100.0, (0.0, 100.0), (0.0, 1000.0)), 1000.0));
    assert!(close(time_to_x(5.0, (5.0, 5.0), (0.0, 1000.0)), 500.0));
}

#[test]
fn test_task_interval_emits_queued_and_execution() {
    let geometry = chain_geometry();
    let task = TaskBuilder::new(1).on(1, 1).timed(0.0, 5.0).build();

    let rects = layout_task_interval(&task, &geometry, PhaseOptions::default()).unwrap();

    assert_eq!(rects.len(), 2);
    let queued = &rects[0];
    assert_eq!(queued.kind, IntervalKind::Queued);
    assert!(close(queued.x, 10.0) && close(queued.width, 10.0));
    assert!(close(queued.y, 200.0) && close(queued.height, 100.0));

    let exec = &rects[1];
    assert_eq!(exec.kind, IntervalKind::Executing);
    assert!(close(exec.x, 20.0) && close(exec.width, 50.0));
    assert_eq!(exec.record, task_record(1));
    assert_eq!(exec.row, RowKey::new(1, 1));
}

#[test]
fn test_task_interval_phase_options() {
    let geometry = chain_geometry();
    let task = TaskBuilder::new(2).on(1, 2).timed(10.0, 5.0).build();

    let all = layout_task_interval(
        &task,
        &geometry,
        PhaseOptions {
            show_queued: true,
            show_waiting_retrieval: true,
        },
    )
    .unwrap();
    let kinds: Vec<IntervalKind> = all.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IntervalKind::Queued,
            IntervalKind::Executing,
            IntervalKind::WaitingRetrieval
        ]
    );
    let waiting = &all[2];
    assert!(close(waiting.x, 170.0) && close(waiting.width, 10.0));
    assert!(close(waiting.y, 100.0));

    let exec_only = layout_task_interval(
        &task,
        &geometry,
        PhaseOptions {
            show_queued: false,
            show_waiting_retrieval: false,
        },
    )
    .unwrap();
    assert_eq!(exec_only.len(), 1);
    assert_eq!(exec_only[0].kind, IntervalKind::Executing);
}

#[test]
fn test_recovery_task_uses_recovery_phase() {
    let geometry = chain_geometry();
    let task = TaskBuilder::new(9).on(2, 1).timed(30.0, 2.0).recovery().build();

    let rects = layout_task_interval(&task, &geometry, PhaseOptions::default()).unwrap();

    assert_eq!(rects[1].kind, IntervalKind::RecoveryExecuting);
    assert!(close(rects[1].y, 0.0));
}

#[test]
fn test_task_interval_errors() {
    let geometry = chain_geometry();

    let unplaced = TaskBuilder::new(5).on(9, 1).timed(0.0, 1.0).build();
    match layout_task_interval(&unplaced, &geometry, PhaseOptions::default()) {
        Err(TraceviewError::MissingRow {
            worker_id, record, ..
        }) => {
            assert_eq!(worker_id, 9);
            assert!(record.contains("task 5"));
        }
        other => panic!("Expected MissingRow, got: {:?}", other),
    }

    let mut lifecycle = lifecycle_from(0.0, 5.0);
    lifecycle.time_worker_end = lifecycle.time_worker_start - 1.0;
    let backwards = TaskBuilder::new(6).on(1, 1).lifecycle(lifecycle).build();
    match layout_task_interval(&backwards, &geometry, PhaseOptions::default()) {
        Err(TraceviewError::TraceIntegrity(msg)) => {
            assert!(msg.contains("time_worker_end"));
        }
        other => panic!("Expected TraceIntegrity, got: {:?}", other),
    }
}

#[test]
fn test_worker_band_spans_all_cores_and_connection() {
    let geometry = chain_geometry();

    let band = layout_worker_band(&worker(1, 2, 0.0, 100.0), &geometry).unwrap();
    assert_eq!(band.kind, IntervalKind::Worker);
    assert!(close(band.y, 100.0) && close(band.height, 200.0));
    assert!(close(band.x, 0.0) && close(band.width, 1000.0));

    let band = layout_worker_band(&worker(2, 1, 10.0, 90.0), &geometry).unwrap();
    assert!(close(band.y, 0.0) && close(band.height, 100.0));
    assert!(close(band.x, 100.0) && close(band.width, 800.0));

    match layout_worker_band(&worker(2, 1, 90.0, 10.0), &geometry) {
        Err(TraceviewError::TraceIntegrity(_)) => {}
        other => panic!("Expected TraceIntegrity, got: {:?}", other),
    }
}

#[test]
fn test_failed_interval_occupies_slot_until_next_ready() {
    let geometry = chain_geometry();

    let rect = layout_failed_interval(&failed_attempt(4, 2, 1, 40.0, 45.0), &geometry).unwrap();
    assert_eq!(rect.kind, IntervalKind::Failed);
    assert_eq!(
        rect.record,
        RecordRef::FailedAttempt {
            task_id: 4,
            try_id: 1
        }
    );
    assert!(close(rect.x, 400.0) && close(rect.width, 50.0) && close(rect.y, 0.0));

    match layout_failed_interval(&failed_attempt(4, 2, 1, 45.0, 40.0), &geometry) {
        Err(TraceviewError::TraceIntegrity(_)) => {}
        other => panic!("Expected TraceIntegrity, got: {:?}", other),
    }
}

#[test]
fn test_layout_trace_keeps_good_records_and_reports_bad_ones() {
    init_tracing();

    let mut lifecycle = lifecycle_from(50.0, 5.0);
    lifecycle.when_done = lifecycle.when_ready - 1.0;
    let ds = DatasetBuilder::new("mixed")
        .bounds(0.0, 100.0)
        .worker(worker(1, 2, 0.0, 100.0))
        .task(TaskBuilder::new(1).on(1, 1).timed(0.0, 5.0).build())
        .task(TaskBuilder::new(2).on(1, 2).lifecycle(lifecycle).build())
        .task(TaskBuilder::new(3).on(8, 1).timed(10.0, 5.0).build())
        .task(TaskBuilder::new(4).on(1, 2).timed(20.0, 5.0).build())
        .build();
    let cfg = ConfigFileBuilder::new()
        .with_size(1000.0, 200.0)
        .with_row_padding(0.0)
        .build();

    let layout = layout_trace(&ds, cfg.timeline()).unwrap();

    assert_eq!(layout.worker_bands.len(), 1);
    assert_eq!(layout.task_rects.len(), 4);
    assert_eq!(layout.rects_of(task_record(4)).count(), 2);
    assert_eq!(layout.rects_of(task_record(2)).count(), 0);

    let kinds: Vec<DiagnosticKind> = layout.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::TraceIntegrity, DiagnosticKind::MissingRow]
    );
    assert!(close(layout.bandwidth, 100.0));
    assert_eq!(layout.domain, (0.0, 100.0));
    assert_eq!(layout.x_ticks, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn test_layout_trace_rejects_setup_errors() {
    let ds = DatasetBuilder::new("empty").bounds(0.0, 10.0).build();

    match layout_trace(&ds, ConfigFileBuilder::new().build().timeline()) {
        Err(TraceviewError::ConfigError(_)) => {}
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_layout_trace_worker_order() {
    let ds = DatasetBuilder::new("order")
        .bounds(0.0, 10.0)
        .worker(worker(2, 1, 0.0, 10.0))
        .worker(worker(1, 1, 0.0, 10.0))
        .build();

    let insertion = layout_trace(&ds, ConfigFileBuilder::new().build().timeline()).unwrap();
    assert_eq!(insertion.rows, vec![RowKey::new(2, 1), RowKey::new(1, 1)]);

    let cfg = ConfigFileBuilder::new()
        .with_worker_order(WorkerOrder::WorkerId)
        .build();
    let by_id = layout_trace(&ds, cfg.timeline()).unwrap();
    assert_eq!(by_id.rows, vec![RowKey::new(1, 1), RowKey::new(2, 1)]);
}

#[test]
fn test_worker_ticks_sit_on_top_core_of_each_worker() {
    let geometry = chain_geometry();

    let ticks = worker_ticks(&geometry, 5);

    let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "2"]);
    assert_eq!(ticks[0].row, RowKey::new(1, 2));
    assert!(close(ticks[0].position, 150.0));
    assert!(close(ticks[1].position, 50.0));
}

#[test]
fn test_worker_ticks_are_thinned_from_the_last_worker() {
    let mut builder = DatasetBuilder::new("many").bounds(0.0, 10.0);
    for id in 1..=12 {
        builder = builder.worker(worker(id, 1, 0.0, 10.0));
    }
    let ds = builder.build();
    let rows = build_row_index(ds.workers()).unwrap();
    let geometry = TimelineGeometry::new(rows, 0.0, 10.0, 100.0, 120.0, 0.1);

    let labels: Vec<String> = worker_ticks(&geometry, 5)
        .into_iter()
        .map(|t| t.label)
        .collect();

    assert_eq!(labels, vec!["3", "6", "9", "12"]);
}

#[test]
fn test_quarter_ticks() {
    assert_eq!(quarter_ticks((0.0, 8.0)), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    assert_eq!(quarter_ticks((0.0, 0.0)), vec![0.0; 5]);
}

#[test]
fn test_critical_strip_uses_graph_span() {
    let ds = chain_dataset("chain");

    let strip = layout_critical_strip(&ds, 1, 300.0, 40.0).unwrap();

    assert_eq!(strip.domain, (0.0, 30.0));
    let expected = [(1, 20.0), (2, 120.0), (3, 220.0)];
    assert_eq!(strip.rects.len(), expected.len());
    for (rect, (task_id, x)) in strip.rects.iter().zip(expected) {
        assert_eq!(rect.task_id, task_id);
        assert!(close(rect.x, x), "task {task_id}: x = {}", rect.x);
        assert!(close(rect.width, 50.0));
        assert!(close(rect.height, 40.0));
    }
    assert!(strip.diagnostics.is_empty());
}

#[test]
fn test_critical_strip_errors() {
    let ds = DatasetBuilder::new("partial")
        .bounds(0.0, 50.0)
        .worker(worker(1, 1, 0.0, 50.0))
        .task(TaskBuilder::new(1).graph(1).timed(0.0, 5.0).build())
        .graph(common::builders::graph(1, &[1, 77]))
        .build();

    let strip = layout_critical_strip(&ds, 1, 100.0, 20.0).unwrap();
    assert_eq!(strip.rects.len(), 1);
    assert_eq!(strip.diagnostics.len(), 1);
    assert_eq!(strip.diagnostics[0].kind, DiagnosticKind::TraceIntegrity);

    match layout_critical_strip(&ds, 2, 100.0, 20.0) {
        Err(TraceviewError::GraphNotFound(2)) => {}
        other => panic!("Expected GraphNotFound, got: {:?}", other),
    }
}

#[test]
fn test_hover_highlights_and_restores_every_phase_of_a_record() {
    let ds = chain_dataset("chain");
    let cfg = ConfigFileBuilder::new().build();
    let layout = layout_trace(&ds, cfg.timeline()).unwrap();
    let mut hover = HoverState::default();

    let fills = hover.enter(task_record(1), &layout);
    let pairs: Vec<(IntervalKind, &str)> = fills.iter().map(|f| (f.kind, f.fill.as_str())).collect();
    assert_eq!(
        pairs,
        vec![
            (IntervalKind::Queued, "#72bbb0"),
            (IntervalKind::Executing, "orange")
        ]
    );

    // Same record again: nothing to do.
    assert!(hover.enter(task_record(1), &layout).is_empty());

    // Moving to another record restores the first before highlighting.
    let failed = RecordRef::FailedAttempt {
        task_id: 4,
        try_id: 1,
    };
    let fills = hover.enter(failed, &layout);
    let pairs: Vec<(RecordRef, &str)> = fills.iter().map(|f| (f.record, f.fill.as_str())).collect();
    assert_eq!(
        pairs,
        vec![
            (task_record(1), "lightblue"),
            (task_record(1), "steelblue"),
            (failed, "orange")
        ]
    );

    let fills = hover.leave(&layout);
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].fill, "#ad2c23");
    assert_eq!(hover.hovered(), None);
    assert!(hover.leave(&layout).is_empty());
}
