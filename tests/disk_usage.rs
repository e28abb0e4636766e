// tests/disk_usage.rs

mod common;

use std::collections::HashMap;

use common::builders::{chain_dataset, disk_sample, worker, ConfigFileBuilder, DatasetBuilder};
use traceview::engine::{CoreCommand, LoadedTrace, ViewCommand, ViewerCore, ViewerEvent};
use traceview::timeline::{layout_disk_usage, DiskOptions};
use traceview::trace::TraceDataset;
use traceview::types::DiskUnit;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// 100 s trace starting at 10. Worker 1 peaks at 80 MB, worker 2 at 40 MB.
fn disk_dataset(trace_id: &str) -> TraceDataset {
    DatasetBuilder::new(trace_id)
        .bounds(10.0, 110.0)
        .worker(worker(1, 1, 10.0, 110.0))
        .worker(worker(2, 1, 10.0, 110.0))
        .disk(disk_sample(2, "x", 60.0, -40.0, 0.0))
        .disk(disk_sample(1, "b", 40.0, 30.0, 80.0))
        .disk(disk_sample(2, "x", 20.0, 40.0, 40.0))
        .disk(disk_sample(1, "a", 30.0, 50.0, 50.0))
        .disk(disk_sample(1, "a", 90.0, -50.0, 30.0))
        .build()
}

fn options(unit: DiskUnit, highlight: Option<u32>) -> DiskOptions {
    DiskOptions { unit, highlight }
}

#[test]
fn test_one_line_per_worker_in_time_order() {
    let ds = disk_dataset("disk");
    let cfg = ConfigFileBuilder::new().with_size(1000.0, 300.0).with_disk_height(200.0).build();

    let layout = layout_disk_usage(&ds, cfg.timeline(), DiskOptions::default());

    assert_eq!(layout.unit, DiskUnit::Megabytes);
    assert_eq!(layout.series.len(), 2);
    assert_eq!(layout.series[0].worker_id, 1);
    assert_eq!(layout.series[1].worker_id, 2);

    let w1 = &layout.series[0];
    let times: Vec<f64> = w1.points.iter().map(|p| p.time).collect();
    assert_eq!(times, vec![20.0, 30.0, 80.0]);
    // 10px per second; 80 MB peak maps to y = 0 on a 200px chart.
    assert!(close(w1.points[0].x, 200.0));
    assert!(close(w1.points[0].y, 75.0));
    assert!(close(w1.points[1].y, 0.0));
    assert!(close(layout.series[1].points[1].y, 200.0));
    assert_eq!(layout.y_ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    assert_eq!(layout.x_ticks, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn test_percent_unit_scales_to_percent_peak() {
    let ds = disk_dataset("disk");
    let cfg = ConfigFileBuilder::new().with_size(1000.0, 300.0).with_disk_height(200.0).build();

    let layout = layout_disk_usage(&ds, cfg.timeline(), options(DiskUnit::Percent, None));

    assert_eq!(layout.y_scale.domain(), (0.0, 0.8));
    let first = layout.series[0].points[0];
    assert!(close(first.usage, 0.5));
    assert!(close(first.y, 75.0));
}

#[test]
fn test_highlighted_worker_is_drawn_last_and_others_muted() {
    let ds = disk_dataset("disk");
    let cfg = ConfigFileBuilder::new().build();

    let layout = layout_disk_usage(&ds, cfg.timeline(), options(DiskUnit::Megabytes, Some(1)));

    assert_eq!(layout.highlight, Some(1));
    let order: Vec<u32> = layout.series.iter().map(|s| s.worker_id).collect();
    assert_eq!(order, vec![2, 1]);
    assert_eq!(layout.series[1].stroke, "orange");
    assert_eq!(layout.series[1].stroke_width, 2.0);
    assert_eq!(layout.series[0].stroke, "lightgray");
}

#[test]
fn test_unknown_highlight_falls_back_to_palette() {
    let ds = disk_dataset("disk");
    let cfg = ConfigFileBuilder::new().build();

    let layout = layout_disk_usage(&ds, cfg.timeline(), options(DiskUnit::Megabytes, Some(9)));

    assert_eq!(layout.highlight, None);
    assert_eq!(layout.series[0].stroke, "#ff7f0e");
    assert_eq!(layout.series[1].stroke, "#2ca02c");
    assert!(layout.series.iter().all(|s| s.stroke_width == 0.8));
}

#[test]
fn test_trace_without_samples_has_no_lines() {
    let ds = chain_dataset("chain");
    let cfg = ConfigFileBuilder::new().build();

    let layout = layout_disk_usage(&ds, cfg.timeline(), DiskOptions::default());

    assert!(layout.series.is_empty());
}

fn load(core: &mut ViewerCore, dataset: TraceDataset) -> Vec<&'static str> {
    let trace_id = dataset.trace_id().to_string();
    let requested = core.step(ViewerEvent::TraceRequested {
        trace_id: trace_id.clone(),
    });
    let seq = match requested.commands.as_slice() {
        [CoreCommand::StartLoad(ticket)] => ticket.seq,
        other => panic!("Expected a single StartLoad, got: {:?}", other),
    };
    let step = core.step(ViewerEvent::TraceLoaded {
        seq,
        trace_id,
        result: Ok(LoadedTrace {
            dataset,
            svgs: HashMap::new(),
        }),
    });
    step.view_commands()
        .map(|c| match c {
            ViewCommand::DrawTimeline(_) => "draw_timeline",
            ViewCommand::DrawDiskUsage(_) => "draw_disk_usage",
            ViewCommand::TraceReady { .. } => "trace_ready",
            _ => "other",
        })
        .collect()
}

#[test]
fn test_core_draws_and_redraws_disk_usage() {
    let mut core = ViewerCore::new(ConfigFileBuilder::new().build());

    assert_eq!(
        load(&mut core, disk_dataset("disk")),
        vec!["draw_timeline", "draw_disk_usage", "trace_ready"]
    );

    let step = core.step(ViewerEvent::DiskUsageChanged {
        unit: DiskUnit::Percent,
        highlight: Some(2),
    });
    match step.view_commands().collect::<Vec<_>>().as_slice() {
        [ViewCommand::DrawDiskUsage(layout)] => {
            assert_eq!(layout.unit, DiskUnit::Percent);
            assert_eq!(layout.highlight, Some(2));
        }
        other => panic!("Expected one DrawDiskUsage, got: {:?}", other),
    }
    assert_eq!(core.disk_options(), options(DiskUnit::Percent, Some(2)));

    let again = core.step(ViewerEvent::DiskUsageChanged {
        unit: DiskUnit::Percent,
        highlight: Some(2),
    });
    assert!(again.commands.is_empty());
}

#[test]
fn test_disk_options_reset_on_new_trace() {
    let mut core = ViewerCore::new(ConfigFileBuilder::new().build());
    load(&mut core, disk_dataset("a"));
    core.step(ViewerEvent::DiskUsageChanged {
        unit: DiskUnit::Percent,
        highlight: Some(1),
    });

    load(&mut core, chain_dataset("b"));

    assert_eq!(core.disk_options(), DiskOptions::default());
    let step = core.step(ViewerEvent::DiskUsageChanged {
        unit: DiskUnit::Percent,
        highlight: None,
    });
    assert!(step.commands.is_empty());
}
