// tests/integration/csv_loader.rs

use std::sync::Arc;

use crate::common::fixtures::{
    add_chain_svg, add_chain_trace, add_disk_usage, log_dir, task_done_without_graph_column,
    GRAPH_INFO, LOG_SUBDIR, WORKER_SUMMARY,
};
use traceview::errors::TraceviewError;
use traceview::fs::mock::MockFileSystem;
use traceview::trace::loader::{parse_nested_py_list, parse_py_list};
use traceview::trace::{CsvTraceLoader, TraceLoader};

fn loader(fs: &MockFileSystem) -> CsvTraceLoader {
    CsvTraceLoader::new(Arc::new(fs.clone()), "logs", LOG_SUBDIR)
}

#[test]
fn test_list_traces_only_returns_directories_with_logs() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-2", true);
    add_chain_trace(&fs, "logs", "run-1", true);
    fs.add_file("logs/notes/readme.txt", "not a trace");

    let traces = loader(&fs).list_traces().unwrap();

    assert_eq!(traces, vec!["run-1", "run-2"]);
}

#[test]
fn test_load_reads_every_table() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);

    let ds = loader(&fs).load("run-1").unwrap();

    assert_eq!(ds.trace_id(), "run-1");
    assert_eq!((ds.trace_start(), ds.trace_end()), (0.0, 100.0));
    assert_eq!(ds.tasks().len(), 3);
    assert_eq!(ds.workers().len(), 2);

    let t3 = ds.task(3).unwrap();
    assert_eq!((t3.worker_id, t3.core_id), (2, 1));
    assert_eq!(t3.input_files, vec!["fileB"]);
    assert!(t3.output_files.is_empty());
    assert_eq!(t3.critical_input_file.as_deref(), Some("fileB"));
    assert!(t3.is_recovery_task);
    assert_eq!(ds.task(1).unwrap().critical_input_file, None);

    // The attempt that never reached a worker is skipped.
    assert_eq!(ds.failed_attempts().len(), 1);
    assert_eq!(ds.failed_attempts()[0].task_id, 4);

    let file_b = ds.file("fileB").unwrap();
    assert_eq!(file_b.producers, vec![2]);
    let holders: Vec<u32> = file_b.worker_holding.iter().map(|h| h.worker_id).collect();
    assert_eq!(holders, vec![1, 2]);

    let graph = ds.graph(1).unwrap();
    assert_eq!(graph.critical_tasks, vec![1, 2, 3]);
    assert_eq!(graph.time_critical_edges, vec![3.0, 3.0]);
    assert_eq!(graph.time_critical_path, 27.0);
}

#[test]
fn test_missing_graph_table_is_derived_from_files() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "old", false);

    let ds = loader(&fs).load("old").unwrap();

    assert_eq!(ds.graph_ids(), vec![1]);
    let graph = ds.graph(1).unwrap();
    assert_eq!(graph.critical_tasks, vec![1, 2, 3]);
    assert_eq!(graph.time_critical_path, 27.0);
    assert!(ds.tasks().iter().all(|t| t.graph_id == Some(1)));
}

#[test]
fn test_graph_table_without_task_graph_column_assigns_ids() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);
    let dir = log_dir("logs", "run-1");
    fs.add_file(dir.join("task_done.csv"), task_done_without_graph_column());

    let ds = loader(&fs).load("run-1").unwrap();

    assert_eq!(ds.graph_ids(), vec![1]);
    assert_eq!(ds.graph(1).unwrap().time_critical_path, 27.0);
    assert!(ds.tasks().iter().all(|t| t.graph_id == Some(1)));
    assert_eq!(ds.tasks_in_graph(1).count(), 3);
}

#[test]
fn test_assigned_graph_id_follows_the_table_critical_tasks() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);
    let dir = log_dir("logs", "run-1");
    fs.add_file(dir.join("task_done.csv"), task_done_without_graph_column());
    fs.add_file(
        dir.join("general_statistics_dag.csv"),
        GRAPH_INFO.replace("\n1,3,", "\n4,3,"),
    );

    let ds = loader(&fs).load("run-1").unwrap();

    assert_eq!(ds.graph_ids(), vec![4]);
    assert!(ds.tasks().iter().all(|t| t.graph_id == Some(4)));
}

#[test]
fn test_disk_usage_table_is_optional_and_sorted() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);
    let l = loader(&fs);
    assert!(l.load("run-1").unwrap().disk_usage().is_empty());

    add_disk_usage(&fs, "logs", "run-1");
    let ds = l.load("run-1").unwrap();

    let steps: Vec<(u32, f64, f64)> = ds
        .disk_usage()
        .iter()
        .map(|s| (s.worker_id, s.time, s.disk_usage_mb))
        .collect();
    assert_eq!(
        steps,
        vec![(1, 7.0, 1.5), (1, 17.0, 3.5), (1, 30.0, 2.0), (2, 19.0, 2.0)]
    );
    let last = &ds.disk_usage()[2];
    assert_eq!(last.filename, "fileA");
    assert_eq!(last.size_mb, -1.5);
    assert_eq!(last.disk_usage_pct, 0.002);
}

#[test]
fn test_unknown_trace_returns_trace_not_found() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);

    match loader(&fs).load("run-9") {
        Err(TraceviewError::TraceNotFound(id)) => assert_eq!(id, "run-9"),
        Err(e) => panic!("Expected TraceNotFound, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_fractional_id_is_an_integrity_error() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);
    let bad_workers = WORKER_SUMMARY.replace("2,def456", "2.5,def456");
    fs.add_file(log_dir("logs", "run-1").join("worker_summary.csv"), bad_workers);

    match loader(&fs).load("run-1") {
        Err(TraceviewError::TraceIntegrity(msg)) => assert!(msg.contains("worker_id")),
        Err(e) => panic!("Expected TraceIntegrity, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_required_table_fails_the_load() {
    let fs = MockFileSystem::new();
    fs.add_file(log_dir("logs", "run-1").join("worker_summary.csv"), WORKER_SUMMARY);

    assert!(loader(&fs).load("run-1").is_err());
}

#[test]
fn test_graph_svg_is_optional() {
    let fs = MockFileSystem::new();
    add_chain_trace(&fs, "logs", "run-1", true);
    let l = loader(&fs);

    assert_eq!(l.load_graph_svg("run-1", 1).unwrap(), None);

    add_chain_svg(&fs, "logs", "run-1");
    let svg = l.load_graph_svg("run-1", 1).unwrap().unwrap();
    assert!(svg.contains("class=\"node\""));
}

#[test]
fn test_python_list_literals() {
    assert_eq!(parse_py_list("['a.txt', \"b.txt\"]"), vec!["a.txt", "b.txt"]);
    assert!(parse_py_list("[]").is_empty());
    assert!(parse_py_list("").is_empty());
    assert_eq!(parse_py_list("[1, 2.0]"), vec!["1", "2.0"]);

    // Quoted items keep their commas, quotes of the other kind and spaces.
    assert_eq!(
        parse_py_list(r#"['a,b.txt', "it's.txt", ' padded ']"#),
        vec!["a,b.txt", "it's.txt", " padded "]
    );
    assert_eq!(parse_py_list(r"['x\'y', 'z']"), vec!["x'y", "z"]);

    assert_eq!(
        parse_nested_py_list("[[1, 0.5, 2.0, 1.5], [2, 3.0, 4.0, 1.0]]"),
        vec![
            vec!["1", "0.5", "2.0", "1.5"],
            vec!["2", "3.0", "4.0", "1.0"]
        ]
    );
}
