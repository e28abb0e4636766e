// tests/cli_script.rs

use clap::Parser;
use traceview::cli::CliArgs;
use traceview::engine::ViewerEvent;
use traceview::script_from_args;

fn script(args: &[&str]) -> Vec<&'static str> {
    let args = CliArgs::try_parse_from(std::iter::once("traceview").chain(args.iter().copied()))
        .unwrap();
    script_from_args(&args).iter().map(ViewerEvent::name).collect()
}

#[test]
fn test_script_follows_user_order() {
    assert_eq!(
        script(&["--dag", "2", "--critical-path", "--analyze-task", "5"]),
        vec!["dag_selected", "critical_path_toggled", "task_analyzed"]
    );
}

#[test]
fn test_empty_script_without_dag_flags() {
    assert!(script(&["--trace", "run-1"]).is_empty());
}

#[test]
fn test_critical_path_requires_dag() {
    assert!(CliArgs::try_parse_from(["traceview", "--critical-path"]).is_err());
}

#[test]
fn test_disk_flags_add_one_redraw() {
    assert_eq!(
        script(&["--disk-unit", "percent", "--disk-worker", "3"]),
        vec!["disk_usage_changed"]
    );
    assert!(CliArgs::try_parse_from(["traceview", "--disk-unit", "gb"]).is_err());
}
