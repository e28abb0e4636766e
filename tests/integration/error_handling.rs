// tests/integration/error_handling.rs

use std::io::Write;

use tempfile::{NamedTempFile, TempDir};
use traceview::config::{load_and_validate, load_or_default};
use traceview::errors::TraceviewError;
use traceview::types::{GraphForm, WorkerOrder};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_is_read() {
    let file = config_file(
        r#"
[trace]
root = "/data/traces"
log_subdir = "logs"

[timeline]
width = 800.0
height = 400.0
row_padding = 0.2
show_queued = false
show_waiting_retrieval = true
worker_order = "worker_id"
max_worker_ticks = 8

[dag]
form = "compact"
critical_fill = "red"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.trace().root, "/data/traces");
    assert_eq!(cfg.trace().log_subdir, "logs");
    assert_eq!(cfg.timeline().width, 800.0);
    assert!(!cfg.timeline().show_queued);
    assert!(cfg.timeline().show_waiting_retrieval);
    assert_eq!(cfg.timeline().worker_order, WorkerOrder::WorkerId);
    assert_eq!(cfg.timeline().max_worker_ticks, 8);
    assert_eq!(cfg.timeline().strip_height, 60.0);
    assert_eq!(cfg.timeline().disk_height, 300.0);
    assert_eq!(cfg.dag().form, GraphForm::Compact);
    assert_eq!(cfg.dag().critical_fill, "red");
    assert_eq!(cfg.dag().analyze_fill, "#f69697");
}

#[test]
fn test_non_positive_size_returns_config_error() {
    let file = config_file("[timeline]\nwidth = 0.0\n");

    match load_and_validate(file.path()) {
        Err(TraceviewError::ConfigError(msg)) => {
            assert!(msg.contains("[timeline].width"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_row_padding_out_of_range_returns_config_error() {
    let file = config_file("[timeline]\nrow_padding = 1.5\n");

    match load_and_validate(file.path()) {
        Err(TraceviewError::ConfigError(msg)) => {
            assert!(msg.contains("row_padding"));
            assert!(msg.contains("1.5"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_other_invalid_values_return_config_errors() {
    for (toml, key) in [
        ("[timeline]\nstrip_height = -5.0\n", "strip_height"),
        ("[timeline]\ndisk_height = 0.0\n", "disk_height"),
        ("[timeline]\nmax_worker_ticks = 0\n", "max_worker_ticks"),
        ("[dag]\ncritical_fill = \"  \"\n", "critical_fill"),
        ("[trace]\nroot = \"\"\n", "root"),
    ] {
        let file = config_file(toml);
        match load_and_validate(file.path()) {
            Err(TraceviewError::ConfigError(msg)) => {
                assert!(msg.contains(key), "'{msg}' should name {key}");
            }
            Err(e) => panic!("Expected ConfigError for {key}, got: {:?}", e),
            Ok(_) => panic!("Expected error for {key}, got Ok"),
        }
    }
}

#[test]
fn test_bad_toml_returns_toml_error() {
    for toml in ["[timeline\nwidth = 1", "[dag]\nform = \"sideways\"\n"] {
        let file = config_file(toml);
        match load_and_validate(file.path()) {
            Err(TraceviewError::TomlError(_)) => {}
            Err(e) => panic!("Expected TomlError, got: {:?}", e),
            Ok(_) => panic!("Expected error, got Ok"),
        }
    }
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Traceview.toml");

    let cfg = load_or_default(&path).unwrap();
    assert_eq!(cfg.trace().root, "logs");
    assert_eq!(cfg.timeline().width, 1200.0);
    assert!(cfg.timeline().show_queued);
    assert!(!cfg.timeline().show_waiting_retrieval);

    match load_and_validate(&path) {
        Err(TraceviewError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}
