// tests/integration/log_filter.rs

use traceview::cli::LogLevel;
use traceview::logging::build_filter;

#[test]
fn test_cli_level_overrides_environment() {
    let filter = build_filter(Some(LogLevel::Debug), Some("traceview=bogus")).unwrap();
    assert_eq!(filter.to_string(), "traceview=debug");
}

#[test]
fn test_environment_directives_are_used() {
    let filter = build_filter(None, Some("traceview::dag=trace")).unwrap();
    assert_eq!(filter.to_string(), "traceview::dag=trace");
}

#[test]
fn test_default_filter_when_unset_or_blank() {
    assert_eq!(build_filter(None, None).unwrap().to_string(), "traceview=info");
    assert_eq!(build_filter(None, Some("  ")).unwrap().to_string(), "traceview=info");
}

#[test]
fn test_malformed_environment_is_an_error() {
    assert!(build_filter(None, Some("traceview=bogus")).is_err());
}

#[test]
fn test_test_directives_parse_like_environment_directives() {
    let filter = build_filter(None, Some(traceview_test_utils::TEST_DIRECTIVES)).unwrap();
    assert_eq!(filter.to_string(), "traceview=debug");

    crate::common::init_tracing();
    crate::common::init_tracing();
}
