//! Shared helpers for the `traceview` test suites: dataset and config
//! builders, the chain trace as CSV fixtures, and a recording renderer.

pub mod builders;
pub mod fake_renderer;
pub mod fixtures;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};
use traceview::logging::{build_filter, LOG_ENV_VAR};

/// Filter used when `TRACEVIEW_LOG` is unset or unparsable.
pub const TEST_DIRECTIVES: &str = "traceview=debug";

/// How long a scripted runtime may take before the test fails.
pub const RUNTIME_LIMIT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a subscriber once per test binary, filtered like the binary
/// (`TRACEVIEW_LOG`). Output goes to the test writer, so only failing tests
/// show it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV_VAR).ok();
        let filter = match env.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(directives) => build_filter(None, Some(directives))
                .unwrap_or_else(|_| EnvFilter::new(TEST_DIRECTIVES)),
            None => EnvFilter::new(TEST_DIRECTIVES),
        };

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await a runtime (or any future), panicking after [`RUNTIME_LIMIT`].
pub async fn within_limit<F: Future>(f: F) -> F::Output {
    match tokio::time::timeout(RUNTIME_LIMIT, f).await {
        Ok(output) => output,
        Err(_) => panic!("runtime did not settle within {RUNTIME_LIMIT:?}"),
    }
}
