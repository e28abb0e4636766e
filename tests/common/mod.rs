#![allow(dead_code)]

pub use traceview_test_utils::{builders, fixtures, init_tracing};
