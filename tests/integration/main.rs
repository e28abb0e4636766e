// tests/integration/main.rs

#[path = "../common/mod.rs"]
mod common;

mod csv_loader;
mod error_handling;
mod log_filter;
