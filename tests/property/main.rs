// tests/property/main.rs

mod edge_filter;
mod row_index;
