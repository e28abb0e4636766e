// src/render/mod.rs

//! Output side of the viewer: where view commands are delivered.

pub mod backend;

pub use backend::{JsonRenderBackend, RenderBackend};
