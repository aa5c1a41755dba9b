// src/lib.rs
//! kiln
//!
//! A small real-time 3D scene renderer built on wgpu and winit: entities with
//! transforms, shared meshes and materials, directional/point/spot lights, a
//! cubemap sky and an ImGui inspector.

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod gfx;
pub mod input;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::KilnApp;
pub use config::AppConfig;
pub use error::{RenderError, Result};

/// Creates an application using defaults plus `KILN_*` environment overrides
pub fn default() -> anyhow::Result<KilnApp> {
    KilnApp::new(AppConfig::from_env())
}
