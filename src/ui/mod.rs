//! # User Interface Module
//!
//! Dear ImGui overlay for inspecting and editing a running scene.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui context, winit platform glue and wgpu renderer
//! - [`inspector_panel`] - the default inspector window
//!
//! ## Frame Flow
//!
//! The app builds the UI with [`UiManager::update_logic`] before the scene is
//! drawn. The graphics context owns the manager as an overlay and renders the
//! recorded draw data on top of the scene when it presents.
//!
//! ## Input Handling
//!
//! While ImGui wants the keyboard or mouse, the app marks that input as captured
//! so camera movement does not react to clicks and typing inside the panel.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{inspector_panel, AppDetails, InspectorState};
