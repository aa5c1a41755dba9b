// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Binding type shorthands and the per-frame constant ring.

pub mod binding_types;
pub mod constant_ring;

// Re-export main types
pub use binding_types::*;
pub use constant_ring::{ConstantRing, ConstantStaging};
