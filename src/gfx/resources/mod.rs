// src/gfx/resources/mod.rs
//! GPU-facing resources
//!
//! Materials, shader programs, constant buffer layouts and texture sources.

pub mod material;
pub mod shader;
pub mod shader_data;
pub mod texture_resource;

// Re-export main types
pub use material::Material;
pub use shader::ShaderProgram;
pub use texture_resource::{ImageData, SamplerDesc};
