// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! [`GraphicsContext`] is the explicit pipeline-state interface the scene draws
//! through. [`WgpuContext`] implements it on the GPU and [`RecordingContext`]
//! implements it headlessly for tests and tooling.

pub mod context;
pub mod pipeline_manager;
pub mod recording;
pub mod wgpu_context;

// Re-export main types
pub use context::{
    BufferHandle, BufferKind, GraphicsContext, PipelineState, RenderState, SamplerHandle,
    ShaderHandle, ShaderStage, TextureHandle, TextureKind,
};
pub use pipeline_manager::{PipelineConfig, PipelineKey, PipelineManager, PipelineStats};
pub use recording::{Command, RecordingContext};
pub use wgpu_context::WgpuContext;
