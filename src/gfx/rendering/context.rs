//! The explicit pipeline-state interface every draw goes through
//!
//! GPU binding state is global: whatever was bound last is what the next draw
//! sees. Instead of hiding that behind globals, scene code receives a
//! `&mut dyn GraphicsContext` and (re)binds everything each draw needs.
//!
//! Two implementations exist: [`WgpuContext`](super::wgpu_context::WgpuContext)
//! drives a real device, [`RecordingContext`](super::recording::RecordingContext)
//! keeps every command in memory for inspection.

use crate::error::{RenderError, Result};
use crate::gfx::resources::texture_resource::{ImageData, SamplerDesc};

/// Texture slots visible to the pixel stage.
pub const MAX_TEXTURE_SLOTS: usize = 4;
/// Sampler slots visible to the pixel stage.
pub const MAX_SAMPLER_SLOTS: usize = 2;
/// Constant buffer slots per stage.
pub const MAX_CONSTANT_SLOTS: usize = 1;
/// Largest constant block accepted by a single slot.
pub const MAX_CONSTANT_BYTES: usize = 512;

macro_rules! handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(&self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(BufferHandle);
handle!(TextureHandle);
handle!(SamplerHandle);
handle!(ShaderHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureKind {
    #[default]
    D2,
    Cube,
}

/// Fixed-function state selected per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderState {
    /// Back-face culling, depth test `Less`, depth writes on.
    #[default]
    Opaque,
    /// Front-face culling, depth test `LessEqual`, depth writes off.
    Sky,
}

pub trait GraphicsContext {
    /// Uploads an immutable vertex or index buffer.
    fn create_buffer(&mut self, kind: BufferKind, label: &str, contents: &[u8])
        -> Result<BufferHandle>;

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureHandle>;

    /// Builds one cubemap from faces ordered +X, -X, +Y, -Y, +Z, -Z.
    fn create_cubemap(&mut self, label: &str, faces: &[ImageData; 6]) -> Result<TextureHandle>;

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle>;

    fn create_shader(&mut self, stage: ShaderStage, label: &str, source: &str)
        -> Result<ShaderHandle>;

    /// Starts a frame: clears colour and depth and drops every binding.
    fn clear(&mut self, color: [f32; 4]);

    fn set_render_state(&mut self, state: RenderState);

    fn set_shader(&mut self, stage: ShaderStage, shader: ShaderHandle);

    fn set_constant_buffer(&mut self, stage: ShaderStage, slot: usize, data: &[u8]) -> Result<()>;

    /// Binds a texture to a pixel-stage slot.
    fn set_texture(&mut self, slot: usize, texture: TextureHandle) -> Result<()>;

    /// Binds a sampler to a pixel-stage slot.
    fn set_sampler(&mut self, slot: usize, sampler: SamplerHandle) -> Result<()>;

    fn set_vertex_buffer(&mut self, buffer: BufferHandle);

    fn set_index_buffer(&mut self, buffer: BufferHandle);

    /// Draws with the currently bound state. Fails if shaders or buffers are missing.
    fn draw_indexed(&mut self, index_count: u32) -> Result<()>;

    /// Shows the finished frame; may block on vsync.
    fn present(&mut self) -> Result<()>;

    /// Restores the output targets for the next frame.
    fn bind_render_targets(&mut self);
}

pub(crate) fn check_slot(kind: &'static str, slot: usize, max: usize) -> Result<()> {
    if slot >= max {
        return Err(RenderError::SlotOutOfRange {
            kind,
            slot: slot as u32,
            max: max as u32 - 1,
        });
    }
    Ok(())
}

/// Everything currently bound, as a draw would see it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    pub render_state: RenderState,
    pub vertex_shader: Option<ShaderHandle>,
    pub pixel_shader: Option<ShaderHandle>,
    pub vertex_constants: Option<Vec<u8>>,
    pub pixel_constants: Option<Vec<u8>>,
    pub textures: [Option<TextureHandle>; MAX_TEXTURE_SLOTS],
    pub samplers: [Option<SamplerHandle>; MAX_SAMPLER_SLOTS],
    pub vertex_buffer: Option<BufferHandle>,
    pub index_buffer: Option<BufferHandle>,
}

impl PipelineState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_shader(&mut self, stage: ShaderStage, shader: ShaderHandle) {
        match stage {
            ShaderStage::Vertex => self.vertex_shader = Some(shader),
            ShaderStage::Pixel => self.pixel_shader = Some(shader),
        }
    }

    pub fn set_constants(&mut self, stage: ShaderStage, slot: usize, data: &[u8]) -> Result<()> {
        check_slot("constant buffer", slot, MAX_CONSTANT_SLOTS)?;
        if data.len() > MAX_CONSTANT_BYTES {
            return Err(RenderError::ConstantDataTooLarge {
                size: data.len(),
                max: MAX_CONSTANT_BYTES,
            });
        }
        let bytes = Some(data.to_vec());
        match stage {
            ShaderStage::Vertex => self.vertex_constants = bytes,
            ShaderStage::Pixel => self.pixel_constants = bytes,
        }
        Ok(())
    }

    pub fn set_texture(&mut self, slot: usize, texture: TextureHandle) -> Result<()> {
        check_slot("texture", slot, MAX_TEXTURE_SLOTS)?;
        self.textures[slot] = Some(texture);
        Ok(())
    }

    pub fn set_sampler(&mut self, slot: usize, sampler: SamplerHandle) -> Result<()> {
        check_slot("sampler", slot, MAX_SAMPLER_SLOTS)?;
        self.samplers[slot] = Some(sampler);
        Ok(())
    }

    /// Shaders and geometry are required; unbound constants and textures fall back to defaults.
    pub fn check_drawable(&self) -> Result<()> {
        if self.vertex_shader.is_none() {
            return Err(RenderError::IncompleteState("a vertex shader"));
        }
        if self.pixel_shader.is_none() {
            return Err(RenderError::IncompleteState("a pixel shader"));
        }
        if self.vertex_buffer.is_none() {
            return Err(RenderError::IncompleteState("a vertex buffer"));
        }
        if self.index_buffer.is_none() {
            return Err(RenderError::IncompleteState("an index buffer"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_bounds() {
        let mut state = PipelineState::default();
        assert!(state.set_texture(3, TextureHandle(0)).is_ok());
        assert!(matches!(
            state.set_texture(4, TextureHandle(0)),
            Err(RenderError::SlotOutOfRange { kind: "texture", slot: 4, max: 3 })
        ));
        assert!(matches!(
            state.set_sampler(2, SamplerHandle(0)),
            Err(RenderError::SlotOutOfRange { kind: "sampler", .. })
        ));
        assert!(state.set_constants(ShaderStage::Vertex, 1, &[0; 4]).is_err());
    }

    #[test]
    fn test_oversized_constants_rejected() {
        let mut state = PipelineState::default();
        let data = vec![0u8; MAX_CONSTANT_BYTES + 16];
        assert!(matches!(
            state.set_constants(ShaderStage::Pixel, 0, &data),
            Err(RenderError::ConstantDataTooLarge { .. })
        ));
    }

    #[test]
    fn test_reset_drops_bindings() {
        let mut state = PipelineState::default();
        state.set_shader(ShaderStage::Vertex, ShaderHandle(1));
        state.set_texture(0, TextureHandle(2)).unwrap();
        state.render_state = RenderState::Sky;
        state.reset();
        assert_eq!(state, PipelineState::default());
        assert!(matches!(
            state.check_drawable(),
            Err(RenderError::IncompleteState(_))
        ));
    }
}
