//! Headless [`GraphicsContext`] that records commands instead of drawing
//!
//! Every call is appended to a command log, and every successful draw keeps a
//! snapshot of the complete bound state. Tests use it to check binding order and
//! per-draw isolation without a GPU.

use super::context::{
    BufferHandle, BufferKind, GraphicsContext, PipelineState, RenderState, SamplerHandle,
    ShaderHandle, ShaderStage, TextureHandle, TextureKind,
};
use crate::error::{RenderError, Result};
use crate::gfx::resources::texture_resource::{
    validate_cubemap_faces, ImageData, SamplerDesc, MAX_TEXTURE_DIMENSION,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear([f32; 4]),
    SetRenderState(RenderState),
    SetShader(ShaderStage, ShaderHandle),
    SetConstantBuffer {
        stage: ShaderStage,
        slot: usize,
        data: Vec<u8>,
    },
    SetTexture {
        slot: usize,
        texture: TextureHandle,
    },
    SetSampler {
        slot: usize,
        sampler: SamplerHandle,
    },
    SetVertexBuffer(BufferHandle),
    SetIndexBuffer(BufferHandle),
    DrawIndexed(u32),
    Present,
    BindRenderTargets,
}

/// A draw and the state it saw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub index_count: u32,
    pub state: PipelineState,
}

#[derive(Debug, Clone)]
pub struct BufferRecord {
    pub kind: BufferKind,
    pub label: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub kind: TextureKind,
    pub label: String,
    pub size: (u32, u32),
}

#[derive(Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    draws: Vec<DrawRecord>,
    state: PipelineState,
    buffers: Vec<BufferRecord>,
    textures: Vec<TextureRecord>,
    samplers: Vec<SamplerDesc>,
    shaders: Vec<(ShaderStage, String)>,
    frames_presented: usize,
    fail_buffer_creation: bool,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn buffers(&self) -> &[BufferRecord] {
        &self.buffers
    }

    pub fn textures(&self) -> &[TextureRecord] {
        &self.textures
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// Forgets recorded commands and draws, keeping resources and bound state.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Makes every later `create_buffer` fail, to exercise construction errors.
    pub fn fail_buffer_creation(&mut self, fail: bool) {
        self.fail_buffer_creation = fail;
    }

    fn check_texture(&self, texture: TextureHandle) -> Result<()> {
        if texture.index() >= self.textures.len() {
            return Err(RenderError::InvalidHandle(format!("{:?}", texture)));
        }
        Ok(())
    }
}

impl GraphicsContext for RecordingContext {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferHandle> {
        if self.fail_buffer_creation {
            return Err(RenderError::Device(format!("cannot allocate '{}'", label)));
        }
        self.buffers.push(BufferRecord {
            kind,
            label: label.to_string(),
            size: contents.len(),
        });
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureHandle> {
        image.validate(MAX_TEXTURE_DIMENSION)?;
        self.textures.push(TextureRecord {
            kind: TextureKind::D2,
            label: label.to_string(),
            size: (image.width, image.height),
        });
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_cubemap(&mut self, label: &str, faces: &[ImageData; 6]) -> Result<TextureHandle> {
        let size = validate_cubemap_faces(faces)?;
        for face in faces {
            face.validate(MAX_TEXTURE_DIMENSION)?;
        }
        self.textures.push(TextureRecord {
            kind: TextureKind::Cube,
            label: label.to_string(),
            size: (size, size),
        });
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        self.samplers.push(*desc);
        Ok(SamplerHandle(self.samplers.len() as u32 - 1))
    }

    fn create_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        _source: &str,
    ) -> Result<ShaderHandle> {
        self.shaders.push((stage, label.to_string()));
        Ok(ShaderHandle(self.shaders.len() as u32 - 1))
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.state.reset();
        self.commands.push(Command::Clear(color));
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state.render_state = state;
        self.commands.push(Command::SetRenderState(state));
    }

    fn set_shader(&mut self, stage: ShaderStage, shader: ShaderHandle) {
        self.state.set_shader(stage, shader);
        self.commands.push(Command::SetShader(stage, shader));
    }

    fn set_constant_buffer(&mut self, stage: ShaderStage, slot: usize, data: &[u8]) -> Result<()> {
        self.state.set_constants(stage, slot, data)?;
        self.commands.push(Command::SetConstantBuffer {
            stage,
            slot,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn set_texture(&mut self, slot: usize, texture: TextureHandle) -> Result<()> {
        self.check_texture(texture)?;
        self.state.set_texture(slot, texture)?;
        self.commands.push(Command::SetTexture { slot, texture });
        Ok(())
    }

    fn set_sampler(&mut self, slot: usize, sampler: SamplerHandle) -> Result<()> {
        self.state.set_sampler(slot, sampler)?;
        self.commands.push(Command::SetSampler { slot, sampler });
        Ok(())
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.state.vertex_buffer = Some(buffer);
        self.commands.push(Command::SetVertexBuffer(buffer));
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) {
        self.state.index_buffer = Some(buffer);
        self.commands.push(Command::SetIndexBuffer(buffer));
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        self.state.check_drawable()?;
        self.commands.push(Command::DrawIndexed(index_count));
        self.draws.push(DrawRecord {
            index_count,
            state: self.state.clone(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames_presented += 1;
        self.commands.push(Command::Present);
        Ok(())
    }

    fn bind_render_targets(&mut self) {
        self.commands.push(Command::BindRenderTargets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_requires_complete_state() {
        let mut ctx = RecordingContext::new();
        let buffer = ctx.create_buffer(BufferKind::Vertex, "v", &[0; 44]).unwrap();
        let index = ctx.create_buffer(BufferKind::Index, "i", &[0; 12]).unwrap();
        let vs = ctx.create_shader(ShaderStage::Vertex, "vs", "").unwrap();
        let ps = ctx.create_shader(ShaderStage::Pixel, "ps", "").unwrap();

        ctx.set_vertex_buffer(buffer);
        ctx.set_index_buffer(index);
        assert!(ctx.draw_indexed(3).is_err());

        ctx.set_shader(ShaderStage::Vertex, vs);
        ctx.set_shader(ShaderStage::Pixel, ps);
        assert!(ctx.draw_indexed(3).is_ok());
        assert_eq!(ctx.draws().len(), 1);

        ctx.clear([0.0; 4]);
        assert!(matches!(
            ctx.draw_indexed(3),
            Err(RenderError::IncompleteState(_))
        ));
    }

    #[test]
    fn test_unknown_texture_rejected() {
        let mut ctx = RecordingContext::new();
        assert!(matches!(
            ctx.set_texture(0, TextureHandle(3)),
            Err(RenderError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_oversized_texture_is_an_error() {
        let mut ctx = RecordingContext::new();
        let edge = MAX_TEXTURE_DIMENSION * 2;
        let image = ImageData::from_rgba(edge, 1, vec![0; edge as usize * 4]).unwrap();
        assert!(matches!(
            ctx.create_texture("huge", &image),
            Err(RenderError::TextureTooLarge { .. })
        ));
        assert!(ctx.textures().is_empty());
        assert!(ctx.create_texture("ok", &ImageData::solid([0; 4])).is_ok());
    }

    #[test]
    fn test_cubemap_validates_faces() {
        let mut ctx = RecordingContext::new();
        let mut faces: [ImageData; 6] = std::array::from_fn(|_| ImageData::solid([0; 4]));
        assert!(ctx.create_cubemap("sky", &faces).is_ok());

        faces[5] = ImageData::vertical_gradient(4, [0; 4], [255; 4]);
        assert!(matches!(
            ctx.create_cubemap("sky", &faces),
            Err(RenderError::CubemapFace { face: 5, .. })
        ));
    }
}
