//! Surface appearance shared between entities
//!
//! A material pairs a shader program with per-material constants (tint,
//! roughness, UV transform) and the textures and samplers bound for it. The
//! constants are plain fields read straight into each draw's pixel data, so live
//! edits show up on the next frame.

use std::collections::BTreeMap;

use super::shader::ShaderProgram;
use crate::error::Result;
use crate::gfx::rendering::context::{
    check_slot, GraphicsContext, SamplerHandle, TextureHandle, MAX_SAMPLER_SLOTS,
    MAX_TEXTURE_SLOTS,
};

/// Texture slot conventions of the standard program.
pub const ALBEDO_SLOT: usize = 0;
pub const NORMAL_SLOT: usize = 1;

pub struct Material {
    pub name: String,
    pub color_tint: [f32; 4],
    /// 0 is mirror-like, 1 is fully diffuse.
    pub roughness: f32,
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
    shaders: ShaderProgram,
    textures: BTreeMap<usize, TextureHandle>,
    samplers: BTreeMap<usize, SamplerHandle>,
}

impl Material {
    /// Creates a material with an identity UV transform and no textures.
    ///
    /// # Arguments
    /// * `name` - Debug label
    /// * `color_tint` - RGBA multiplier
    /// * `roughness` - Clamped to 0..1
    /// * `shaders` - Program bound for every entity using this material
    pub fn new(name: &str, color_tint: [f32; 4], roughness: f32, shaders: ShaderProgram) -> Self {
        Self {
            name: name.to_string(),
            color_tint,
            roughness: roughness.clamp(0.0, 1.0),
            uv_offset: [0.0, 0.0],
            uv_scale: [1.0, 1.0],
            shaders,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
        }
    }

    /// Builder pattern: set UV tiling
    pub fn with_uv_scale(mut self, scale: [f32; 2]) -> Self {
        self.uv_scale = scale;
        self
    }

    /// Builder pattern: set UV offset
    pub fn with_uv_offset(mut self, offset: [f32; 2]) -> Self {
        self.uv_offset = offset;
        self
    }

    /// Adds or replaces the texture at `slot`.
    pub fn add_texture(&mut self, slot: usize, texture: TextureHandle) -> Result<()> {
        check_slot("texture", slot, MAX_TEXTURE_SLOTS)?;
        self.textures.insert(slot, texture);
        Ok(())
    }

    /// Adds or replaces the sampler at `slot`.
    pub fn add_sampler(&mut self, slot: usize, sampler: SamplerHandle) -> Result<()> {
        check_slot("sampler", slot, MAX_SAMPLER_SLOTS)?;
        self.samplers.insert(slot, sampler);
        Ok(())
    }

    pub fn shaders(&self) -> ShaderProgram {
        self.shaders
    }

    pub fn set_shaders(&mut self, shaders: ShaderProgram) {
        self.shaders = shaders;
    }

    pub fn textures(&self) -> impl Iterator<Item = (usize, TextureHandle)> + '_ {
        self.textures.iter().map(|(&slot, &texture)| (slot, texture))
    }

    pub fn samplers(&self) -> impl Iterator<Item = (usize, SamplerHandle)> + '_ {
        self.samplers.iter().map(|(&slot, &sampler)| (slot, sampler))
    }

    pub fn bind_shaders(&self, ctx: &mut dyn GraphicsContext) {
        self.shaders.bind(ctx);
    }

    /// Binds every registered texture and sampler to its pixel-stage slot.
    pub fn bind_textures_and_samplers(&self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        for (&slot, &texture) in &self.textures {
            ctx.set_texture(slot, texture)?;
        }
        for (&slot, &sampler) in &self.samplers {
            ctx.set_sampler(slot, sampler)?;
        }
        Ok(())
    }
}
