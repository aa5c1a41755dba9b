//! Vertex/pixel shader pairs
//!
//! Each stage is a separate WGSL module with a `vs_main` or `fs_main` entry
//! point. The built-in programs are embedded; custom ones can be loaded by path.

use std::path::Path;

use crate::error::{RenderError, Result};
use crate::gfx::rendering::context::{GraphicsContext, ShaderHandle, ShaderStage};

const STANDARD_VS: &str = include_str!("../shaders/standard_vs.wgsl");
const STANDARD_PS: &str = include_str!("../shaders/standard_ps.wgsl");
const SKY_VS: &str = include_str!("../shaders/sky_vs.wgsl");
const SKY_PS: &str = include_str!("../shaders/sky_ps.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProgram {
    pub vertex: ShaderHandle,
    pub pixel: ShaderHandle,
}

impl ShaderProgram {
    pub fn from_source(
        ctx: &mut dyn GraphicsContext,
        label: &str,
        vertex_source: &str,
        pixel_source: &str,
    ) -> Result<Self> {
        let vertex = ctx.create_shader(ShaderStage::Vertex, &format!("{} VS", label), vertex_source)?;
        let pixel = ctx.create_shader(ShaderStage::Pixel, &format!("{} PS", label), pixel_source)?;
        Ok(Self { vertex, pixel })
    }

    /// Reads both stages from disk.
    pub fn load(
        ctx: &mut dyn GraphicsContext,
        vertex_path: impl AsRef<Path>,
        pixel_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_source = read_source(vertex_path.as_ref())?;
        let pixel_source = read_source(pixel_path.as_ref())?;
        let label = vertex_path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_source(ctx, &label, &vertex_source, &pixel_source)
    }

    /// Lit, textured and normal-mapped program used by materials.
    pub fn standard(ctx: &mut dyn GraphicsContext) -> Result<Self> {
        Self::from_source(ctx, "Standard", STANDARD_VS, STANDARD_PS)
    }

    /// Cubemap program used by the sky.
    pub fn sky(ctx: &mut dyn GraphicsContext) -> Result<Self> {
        Self::from_source(ctx, "Sky", SKY_VS, SKY_PS)
    }

    pub fn bind(&self, ctx: &mut dyn GraphicsContext) {
        ctx.set_shader(ShaderStage::Vertex, self.vertex);
        ctx.set_shader(ShaderStage::Pixel, self.pixel);
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::recording::RecordingContext;

    #[test]
    fn test_builtin_programs_have_entry_points() {
        assert!(STANDARD_VS.contains("fn vs_main"));
        assert!(SKY_VS.contains("fn vs_main"));
        assert!(STANDARD_PS.contains("fn fs_main"));
        assert!(SKY_PS.contains("fn fs_main"));
    }

    #[test]
    fn test_missing_shader_file() {
        let mut ctx = RecordingContext::new();
        let result = ShaderProgram::load(&mut ctx, "missing_vs.wgsl", "missing_ps.wgsl");
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }

    #[test]
    fn test_programs_get_distinct_handles() {
        let mut ctx = RecordingContext::new();
        let standard = ShaderProgram::standard(&mut ctx).unwrap();
        let sky = ShaderProgram::sky(&mut ctx).unwrap();
        assert_ne!(standard.vertex, standard.pixel);
        assert_ne!(standard.vertex, sky.vertex);
    }
}
