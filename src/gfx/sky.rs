//! Cubemap environment drawn behind everything else
//!
//! The sky is drawn after the opaque entities with its own render state: depth
//! test `LessEqual` with writes off and front-face culling, so the inside of the
//! cube is visible and only uncovered pixels are filled. The vertex stage pins
//! depth to the far plane. Orthographic cameras see the sky through a
//! perspective projection with the same field of view, since a parallel
//! projection of the unit cube would only cover the middle of the screen.

use std::path::{Path, PathBuf};

use bytemuck::bytes_of;
use cgmath::{Matrix4, Vector4};

use crate::error::{RenderError, Result};
use crate::gfx::camera::{Camera, ProjectionKind};
use crate::gfx::math::matrix_to_array;
use crate::gfx::rendering::context::{
    GraphicsContext, RenderState, SamplerHandle, ShaderStage, TextureHandle,
};
use crate::gfx::resources::shader::ShaderProgram;
use crate::gfx::resources::shader_data::SkyShaderData;
use crate::gfx::resources::texture_resource::ImageData;
use crate::gfx::scene::mesh::Mesh;
use crate::gfx::scene::scene::MeshId;

/// File stems of the six faces, in +X, -X, +Y, -Y, +Z, -Z order.
pub const FACE_NAMES: [&str; 6] = ["right", "left", "up", "down", "front", "back"];

pub struct Sky {
    cubemap: TextureHandle,
    sampler: SamplerHandle,
    shaders: ShaderProgram,
    mesh: MeshId,
}

impl Sky {
    /// Builds the cubemap from six square faces of equal size.
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        faces: &[ImageData; 6],
        sampler: SamplerHandle,
        shaders: ShaderProgram,
        mesh: MeshId,
    ) -> Result<Self> {
        let cubemap = ctx.create_cubemap("Sky Cubemap", faces)?;
        Ok(Self {
            cubemap,
            sampler,
            shaders,
            mesh,
        })
    }

    /// Loads each face from disk. Any face that fails to load fails the sky.
    pub fn from_files<P: AsRef<Path>>(
        ctx: &mut dyn GraphicsContext,
        paths: &[P; 6],
        sampler: SamplerHandle,
        shaders: ShaderProgram,
        mesh: MeshId,
    ) -> Result<Self> {
        let mut faces = Vec::with_capacity(6);
        for path in paths {
            faces.push(ImageData::load(path)?);
        }
        let faces: [ImageData; 6] = faces
            .try_into()
            .map_err(|_| RenderError::InvalidGeometry("expected six sky faces".to_string()))?;
        Self::new(ctx, &faces, sampler, shaders, mesh)
    }

    /// Loads `right.png`, `left.png`, `up.png`, `down.png`, `front.png` and
    /// `back.png` from `dir`.
    pub fn from_directory(
        ctx: &mut dyn GraphicsContext,
        dir: impl AsRef<Path>,
        sampler: SamplerHandle,
        shaders: ShaderProgram,
        mesh: MeshId,
    ) -> Result<Self> {
        let paths: [PathBuf; 6] = face_paths(dir.as_ref());
        Self::from_files(ctx, &paths, sampler, shaders, mesh)
    }

    pub fn cubemap(&self) -> TextureHandle {
        self.cubemap
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn draw(&self, ctx: &mut dyn GraphicsContext, camera: &Camera, meshes: &[Mesh]) -> Result<()> {
        let mesh = meshes
            .get(self.mesh.index())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{:?}", self.mesh)))?;

        ctx.set_render_state(RenderState::Sky);
        self.shaders.bind(ctx);

        let data = SkyShaderData {
            view: matrix_to_array(without_translation(camera.view_matrix())),
            projection: matrix_to_array(sky_projection(camera)),
        };
        ctx.set_constant_buffer(ShaderStage::Vertex, 0, bytes_of(&data))?;
        ctx.set_texture(0, self.cubemap)?;
        ctx.set_sampler(0, self.sampler)?;

        let result = mesh.draw(ctx);
        ctx.set_render_state(RenderState::Opaque);
        result
    }
}

pub fn face_paths(dir: &Path) -> [PathBuf; 6] {
    FACE_NAMES.map(|name| dir.join(format!("{}.png", name)))
}

fn sky_projection(camera: &Camera) -> Matrix4<f32> {
    match camera.projection_kind() {
        ProjectionKind::Perspective => camera.projection_matrix(),
        ProjectionKind::Orthographic => camera.perspective_matrix(),
    }
}

fn without_translation(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut view = view;
    view.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
    view
}
