//! Render pipeline management system for wgpu
//!
//! Pipelines are created lazily the first time a draw needs a particular
//! combination of shaders, render state and texture kinds, then cached. Shader
//! and pipeline validation errors are captured with error scopes instead of
//! reaching the device's uncaptured error handler.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use super::context::{RenderState, ShaderHandle, TextureKind, MAX_SAMPLER_SLOTS, MAX_TEXTURE_SLOTS};
use crate::error::{RenderError, Result};
use crate::gfx::resources::texture_resource::DepthTexture;
use crate::gfx::scene::vertex::Vertex;
use crate::wgpu_utils::binding_types;

/// Samplers follow the texture bindings inside the texture group.
pub const SAMPLER_BINDING_BASE: u32 = MAX_TEXTURE_SLOTS as u32;

/// Everything that selects a distinct pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub vertex_shader: ShaderHandle,
    pub pixel_shader: ShaderHandle,
    pub render_state: RenderState,
    pub texture_kinds: [TextureKind; MAX_TEXTURE_SLOTS],
}

/// Fixed-function settings for creating a render pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub label: String,
    pub cull_mode: Option<Face>,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
    pub color_format: TextureFormat,
}

impl PipelineConfig {
    /// Settings for one of the context's render states.
    pub fn for_state(state: RenderState, color_format: TextureFormat) -> Self {
        match state {
            RenderState::Opaque => Self {
                label: "Opaque Pipeline".to_string(),
                cull_mode: Some(Face::Back),
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                color_format,
            },
            // Seen from inside the cube, drawn at the far plane behind everything.
            RenderState::Sky => Self {
                label: "Sky Pipeline".to_string(),
                cull_mode: Some(Face::Front),
                depth_write_enabled: false,
                depth_compare: CompareFunction::LessEqual,
                color_format,
            },
        }
    }
}

/// Manages shader modules, bind group layouts and cached pipelines
pub struct PipelineManager {
    device: Arc<Device>,
    color_format: TextureFormat,
    shader_modules: Vec<ShaderModule>,
    constant_layout: BindGroupLayout,
    texture_layouts: HashMap<[TextureKind; MAX_TEXTURE_SLOTS], BindGroupLayout>,
    pipelines: HashMap<PipelineKey, RenderPipeline>,
}

impl PipelineManager {
    /// Creates a new pipeline manager
    ///
    /// # Arguments
    /// * `device` - Shared wgpu device for creating resources
    /// * `color_format` - Format of the surface every pipeline renders to
    /// * `constant_block_size` - Size of one dynamic constant block
    pub fn new(device: Arc<Device>, color_format: TextureFormat, constant_block_size: u64) -> Self {
        let constant_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Constant Layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::dynamic_uniform(constant_block_size),
                count: None,
            }],
        });

        Self {
            device,
            color_format,
            shader_modules: Vec::new(),
            constant_layout,
            texture_layouts: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Layout shared by the vertex (group 0) and pixel (group 1) constant groups.
    pub fn constant_layout(&self) -> &BindGroupLayout {
        &self.constant_layout
    }

    /// Compiles a WGSL module and returns its handle.
    pub fn load_shader(&mut self, label: &str, source: &str) -> Result<ShaderHandle> {
        self.device.push_error_scope(ErrorFilter::Validation);
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(label),
            source: ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::Shader(format!("{}: {}", label, error)));
        }

        self.shader_modules.push(module);
        log::debug!("Loaded shader '{}'", label);
        Ok(ShaderHandle(self.shader_modules.len() as u32 - 1))
    }

    /// Texture group layout for one combination of slot kinds, created on first use.
    pub fn texture_layout(&mut self, kinds: [TextureKind; MAX_TEXTURE_SLOTS]) -> &BindGroupLayout {
        let device = &self.device;
        self.texture_layouts
            .entry(kinds)
            .or_insert_with(|| create_texture_layout(device, kinds))
    }

    /// Gets or creates a pipeline (lazy loading)
    pub fn get_pipeline(&mut self, key: &PipelineKey) -> Result<&RenderPipeline> {
        if !self.pipelines.contains_key(key) {
            let pipeline = self.create_pipeline(key)?;
            self.pipelines.insert(*key, pipeline);
        }
        Ok(&self.pipelines[key])
    }

    /// An already created pipeline.
    pub fn pipeline(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    fn shader(&self, handle: ShaderHandle) -> Result<&ShaderModule> {
        self.shader_modules
            .get(handle.index())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{:?}", handle)))
    }

    fn create_pipeline(&mut self, key: &PipelineKey) -> Result<RenderPipeline> {
        self.texture_layout(key.texture_kinds);
        let texture_layout = &self.texture_layouts[&key.texture_kinds];
        let vertex_module = self.shader(key.vertex_shader)?;
        let pixel_module = self.shader(key.pixel_shader)?;
        let config = PipelineConfig::for_state(key.render_state, self.color_format);

        self.device.push_error_scope(ErrorFilter::Validation);

        let pipeline_layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", config.label)),
            bind_group_layouts: &[&self.constant_layout, &self.constant_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: pixel_module,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: config.color_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Left-handed content: outward faces wind clockwise on screen.
                front_face: FrontFace::Cw,
                cull_mode: config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DepthTexture::FORMAT,
                depth_write_enabled: config.depth_write_enabled,
                depth_compare: config.depth_compare,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::Shader(format!("{}: {}", config.label, error)));
        }

        log::debug!("Created pipeline {:?}", key);
        Ok(pipeline)
    }

    /// Returns pipeline manager statistics
    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            loaded_shaders: self.shader_modules.len(),
            texture_layouts: self.texture_layouts.len(),
        }
    }
}

fn create_texture_layout(device: &Device, kinds: [TextureKind; MAX_TEXTURE_SLOTS]) -> BindGroupLayout {
    let mut entries = Vec::with_capacity(MAX_TEXTURE_SLOTS + MAX_SAMPLER_SLOTS);
    for (slot, kind) in kinds.iter().enumerate() {
        entries.push(BindGroupLayoutEntry {
            binding: slot as u32,
            visibility: ShaderStages::FRAGMENT,
            ty: match kind {
                TextureKind::D2 => binding_types::texture_2d(),
                TextureKind::Cube => binding_types::texture_cube(),
            },
            count: None,
        });
    }
    for slot in 0..MAX_SAMPLER_SLOTS as u32 {
        entries.push(BindGroupLayoutEntry {
            binding: SAMPLER_BINDING_BASE + slot,
            visibility: ShaderStages::FRAGMENT,
            ty: binding_types::sampler(SamplerBindingType::Filtering),
            count: None,
        });
    }

    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(&format!("Texture Layout {:?}", kinds)),
        entries: &entries,
    })
}

/// Statistics about pipeline manager state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub loaded_shaders: usize,
    pub texture_layouts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_state_configs() {
        let format = TextureFormat::Bgra8Unorm;
        let opaque = PipelineConfig::for_state(RenderState::Opaque, format);
        assert_eq!(opaque.cull_mode, Some(Face::Back));
        assert!(opaque.depth_write_enabled);
        assert_eq!(opaque.depth_compare, CompareFunction::Less);

        let sky = PipelineConfig::for_state(RenderState::Sky, format);
        assert_eq!(sky.cull_mode, Some(Face::Front));
        assert!(!sky.depth_write_enabled);
        assert_eq!(sky.depth_compare, CompareFunction::LessEqual);
    }

    #[test]
    fn test_pipeline_keys_distinguish_texture_kinds() {
        let mut key = PipelineKey {
            vertex_shader: ShaderHandle(0),
            pixel_shader: ShaderHandle(1),
            render_state: RenderState::Sky,
            texture_kinds: [TextureKind::D2; MAX_TEXTURE_SLOTS],
        };
        let flat = key;
        key.texture_kinds[0] = TextureKind::Cube;
        assert_ne!(flat, key);
    }
}
