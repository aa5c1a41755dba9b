//! WGPU implementation of [`GraphicsContext`]
//!
//! wgpu has no global binding state, so the context keeps one: every `set_*`
//! call updates a [`PipelineState`] and `draw_indexed` snapshots it into a
//! recorded draw. Constant bytes are staged in per-frame rings and selected by
//! dynamic offsets. At `present` the frame's draws are replayed into a single
//! render pass, followed by the optional UI overlay.

use std::{collections::HashMap, sync::Arc};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::context::{
    check_slot, BufferHandle, BufferKind, GraphicsContext, PipelineState, RenderState,
    SamplerHandle, ShaderHandle, ShaderStage, TextureHandle, TextureKind, MAX_CONSTANT_BYTES,
    MAX_SAMPLER_SLOTS, MAX_TEXTURE_SLOTS,
};
use super::pipeline_manager::{PipelineKey, PipelineManager, PipelineStats, SAMPLER_BINDING_BASE};
use crate::error::{RenderError, Result};
use crate::gfx::resources::material::NORMAL_SLOT;
use crate::gfx::resources::texture_resource::{
    validate_cubemap_faces, DepthTexture, ImageData, SamplerDesc, MAX_TEXTURE_DIMENSION,
};
use crate::ui::UiManager;
use crate::wgpu_utils::ConstantRing;

/// Blocks reserved up front in each constant ring.
const INITIAL_CONSTANT_BLOCKS: usize = 64;

/// Pixel shown by unbound texture slots: white, or a flat normal for the normal slot.
const DEFAULT_TEXEL: [u8; 4] = [255, 255, 255, 255];
const FLAT_NORMAL_TEXEL: [u8; 4] = [128, 128, 255, 255];

type TextureBindingKey = (
    [Option<TextureHandle>; MAX_TEXTURE_SLOTS],
    [Option<SamplerHandle>; MAX_SAMPLER_SLOTS],
);

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    kind: TextureKind,
}

/// A draw waiting for the frame's render pass.
struct DrawCall {
    pipeline: PipelineKey,
    textures: TextureBindingKey,
    vertex_offset: u32,
    pixel_offset: u32,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
}

pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    present_modes: Vec<wgpu::PresentMode>,
    depth_texture: DepthTexture,
    pipeline_manager: PipelineManager,
    buffers: Vec<GpuBuffer>,
    textures: Vec<GpuTexture>,
    samplers: Vec<wgpu::Sampler>,
    default_textures: Vec<GpuTexture>,
    default_sampler: wgpu::Sampler,
    vertex_constants: ConstantRing,
    pixel_constants: ConstantRing,
    vertex_constant_group: wgpu::BindGroup,
    pixel_constant_group: wgpu::BindGroup,
    texture_groups: HashMap<TextureBindingKey, wgpu::BindGroup>,
    state: PipelineState,
    draws: Vec<DrawCall>,
    clear_color: wgpu::Color,
    pending_resize: Option<(u32, u32)>,
    overlay: Option<UiManager>,
}

impl WgpuContext {
    /// Creates a context rendering to `window`
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `vsync` - Present with `Fifo` instead of the fastest available mode
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<WgpuContext> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Device(format!("failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Device(format!("no suitable adapter: {}", e)))?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: MAX_TEXTURE_DIMENSION,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::Device(format!("failed to request device: {}", e)))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Shaders encode gamma themselves, so prefer a linear surface format.
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| RenderError::Device("surface reports no formats".to_string()))?;

        let present_modes = surface_capabilities.present_modes.clone();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode_for(vsync, &present_modes),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, &config, "depth_texture");

        let block_size = constant_block_size(device.limits().min_uniform_buffer_offset_alignment);
        let vertex_constants =
            ConstantRing::new(&device, "Vertex Constants", block_size, INITIAL_CONSTANT_BLOCKS);
        let pixel_constants =
            ConstantRing::new(&device, "Pixel Constants", block_size, INITIAL_CONSTANT_BLOCKS);

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let pipeline_manager = PipelineManager::new(device.clone(), format, block_size as u64);

        let vertex_constant_group =
            create_constant_group(&device, &pipeline_manager, &vertex_constants, "Vertex Constants");
        let pixel_constant_group =
            create_constant_group(&device, &pipeline_manager, &pixel_constants, "Pixel Constants");

        let default_textures = (0..MAX_TEXTURE_SLOTS)
            .map(|slot| {
                let texel = if slot == NORMAL_SLOT {
                    FLAT_NORMAL_TEXEL
                } else {
                    DEFAULT_TEXEL
                };
                upload_texture(
                    &device,
                    &queue,
                    &format!("Default Texture {}", slot),
                    &[&ImageData::solid(texel)],
                    TextureKind::D2,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let default_sampler = create_sampler(&device, &SamplerDesc::default());

        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(WgpuContext {
            surface,
            device,
            queue,
            config,
            present_modes,
            depth_texture,
            pipeline_manager,
            buffers: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            default_textures,
            default_sampler,
            vertex_constants,
            pixel_constants,
            vertex_constant_group,
            pixel_constant_group,
            texture_groups: HashMap::new(),
            state: PipelineState::default(),
            draws: Vec::new(),
            clear_color: wgpu::Color::BLACK,
            pending_resize: None,
            overlay: None,
        })
    }

    /// Creates the ImGui overlay drawn after the scene at every `present`.
    pub fn attach_overlay(&mut self, window: &Window) {
        self.overlay = Some(UiManager::new(
            &self.device,
            &self.queue,
            self.config.format,
            window,
        ));
    }

    pub fn overlay_mut(&mut self) -> Option<&mut UiManager> {
        self.overlay.as_mut()
    }

    /// Requests a new surface size, applied at the next `bind_render_targets`.
    ///
    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.pending_resize = Some((width, height));
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.update_display_size(width, height);
        }
    }

    /// Switches between `Fifo` and the fastest supported present mode.
    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = present_mode_for(enable, &self.present_modes);
        self.surface.configure(&self.device, &self.config);
        log::info!("Present mode: {:?}", self.config.present_mode);
    }

    pub fn vsync(&self) -> bool {
        self.config.present_mode == wgpu::PresentMode::Fifo
    }

    /// Returns current surface dimensions
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline_manager.get_stats()
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = DepthTexture::new(&self.device, &self.config, "depth_texture");
        log::debug!("Surface resized to {}x{}", width, height);
    }

    fn end_frame(&mut self) {
        self.draws.clear();
        self.vertex_constants.staging.reset();
        self.pixel_constants.staging.reset();
    }

    fn check_buffer(&self, handle: BufferHandle, kind: BufferKind) -> Result<()> {
        match self.buffers.get(handle.index()) {
            Some(buffer) if buffer.kind == kind => Ok(()),
            _ => Err(RenderError::InvalidHandle(format!("{:?} as {:?} buffer", handle, kind))),
        }
    }

    fn texture_kinds(&self) -> [TextureKind; MAX_TEXTURE_SLOTS] {
        self.state
            .textures
            .map(|slot| slot.map_or(TextureKind::D2, |handle| self.textures[handle.index()].kind))
    }

    fn ensure_texture_group(
        &mut self,
        key: &TextureBindingKey,
        kinds: [TextureKind; MAX_TEXTURE_SLOTS],
    ) {
        if self.texture_groups.contains_key(key) {
            return;
        }

        let layout = self.pipeline_manager.texture_layout(kinds);
        let mut entries = Vec::with_capacity(MAX_TEXTURE_SLOTS + MAX_SAMPLER_SLOTS);
        for (slot, texture) in key.0.iter().enumerate() {
            let view = match texture {
                Some(handle) => &self.textures[handle.index()].view,
                None => &self.default_textures[slot].view,
            };
            entries.push(wgpu::BindGroupEntry {
                binding: slot as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        for (slot, sampler) in key.1.iter().enumerate() {
            let sampler = match sampler {
                Some(handle) => &self.samplers[handle.index()],
                None => &self.default_sampler,
            };
            entries.push(wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING_BASE + slot as u32,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &entries,
        });
        self.texture_groups.insert(*key, group);
    }
}

impl GraphicsContext for WgpuContext {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferHandle> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::Device(format!("buffer '{}': {}", label, error)));
        }

        self.buffers.push(GpuBuffer { buffer, kind });
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureHandle> {
        image.validate(self.device.limits().max_texture_dimension_2d)?;
        let texture = upload_texture(&self.device, &self.queue, label, &[image], TextureKind::D2)?;
        self.textures.push(texture);
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_cubemap(&mut self, label: &str, faces: &[ImageData; 6]) -> Result<TextureHandle> {
        validate_cubemap_faces(faces)?;
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        for face in faces {
            face.validate(max_dimension)?;
        }
        let layers: Vec<&ImageData> = faces.iter().collect();
        let texture = upload_texture(&self.device, &self.queue, label, &layers, TextureKind::Cube)?;
        self.textures.push(texture);
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        self.samplers.push(create_sampler(&self.device, desc));
        Ok(SamplerHandle(self.samplers.len() as u32 - 1))
    }

    fn create_shader(
        &mut self,
        _stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<ShaderHandle> {
        self.pipeline_manager.load_shader(label, source)
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.state.reset();
        self.end_frame();
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state.render_state = state;
    }

    fn set_shader(&mut self, stage: ShaderStage, shader: ShaderHandle) {
        self.state.set_shader(stage, shader);
    }

    fn set_constant_buffer(&mut self, stage: ShaderStage, slot: usize, data: &[u8]) -> Result<()> {
        self.state.set_constants(stage, slot, data)
    }

    fn set_texture(&mut self, slot: usize, texture: TextureHandle) -> Result<()> {
        check_slot("texture", slot, MAX_TEXTURE_SLOTS)?;
        if texture.index() >= self.textures.len() {
            return Err(RenderError::InvalidHandle(format!("{:?}", texture)));
        }
        self.state.set_texture(slot, texture)
    }

    fn set_sampler(&mut self, slot: usize, sampler: SamplerHandle) -> Result<()> {
        check_slot("sampler", slot, MAX_SAMPLER_SLOTS)?;
        if sampler.index() >= self.samplers.len() {
            return Err(RenderError::InvalidHandle(format!("{:?}", sampler)));
        }
        self.state.set_sampler(slot, sampler)
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.state.vertex_buffer = Some(buffer);
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) {
        self.state.index_buffer = Some(buffer);
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        self.state.check_drawable()?;
        let (Some(vertex_shader), Some(pixel_shader), Some(vertex_buffer), Some(index_buffer)) = (
            self.state.vertex_shader,
            self.state.pixel_shader,
            self.state.vertex_buffer,
            self.state.index_buffer,
        ) else {
            return Err(RenderError::IncompleteState("shaders and buffers"));
        };
        self.check_buffer(vertex_buffer, BufferKind::Vertex)?;
        self.check_buffer(index_buffer, BufferKind::Index)?;

        let texture_kinds = self.texture_kinds();
        let pipeline = PipelineKey {
            vertex_shader,
            pixel_shader,
            render_state: self.state.render_state,
            texture_kinds,
        };
        self.pipeline_manager.get_pipeline(&pipeline)?;

        let textures = (self.state.textures, self.state.samplers);
        self.ensure_texture_group(&textures, texture_kinds);

        let vertex_offset = self
            .state
            .vertex_constants
            .as_deref()
            .map_or(0, |data| self.vertex_constants.staging.push(data));
        let pixel_offset = self
            .state
            .pixel_constants
            .as_deref()
            .map_or(0, |data| self.pixel_constants.staging.push(data));

        self.draws.push(DrawCall {
            pipeline,
            textures,
            vertex_offset,
            pixel_offset,
            vertex_buffer,
            index_buffer,
            index_count,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.end_frame();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the surface, skipping frame");
                self.end_frame();
                return Ok(());
            }
            Err(e) => {
                self.end_frame();
                return Err(e.into());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let vertex_grown = self.vertex_constants.upload(&self.device, &self.queue);
        let pixel_grown = self.pixel_constants.upload(&self.device, &self.queue);
        if vertex_grown {
            self.vertex_constant_group = create_constant_group(
                &self.device,
                &self.pipeline_manager,
                &self.vertex_constants,
                "Vertex Constants",
            );
        }
        if pixel_grown {
            self.pixel_constant_group = create_constant_group(
                &self.device,
                &self.pipeline_manager,
                &self.pixel_constants,
                "Pixel Constants",
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for draw in &self.draws {
                let (Some(pipeline), Some(textures)) = (
                    self.pipeline_manager.pipeline(&draw.pipeline),
                    self.texture_groups.get(&draw.textures),
                ) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.vertex_constant_group, &[draw.vertex_offset]);
                render_pass.set_bind_group(1, &self.pixel_constant_group, &[draw.pixel_offset]);
                render_pass.set_bind_group(2, textures, &[]);
                render_pass.set_vertex_buffer(0, self.buffers[draw.vertex_buffer.index()].buffer.slice(..));
                render_pass.set_index_buffer(
                    self.buffers[draw.index_buffer.index()].buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        if let Some(overlay) = self.overlay.as_mut() {
            if let Err(e) = overlay.render_display_only(&self.device, &self.queue, &mut encoder, &view) {
                log::error!("{}", e);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.end_frame();
        Ok(())
    }

    fn bind_render_targets(&mut self) {
        if let Some((width, height)) = self.pending_resize.take() {
            self.apply_resize(width, height);
        }
    }
}

/// Constant blocks hold the largest slot and respect the offset alignment.
fn constant_block_size(alignment: u32) -> usize {
    let alignment = alignment.max(1) as usize;
    MAX_CONSTANT_BYTES.div_ceil(alignment) * alignment
}

/// `Fifo` for vsync, otherwise the lowest-latency mode the surface supports.
fn present_mode_for(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

fn create_constant_group(
    device: &wgpu::Device,
    pipeline_manager: &PipelineManager,
    ring: &ConstantRing,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: pipeline_manager.constant_layout(),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: ring.buffer(),
                offset: 0,
                size: wgpu::BufferSize::new(ring.staging.block_size() as u64),
            }),
        }],
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    layers: &[&ImageData],
    kind: TextureKind,
) -> Result<GpuTexture> {
    let (width, height) = (layers[0].width, layers[0].height);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers.len() as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, image) in layers.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(match kind {
            TextureKind::D2 => wgpu::TextureViewDimension::D2,
            TextureKind::Cube => wgpu::TextureViewDimension::Cube,
        }),
        ..Default::default()
    });

    let out_of_memory = pollster::block_on(device.pop_error_scope());
    let invalid = pollster::block_on(device.pop_error_scope());
    if let Some(error) = out_of_memory.or(invalid) {
        return Err(RenderError::Device(format!("texture '{}': {}", label, error)));
    }

    Ok(GpuTexture {
        _texture: texture,
        view,
        kind,
    })
}

fn create_sampler(device: &wgpu::Device, desc: &SamplerDesc) -> wgpu::Sampler {
    // Anisotropy requires linear filtering on every axis.
    let anisotropy_clamp = if desc.filter == wgpu::FilterMode::Linear {
        desc.anisotropy.max(1)
    } else {
        1
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Sampler"),
        address_mode_u: desc.address_mode,
        address_mode_v: desc.address_mode,
        address_mode_w: desc.address_mode,
        mag_filter: desc.filter,
        min_filter: desc.filter,
        mipmap_filter: desc.filter,
        anisotropy_clamp,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_block_size_respects_alignment() {
        assert_eq!(constant_block_size(256), 512);
        assert_eq!(constant_block_size(64), 512);
        assert_eq!(constant_block_size(1024), 1024);
        assert!(constant_block_size(256) >= MAX_CONSTANT_BYTES);
    }

    #[test]
    fn test_present_mode_selection() {
        use wgpu::PresentMode::*;
        assert_eq!(present_mode_for(true, &[Immediate, Fifo]), Fifo);
        assert_eq!(present_mode_for(false, &[Fifo, Immediate]), Immediate);
        assert_eq!(present_mode_for(false, &[Fifo, Mailbox]), Mailbox);
        assert_eq!(present_mode_for(false, &[Fifo]), Fifo);
    }
}
