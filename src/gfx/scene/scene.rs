use bytemuck::bytes_of;
use cgmath::Vector3;
use winit::keyboard::KeyCode;

use super::entity::Entity;
use super::light::LightSet;
use super::mesh::Mesh;
use crate::error::{RenderError, Result};
use crate::gfx::camera::camera_utils::CameraManager;
use crate::gfx::math::matrix_to_array;
use crate::gfx::rendering::context::{GraphicsContext, RenderState, ShaderStage};
use crate::gfx::resources::material::Material;
use crate::gfx::resources::shader_data::{PixelShaderData, VertexShaderData};
use crate::gfx::sky::Sky;
use crate::input::InputState;

/// Index of a mesh in its scene. Stable for the scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Index of a material in its scene. Stable for the scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MeshId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl MaterialId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What the main loop should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Quit,
}

/// Counts shown by the inspector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStatistics {
    pub entities: usize,
    pub meshes: usize,
    pub materials: usize,
    pub lights: usize,
    /// Triangles submitted per frame, sky excluded.
    pub triangles: u32,
    pub vertices: u32,
}

pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.4, 0.6, 0.75, 1.0];

/// Main scene: meshes, materials, entities, lights, cameras and sky
///
/// Meshes and materials live in arenas and are shared by id. Entities reference
/// them by [`MeshId`] and [`MaterialId`], so editing a material changes every
/// entity using it while reassigning an entity's material affects only that
/// entity.
pub struct Scene {
    pub cameras: CameraManager,
    pub lights: LightSet,
    pub ambient_light: Vector3<f32>,
    pub clear_color: [f32; 4],
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    entities: Vec<Entity>,
    sky: Option<Sky>,
}

impl Scene {
    pub fn new(cameras: CameraManager) -> Self {
        Self {
            cameras,
            lights: LightSet::new(),
            ambient_light: Vector3::new(0.1, 0.1, 0.15),
            clear_color: DEFAULT_CLEAR_COLOR,
            meshes: Vec::new(),
            materials: Vec::new(),
            entities: Vec::new(),
            sky: None,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Adds an entity after checking that its mesh and material exist.
    pub fn add_entity(&mut self, entity: Entity) -> Result<usize> {
        self.check_mesh(entity.mesh())?;
        self.check_material(entity.material())?;
        self.entities.push(entity);
        Ok(self.entities.len() - 1)
    }

    pub fn set_sky(&mut self, sky: Option<Sky>) {
        self.sky = sky;
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.sky.as_ref()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn entity(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    /// Points one entity at another material, leaving the others untouched.
    pub fn set_entity_material(&mut self, entity: usize, material: MaterialId) -> Result<()> {
        self.check_material(material)?;
        let count = self.entities.len();
        let entity = self
            .entities
            .get_mut(entity)
            .ok_or_else(|| RenderError::InvalidHandle(format!("entity {} of {}", entity, count)))?;
        entity.set_material(material);
        Ok(())
    }

    pub fn select_camera(&mut self, index: usize) -> Result<()> {
        self.cameras.select(index)?;
        log::info!("Active camera: {}", index);
        Ok(())
    }

    /// Advances animations and the active camera. Escape asks the loop to quit.
    pub fn update(&mut self, dt: f32, total_time: f32, input: &InputState) -> FrameControl {
        if input.key_down(KeyCode::Escape) {
            return FrameControl::Quit;
        }

        for entity in &mut self.entities {
            entity.animate(dt, total_time);
        }
        self.cameras.update(dt, input);

        FrameControl::Continue
    }

    /// Renders one frame and shows it.
    pub fn draw(&self, ctx: &mut dyn GraphicsContext, total_time: f32) -> Result<()> {
        self.render(ctx, total_time)?;
        ctx.present()?;
        ctx.bind_render_targets();
        Ok(())
    }

    /// Clears, draws every entity and then the sky, without presenting.
    ///
    /// Each entity rebinds its complete state: material shaders, vertex and
    /// pixel constants, textures and samplers, then geometry. Nothing carries
    /// over from the previous entity except what it overwrites.
    pub fn render(&self, ctx: &mut dyn GraphicsContext, total_time: f32) -> Result<()> {
        ctx.clear(self.clear_color);
        ctx.set_render_state(RenderState::Opaque);

        let camera = self.cameras.active();
        let view = matrix_to_array(camera.view_matrix());
        let projection = matrix_to_array(camera.projection_matrix());
        let camera_position: [f32; 3] = camera.transform().position().into();
        let lights = self.lights.records();
        let light_count = self.lights.active_count();

        for entity in &self.entities {
            let material = self.material_for(entity)?;
            material.bind_shaders(ctx);

            let vertex_data = VertexShaderData {
                world: matrix_to_array(entity.transform().world_matrix()),
                view,
                projection,
                world_inverse_transpose: matrix_to_array(
                    entity.transform().world_inverse_transpose_matrix(),
                ),
            };
            ctx.set_constant_buffer(ShaderStage::Vertex, 0, bytes_of(&vertex_data))?;

            let pixel_data = PixelShaderData {
                color_tint: material.color_tint,
                uv_offset: material.uv_offset,
                uv_scale: material.uv_scale,
                camera_position,
                roughness: material.roughness,
                ambient_light: self.ambient_light.into(),
                time: total_time,
                lights,
                light_count,
                padding: [0; 3],
            };
            ctx.set_constant_buffer(ShaderStage::Pixel, 0, bytes_of(&pixel_data))?;

            material.bind_textures_and_samplers(ctx)?;
            entity.draw(ctx, &self.meshes)?;
        }

        if let Some(sky) = &self.sky {
            sky.draw(ctx, camera, &self.meshes)?;
        }
        Ok(())
    }

    /// Refreshes every camera's projection. A zero-height (minimized) window is ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.cameras.on_resize(width as f32 / height as f32);
    }

    pub fn statistics(&self) -> SceneStatistics {
        let mut stats = SceneStatistics {
            entities: self.entities.len(),
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            lights: self.lights.len(),
            ..Default::default()
        };
        for entity in &self.entities {
            if let Some(mesh) = self.mesh(entity.mesh()) {
                stats.triangles += mesh.index_count() / 3;
                stats.vertices += mesh.vertex_count();
            }
        }
        stats
    }

    fn material_for(&self, entity: &Entity) -> Result<&Material> {
        self.material(entity.material())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{:?}", entity.material())))
    }

    fn check_mesh(&self, id: MeshId) -> Result<()> {
        if id.0 >= self.meshes.len() {
            return Err(RenderError::InvalidHandle(format!("{:?}", id)));
        }
        Ok(())
    }

    fn check_material(&self, id: MaterialId) -> Result<()> {
        if id.0 >= self.materials.len() {
            return Err(RenderError::InvalidHandle(format!("{:?}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::Camera;
    use crate::gfx::geometry::primitives::{generate_cube, generate_sphere};
    use crate::gfx::math::tests::approx_mat;
    use crate::gfx::rendering::context::TextureHandle;
    use crate::gfx::rendering::recording::{Command, RecordingContext};
    use crate::gfx::resources::material::ALBEDO_SLOT;
    use crate::gfx::resources::shader::ShaderProgram;
    use crate::gfx::resources::texture_resource::{ImageData, SamplerDesc};
    use crate::gfx::scene::light::Light;

    struct Fixture {
        ctx: RecordingContext,
        scene: Scene,
        red: MaterialId,
        blue: MaterialId,
        red_texture: TextureHandle,
        blue_texture: TextureHandle,
    }

    fn fixture() -> Fixture {
        let mut ctx = RecordingContext::new();
        let camera = Camera::new(16.0 / 9.0, Vector3::new(0.0, 1.0, -5.0), 60.0, 3.0, 1.0);
        let mut scene = Scene::new(CameraManager::new(camera));

        let shaders = ShaderProgram::standard(&mut ctx).unwrap();
        let sampler = ctx.create_sampler(&SamplerDesc::default()).unwrap();
        let red_texture = ctx.create_texture("red", &ImageData::solid([255, 0, 0, 255])).unwrap();
        let blue_texture = ctx.create_texture("blue", &ImageData::solid([0, 0, 255, 255])).unwrap();

        let mut red = Material::new("red", [1.0, 0.0, 0.0, 1.0], 0.2, shaders);
        red.add_texture(ALBEDO_SLOT, red_texture).unwrap();
        red.add_sampler(0, sampler).unwrap();
        let mut blue = Material::new("blue", [0.0, 0.0, 1.0, 1.0], 0.8, shaders).with_uv_scale([2.0, 2.0]);
        blue.add_texture(ALBEDO_SLOT, blue_texture).unwrap();
        blue.add_sampler(0, sampler).unwrap();

        let red = scene.add_material(red);
        let blue = scene.add_material(blue);
        let cube = scene.add_mesh(Mesh::from_geometry(&mut ctx, "cube", &generate_cube()).unwrap());
        let sphere =
            scene.add_mesh(Mesh::from_geometry(&mut ctx, "sphere", &generate_sphere(8, 6)).unwrap());

        scene
            .add_entity(Entity::new("a", cube, red).with_position(Vector3::new(-1.0, 0.0, 0.0)))
            .unwrap();
        scene
            .add_entity(Entity::new("b", sphere, blue).with_position(Vector3::new(1.0, 0.0, 0.0)))
            .unwrap();
        scene
            .add_entity(Entity::new("c", cube, red).with_position(Vector3::new(0.0, 2.0, 0.0)))
            .unwrap();

        scene
            .lights
            .add(Light::Directional {
                direction: Vector3::new(1.0, -1.0, 0.0),
                color: Vector3::new(1.0, 1.0, 1.0),
                intensity: 1.0,
            })
            .unwrap();

        let sky_shaders = ShaderProgram::sky(&mut ctx).unwrap();
        let faces: [ImageData; 6] = std::array::from_fn(|_| ImageData::solid([90, 140, 200, 255]));
        let sky_mesh = scene.add_mesh(Mesh::from_geometry(&mut ctx, "sky", &generate_cube()).unwrap());
        let sky = Sky::new(&mut ctx, &faces, sampler, sky_shaders, sky_mesh).unwrap();
        scene.set_sky(Some(sky));

        ctx.clear_log();
        Fixture {
            ctx,
            scene,
            red,
            blue,
            red_texture,
            blue_texture,
        }
    }

    fn pixel_data(bytes: &Option<Vec<u8>>) -> PixelShaderData {
        bytemuck::pod_read_unaligned(bytes.as_ref().unwrap())
    }

    fn vertex_data(bytes: &Option<Vec<u8>>) -> VertexShaderData {
        bytemuck::pod_read_unaligned(bytes.as_ref().unwrap())
    }

    #[test]
    fn test_frame_order() {
        let mut f = fixture();
        f.scene.draw(&mut f.ctx, 0.0).unwrap();

        let commands = f.ctx.commands();
        assert_eq!(commands.first(), Some(&Command::Clear(DEFAULT_CLEAR_COLOR)));
        assert_eq!(commands[commands.len() - 2], Command::Present);
        assert_eq!(commands[commands.len() - 1], Command::BindRenderTargets);

        // Three entities, then the sky.
        let draws = f.ctx.draws();
        assert_eq!(draws.len(), 4);
        assert!(draws[..3].iter().all(|d| d.state.render_state == RenderState::Opaque));
        assert_eq!(draws[3].state.render_state, RenderState::Sky);
        assert_eq!(f.ctx.frames_presented(), 1);
    }

    #[test]
    fn test_per_entity_state_isolation() {
        let mut f = fixture();
        f.scene.render(&mut f.ctx, 1.5).unwrap();
        let draws = f.ctx.draws();

        assert_eq!(draws[0].state.textures[ALBEDO_SLOT], Some(f.red_texture));
        assert_eq!(draws[1].state.textures[ALBEDO_SLOT], Some(f.blue_texture));
        assert_eq!(draws[2].state.textures[ALBEDO_SLOT], Some(f.red_texture));

        let first = pixel_data(&draws[0].state.pixel_constants);
        let second = pixel_data(&draws[1].state.pixel_constants);
        assert_eq!(first.color_tint, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(second.color_tint, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(second.uv_scale, [2.0, 2.0]);
        assert_eq!(second.time, 1.5);

        for (draw, entity) in draws.iter().zip(f.scene.entities()) {
            let data = vertex_data(&draw.state.vertex_constants);
            assert_eq!(data.world, matrix_to_array(entity.transform().world_matrix()));
        }
    }

    #[test]
    fn test_shared_material_edits_reach_every_user() {
        let mut f = fixture();
        f.scene.material_mut(f.red).unwrap().color_tint = [0.5, 0.5, 0.5, 1.0];
        f.scene.render(&mut f.ctx, 0.0).unwrap();
        let draws = f.ctx.draws();

        let a = pixel_data(&draws[0].state.pixel_constants);
        let c = pixel_data(&draws[2].state.pixel_constants);
        assert_eq!(a.color_tint, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(a.color_tint, c.color_tint);
    }

    #[test]
    fn test_reassigning_material_is_per_entity() {
        let mut f = fixture();
        f.scene.set_entity_material(0, f.blue).unwrap();
        f.scene.render(&mut f.ctx, 0.0).unwrap();
        let draws = f.ctx.draws();

        assert_eq!(draws[0].state.textures[ALBEDO_SLOT], Some(f.blue_texture));
        assert_eq!(draws[2].state.textures[ALBEDO_SLOT], Some(f.red_texture));
        assert!(f.scene.set_entity_material(0, MaterialId(9)).is_err());
    }

    #[test]
    fn test_lights_and_camera_reach_pixel_data() {
        let mut f = fixture();
        f.scene.render(&mut f.ctx, 0.0).unwrap();
        let data = pixel_data(&f.ctx.draws()[0].state.pixel_constants);
        assert_eq!(data.camera_position, [0.0, 1.0, -5.0]);
        assert_eq!(data.lights[0], f.scene.lights.records()[0]);
        assert_eq!(data.lights[1].intensity, 0.0);
        assert_eq!(data.light_count, f.scene.lights.len() as u32);
    }

    #[test]
    fn test_light_count_tracks_removals() {
        let mut f = fixture();
        let before = f.scene.lights.len() as u32;
        f.scene.lights.remove(0);
        f.scene.render(&mut f.ctx, 0.0).unwrap();
        let data = pixel_data(&f.ctx.draws()[0].state.pixel_constants);
        assert_eq!(data.light_count, before - 1);
    }

    #[test]
    fn test_resize_updates_projections_only() {
        let mut f = fixture();
        let second = Camera::new(1.0, Vector3::new(4.0, 0.0, 0.0), 90.0, 1.0, 1.0);
        f.scene.cameras.add(second);
        let views: Vec<_> = f.scene.cameras.cameras().iter().map(|c| c.view_matrix()).collect();

        f.scene.on_resize(800, 400);
        for (camera, view) in f.scene.cameras.cameras().iter().zip(views) {
            assert_eq!(camera.aspect_ratio(), 2.0);
            assert!(approx_mat(camera.view_matrix(), view));
        }

        f.scene.on_resize(800, 0);
        assert_eq!(f.scene.cameras.active().aspect_ratio(), 2.0);
    }

    #[test]
    fn test_escape_quits() {
        let mut f = fixture();
        let mut input = InputState::new();
        assert_eq!(f.scene.update(0.016, 0.016, &input), FrameControl::Continue);
        input.set_key(KeyCode::Escape, true);
        assert_eq!(f.scene.update(0.016, 0.032, &input), FrameControl::Quit);
    }

    #[test]
    fn test_entity_with_unknown_ids_rejected() {
        let mut f = fixture();
        assert!(f
            .scene
            .add_entity(Entity::new("bad", MeshId(42), f.red))
            .is_err());
        assert!(f
            .scene
            .add_entity(Entity::new("bad", MeshId(0), MaterialId(42)))
            .is_err());
        assert_eq!(f.scene.entities().len(), 3);
    }

    #[test]
    fn test_statistics() {
        let f = fixture();
        let stats = f.scene.statistics();
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.meshes, 3);
        assert_eq!(stats.materials, 2);
        assert_eq!(stats.lights, 1);
        assert_eq!(stats.triangles, 12 + 8 * 6 * 2 + 12);
    }

    #[test]
    fn test_select_camera_out_of_range() {
        let mut f = fixture();
        assert!(matches!(
            f.scene.select_camera(3),
            Err(RenderError::CameraIndex { index: 3, count: 1 })
        ));
        assert_eq!(f.scene.cameras.active_index(), 0);
    }
}
