//! Default scene shown by the `kiln` binary
//!
//! Assets are looked up under [`AppConfig::asset_root`]. Anything missing is
//! logged and replaced: textures by generated images, the sky by gradient faces,
//! and OBJ models are simply left out. The demo therefore runs from an empty
//! directory.

use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use cgmath::{Deg, Rad, Vector3};

use crate::config::AppConfig;
use crate::error::Result;
use crate::gfx::camera::{Camera, CameraManager, ProjectionKind};
use crate::gfx::geometry::{generate_cube, generate_plane, generate_sphere};
use crate::gfx::rendering::context::{GraphicsContext, SamplerHandle, TextureHandle};
use crate::gfx::resources::material::{Material, ALBEDO_SLOT, NORMAL_SLOT};
use crate::gfx::resources::shader::ShaderProgram;
use crate::gfx::resources::texture_resource::{ImageData, SamplerDesc};
use crate::gfx::scene::{Animation, Entity, Light, Mesh, MeshId, Scene};
use crate::gfx::sky::Sky;

/// OBJ models placed in a row behind the primitives when present.
const MODEL_FILES: [&str; 3] = ["helix.obj", "torus.obj", "cylinder.obj"];

pub fn build_demo_scene(ctx: &mut dyn GraphicsContext, config: &AppConfig) -> Result<Scene> {
    let mut scene = Scene::new(demo_cameras(config));
    scene.clear_color = config.clear_color;
    scene.ambient_light = config.ambient_light;

    let standard = ShaderProgram::standard(ctx)?;
    let wrap = ctx.create_sampler(&SamplerDesc::wrap_linear())?;
    let clamp = ctx.create_sampler(&SamplerDesc::clamp_linear())?;

    // Meshes
    let cube = scene.add_mesh(Mesh::from_geometry(ctx, "Cube", &generate_cube())?);
    let sphere = scene.add_mesh(Mesh::from_geometry(ctx, "Sphere", &generate_sphere(32, 16))?);
    let ground = scene.add_mesh(Mesh::from_geometry(
        ctx,
        "Ground",
        &generate_plane(20.0, 20.0, 4, 4),
    )?);

    // Materials
    let brick_albedo = load_texture_or(
        ctx,
        &config.texture("brick.png"),
        ImageData::checkerboard(64, 4, [170, 74, 68, 255], [120, 50, 45, 255]),
    )?;
    let brick_normal = load_texture_or(
        ctx,
        &config.texture("brick_normals.png"),
        ImageData::solid([128, 128, 255, 255]),
    )?;
    let flat_normal = ctx.create_texture("Flat Normal", &ImageData::solid([128, 128, 255, 255]))?;
    let stone_albedo = load_texture_or(
        ctx,
        &config.texture("cobblestone.png"),
        ImageData::checkerboard(64, 8, [150, 150, 150, 255], [90, 90, 90, 255]),
    )?;

    let brick = scene.add_material(textured(
        Material::new("Brick", [1.0, 1.0, 1.0, 1.0], 0.6, standard),
        brick_albedo,
        brick_normal,
        wrap,
    )?);
    let stone = scene.add_material(textured(
        Material::new("Stone", [1.0, 1.0, 1.0, 1.0], 0.9, standard).with_uv_scale([8.0, 8.0]),
        stone_albedo,
        flat_normal,
        wrap,
    )?);
    let gold = scene.add_material(textured(
        Material::new("Gold", [1.0, 0.8, 0.3, 1.0], 0.2, standard),
        stone_albedo,
        flat_normal,
        clamp,
    )?);

    // Entities
    scene.add_entity(
        Entity::new("Ground", ground, stone).with_position(Vector3::new(0.0, -1.0, 0.0)),
    )?;
    scene.add_entity(
        Entity::new("Spinning Cube", cube, brick)
            .with_position(Vector3::new(-2.0, 0.0, 0.0))
            .with_animation(Animation::Spin { rate: 0.8 }),
    )?;
    let sphere_origin = Vector3::new(2.0, 0.5, 0.0);
    scene.add_entity(
        Entity::new("Bobbing Sphere", sphere, gold)
            .with_position(sphere_origin)
            .with_animation(Animation::Bob {
                axis: Vector3::unit_y(),
                amplitude: 0.5,
                frequency: 0.25,
                origin: sphere_origin,
            }),
    )?;
    scene.add_entity(
        Entity::new("Tall Cube", cube, stone)
            .with_position(Vector3::new(0.0, 0.5, 3.0))
            .with_scale(Vector3::new(0.5, 3.0, 0.5)),
    )?;

    for (i, file) in MODEL_FILES.iter().enumerate() {
        let path = config.model(file);
        let mesh = match Mesh::from_obj(ctx, &path) {
            Ok(mesh) => scene.add_mesh(mesh),
            Err(e) => {
                log::warn!("Skipping model: {}", e);
                continue;
            }
        };
        let material = if i % 2 == 0 { brick } else { gold };
        scene.add_entity(
            Entity::new(file, mesh, material)
                .with_position(Vector3::new(-3.0 + 3.0 * i as f32, 1.0, 6.0))
                .with_animation(Animation::Spin { rate: 0.3 }),
        )?;
    }

    // Lights
    scene.lights.add(Light::Directional {
        direction: Vector3::new(1.0, -1.0, 1.0),
        color: Vector3::new(1.0, 0.95, 0.85),
        intensity: 1.0,
    })?;
    scene.lights.add(Light::Point {
        position: Vector3::new(0.0, 2.0, -1.5),
        range: 8.0,
        color: Vector3::new(1.0, 0.4, 0.2),
        intensity: 1.5,
    })?;
    scene.lights.add(Light::Spot {
        position: Vector3::new(0.0, 5.0, 3.0),
        direction: Vector3::new(0.0, -1.0, 0.0),
        range: 10.0,
        color: Vector3::new(0.3, 0.5, 1.0),
        intensity: 2.0,
        inner_angle: Rad::from(Deg(15.0)).0,
        outer_angle: Rad::from(Deg(30.0)).0,
    })?;

    // Sky
    let sky_shaders = ShaderProgram::sky(ctx)?;
    let sky_mesh = scene.add_mesh(Mesh::from_geometry(ctx, "Sky Cube", &generate_cube())?);
    let sky = load_sky(ctx, &config.sky_dir(), clamp, sky_shaders, sky_mesh)?;
    scene.set_sky(Some(sky));

    let stats = scene.statistics();
    log::info!(
        "Demo scene ready: {} entities, {} meshes, {} materials, {} lights",
        stats.entities,
        stats.meshes,
        stats.materials,
        stats.lights
    );
    Ok(scene)
}

fn demo_cameras(config: &AppConfig) -> CameraManager {
    let aspect = config.aspect_ratio();
    let settings = config.camera;
    let main = Camera::new(
        aspect,
        Vector3::new(0.0, 1.5, -8.0),
        settings.fov_degrees,
        settings.movement_speed,
        settings.mouse_sensitivity,
    )
    .with_clip_planes(settings.near_clip, settings.far_clip);

    let mut cameras = CameraManager::new(main);

    let mut overhead = Camera::new(
        aspect,
        Vector3::new(0.0, 12.0, -12.0),
        settings.fov_degrees,
        settings.movement_speed,
        settings.mouse_sensitivity,
    )
    .with_clip_planes(settings.near_clip, settings.far_clip)
    .with_projection(ProjectionKind::Orthographic);
    overhead.set_rotation(FRAC_PI_4, 0.0);
    cameras.add(overhead);

    let wide = Camera::new(
        aspect,
        Vector3::new(-6.0, 1.0, -6.0),
        90.0,
        settings.movement_speed,
        settings.mouse_sensitivity,
    )
    .with_clip_planes(settings.near_clip, settings.far_clip);
    cameras.add(wide);

    cameras
}

/// Fills every slot the standard shader samples, so no binding is inherited
/// from the previously drawn entity.
fn textured(
    mut material: Material,
    albedo: TextureHandle,
    normal: TextureHandle,
    sampler: SamplerHandle,
) -> Result<Material> {
    material.add_texture(ALBEDO_SLOT, albedo)?;
    material.add_texture(NORMAL_SLOT, normal)?;
    material.add_sampler(0, sampler)?;
    Ok(material)
}

/// Loads `path`, or uploads `fallback` when the file is missing or unreadable.
pub fn load_texture_or(
    ctx: &mut dyn GraphicsContext,
    path: &Path,
    fallback: ImageData,
) -> Result<TextureHandle> {
    let label = path.to_string_lossy();
    match ImageData::load(path) {
        Ok(image) => ctx.create_texture(&label, &image),
        Err(e) => {
            log::warn!("Using generated texture: {}", e);
            ctx.create_texture(&label, &fallback)
        }
    }
}

/// Six gradient faces, light overhead and dark below.
pub fn gradient_sky_faces() -> [ImageData; 6] {
    const ZENITH: [u8; 4] = [70, 120, 200, 255];
    const HORIZON: [u8; 4] = [200, 220, 240, 255];
    const GROUND: [u8; 4] = [60, 55, 50, 255];
    let side = ImageData::vertical_gradient(64, ZENITH, GROUND);
    [
        side.clone(),
        side.clone(),
        ImageData::vertical_gradient(64, ZENITH, HORIZON),
        ImageData::vertical_gradient(64, GROUND, GROUND),
        side.clone(),
        side,
    ]
}

fn load_sky(
    ctx: &mut dyn GraphicsContext,
    dir: &Path,
    sampler: SamplerHandle,
    shaders: ShaderProgram,
    mesh: MeshId,
) -> Result<Sky> {
    match Sky::from_directory(ctx, dir, sampler, shaders, mesh) {
        Ok(sky) => Ok(sky),
        Err(e) => {
            log::warn!("Using generated sky: {}", e);
            Sky::new(ctx, &gradient_sky_faces(), sampler, shaders, mesh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::recording::{Command, RecordingContext};
    use crate::gfx::resources::texture_resource::validate_cubemap_faces;

    fn empty_config() -> AppConfig {
        AppConfig::default().with_asset_root("no/such/assets")
    }

    #[test]
    fn test_builds_from_empty_asset_root() {
        let mut ctx = RecordingContext::new();
        let scene = build_demo_scene(&mut ctx, &empty_config()).unwrap();

        let stats = scene.statistics();
        assert_eq!(stats.entities, 4);
        assert_eq!(stats.lights, 3);
        assert_eq!(scene.cameras.len(), 3);
        assert!(scene.sky().is_some());
    }

    #[test]
    fn test_demo_scene_draws_every_entity_then_sky() {
        let mut ctx = RecordingContext::new();
        let scene = build_demo_scene(&mut ctx, &empty_config()).unwrap();

        ctx.clear_log();
        scene.draw(&mut ctx, 0.0).unwrap();

        assert_eq!(ctx.draws().len(), scene.entities().len() + 1);
        assert_eq!(ctx.frames_presented(), 1);
        assert_eq!(ctx.commands().last(), Some(&Command::BindRenderTargets));
    }

    #[test]
    fn test_every_draw_binds_albedo_and_normal() {
        let mut ctx = RecordingContext::new();
        let scene = build_demo_scene(&mut ctx, &empty_config()).unwrap();
        scene.render(&mut ctx, 0.0).unwrap();

        let entity_draws = &ctx.draws()[..scene.entities().len()];
        for draw in entity_draws {
            assert!(draw.state.textures[ALBEDO_SLOT].is_some());
            assert!(draw.state.textures[NORMAL_SLOT].is_some());
            assert!(draw.state.samplers[0].is_some());
        }
    }

    #[test]
    fn test_texture_fallback() {
        let mut ctx = RecordingContext::new();
        let handle = load_texture_or(
            &mut ctx,
            Path::new("missing.png"),
            ImageData::solid([1, 2, 3, 4]),
        )
        .unwrap();
        assert_eq!(ctx.textures()[handle.index()].size, (1, 1));
    }

    #[test]
    fn test_gradient_faces_form_valid_cubemap() {
        assert_eq!(validate_cubemap_faces(&gradient_sky_faces()).unwrap(), 64);
    }
}
