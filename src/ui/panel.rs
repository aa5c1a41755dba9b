// src/ui/panel.rs
//! Inspector panel for kiln scenes
//!
//! One window with collapsible sections for app details, cameras, entities,
//! materials and lights. Every edit is applied to the scene immediately and is
//! visible in the frame being built.

use cgmath::{Deg, Rad, Vector3};
use imgui::{Condition, Drag, TreeNodeFlags, Ui};

use crate::gfx::camera::{Camera, ProjectionKind};
use crate::gfx::scene::{Light, MaterialId, Scene};

/// Frame-level values shown (and partly edited) by the inspector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppDetails {
    pub frame_time: f32,
    pub resolution: (u32, u32),
    /// Edited by the panel; the app applies changes to the graphics context.
    pub vsync: bool,
}

/// Selection state kept between frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectorState {
    pub selected_entity: Option<usize>,
    pub selected_material: usize,
}

/// Main inspector window
///
/// # Arguments
/// * `ui` - ImGui UI context
/// * `scene` - Scene being edited
/// * `state` - Selection state kept by the caller
/// * `details` - Frame statistics and app-level toggles
pub fn inspector_panel(
    ui: &Ui,
    scene: &mut Scene,
    state: &mut InspectorState,
    details: &mut AppDetails,
) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_width = (display_size[0] * 0.3).clamp(320.0, 460.0);
    let panel_height = (display_size[1] * 0.85).max(400.0);

    ui.window("Inspector")
        .size([panel_width, panel_height], Condition::FirstUseEver)
        .position([20.0, 20.0], Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_app_details(ui, scene, details);
            render_cameras(ui, scene);
            render_entities(ui, scene, &mut state.selected_entity);
            render_materials(ui, scene, &mut state.selected_material);
            render_lights(ui, scene);
        });
}

fn render_app_details(ui: &Ui, scene: &mut Scene, details: &mut AppDetails) {
    if !ui.collapsing_header("App Details", TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    ui.text(format!(
        "Frame rate: {:.0} fps ({:.2} ms)",
        ui.io().framerate,
        details.frame_time * 1000.0
    ));
    ui.text(format!(
        "Resolution: {}x{}",
        details.resolution.0, details.resolution.1
    ));
    ui.checkbox("VSync", &mut details.vsync);
    ui.color_edit4("Clear color", &mut scene.clear_color);

    let stats = scene.statistics();
    ui.text(format!(
        "{} entities, {} meshes, {} materials",
        stats.entities, stats.meshes, stats.materials
    ));
    ui.text(format!(
        "{} triangles, {} vertices",
        stats.triangles, stats.vertices
    ));
}

fn render_cameras(ui: &Ui, scene: &mut Scene) {
    if !ui.collapsing_header("Cameras", TreeNodeFlags::empty()) {
        return;
    }

    let labels: Vec<String> = scene
        .cameras
        .cameras()
        .iter()
        .enumerate()
        .map(|(i, camera)| camera_label(i, camera))
        .collect();
    let mut active = scene.cameras.active_index();
    if ui.combo_simple_string("Active", &mut active, &labels) {
        if let Err(e) = scene.select_camera(active) {
            log::error!("{}", e);
        }
    }

    let camera = scene.cameras.active_mut();
    let position = camera.transform().position();
    let angles = camera.transform().pitch_yaw_roll();
    ui.text(format!(
        "Position: {:.2}, {:.2}, {:.2}",
        position.x, position.y, position.z
    ));
    ui.text(format!(
        "Pitch {:.1} deg, yaw {:.1} deg",
        Deg::from(Rad(angles.x)).0,
        Deg::from(Rad(angles.y)).0
    ));
    let (near, far) = camera.clip_planes();
    ui.text(format!("Clip planes: {:.2} .. {:.1}", near, far));
    ui.text(format!("Aspect ratio: {:.3}", camera.aspect_ratio()));

    let mut orthographic = camera.projection_kind() == ProjectionKind::Orthographic;
    if ui.checkbox("Orthographic", &mut orthographic) {
        camera.set_projection_kind(if orthographic {
            ProjectionKind::Orthographic
        } else {
            ProjectionKind::Perspective
        });
    }
    if orthographic {
        let mut height = camera.ortho_height();
        if ui.slider("View height", 1.0, 50.0, &mut height) {
            camera.set_ortho_height(height);
        }
    } else {
        let mut fov = camera.fov_degrees();
        if ui.slider("Field of view", 20.0, 120.0, &mut fov) {
            camera.set_fov_degrees(fov);
        }
    }
    ui.slider("Move speed", 0.5, 30.0, &mut camera.movement_speed);
}

fn render_entities(ui: &Ui, scene: &mut Scene, selected: &mut Option<usize>) {
    if !ui.collapsing_header("Entities", TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    if scene.entities().is_empty() {
        ui.text("No entities");
        return;
    }

    ui.child_window("entity_list")
        .size([0.0, 120.0])
        .border(true)
        .build(|| {
            for (i, entity) in scene.entities().iter().enumerate() {
                if ui
                    .selectable_config(&entity.name)
                    .selected(*selected == Some(i))
                    .build()
                {
                    *selected = Some(i);
                }
            }
        });

    let Some(index) = *selected else {
        return;
    };
    let material_names: Vec<String> = scene.materials().iter().map(|m| m.name.clone()).collect();
    let Some(entity) = scene.entity_mut(index) else {
        *selected = None;
        return;
    };

    ui.text(format!("Selected: {}", entity.name));
    let transform = entity.transform_mut();

    let mut position: [f32; 3] = transform.position().into();
    if Drag::new("Position")
        .speed(0.05)
        .build_array(ui, &mut position)
    {
        transform.set_position(position.into());
    }

    let mut rotation = degrees(transform.pitch_yaw_roll());
    if Drag::new("Rotation (deg)")
        .speed(0.5)
        .build_array(ui, &mut rotation)
    {
        transform.set_rotation(radians(rotation));
    }

    let mut scale: [f32; 3] = transform.scale().into();
    if Drag::new("Scale")
        .speed(0.01)
        .range(0.01, 100.0)
        .build_array(ui, &mut scale)
    {
        transform.set_scale(scale.into());
    }

    if ui.button("Reset transform") {
        transform.set_position(Vector3::new(0.0, 0.0, 0.0));
        transform.set_rotation(Vector3::new(0.0, 0.0, 0.0));
        transform.set_scale(Vector3::new(1.0, 1.0, 1.0));
    }

    let mut material = entity.material().index();
    if ui.combo_simple_string("Material", &mut material, &material_names) {
        if let Err(e) = scene.set_entity_material(index, MaterialId(material)) {
            log::error!("{}", e);
        }
    }
}

fn render_materials(ui: &Ui, scene: &mut Scene, selected: &mut usize) {
    if !ui.collapsing_header("Materials", TreeNodeFlags::empty()) {
        return;
    }
    let names: Vec<String> = scene.materials().iter().map(|m| m.name.clone()).collect();
    if names.is_empty() {
        ui.text("No materials");
        return;
    }

    *selected = (*selected).min(names.len() - 1);
    ui.combo_simple_string("Edit", selected, &names);

    let Some(material) = scene.materials_mut().get_mut(*selected) else {
        return;
    };
    ui.color_edit4("Tint", &mut material.color_tint);
    ui.slider("Roughness", 0.0, 1.0, &mut material.roughness);
    Drag::new("UV offset")
        .speed(0.01)
        .build_array(ui, &mut material.uv_offset);
    Drag::new("UV scale")
        .speed(0.05)
        .build_array(ui, &mut material.uv_scale);
    ui.text_disabled("Shared by every entity using this material");
}

fn render_lights(ui: &Ui, scene: &mut Scene) {
    if !ui.collapsing_header("Lights", TreeNodeFlags::empty()) {
        return;
    }

    let mut ambient: [f32; 3] = scene.ambient_light.into();
    if ui.color_edit3("Ambient", &mut ambient) {
        scene.ambient_light = ambient.into();
    }

    for (i, light) in scene.lights.iter_mut().enumerate() {
        let _id = ui.push_id_usize(i);
        let Some(_node) = ui.tree_node(format!("{} light {}", light.type_name(), i)) else {
            continue;
        };
        edit_light(ui, light);
    }
}

fn edit_light(ui: &Ui, light: &mut Light) {
    match light {
        Light::Directional {
            direction,
            color,
            intensity,
        } => {
            edit_vector(ui, "Direction", direction, 0.01);
            edit_color(ui, color);
            ui.slider("Intensity", 0.0, 10.0, intensity);
        }
        Light::Point {
            position,
            range,
            color,
            intensity,
        } => {
            edit_vector(ui, "Position", position, 0.05);
            ui.slider("Range", 0.1, 50.0, range);
            edit_color(ui, color);
            ui.slider("Intensity", 0.0, 10.0, intensity);
        }
        Light::Spot {
            position,
            direction,
            range,
            color,
            intensity,
            inner_angle,
            outer_angle,
        } => {
            edit_vector(ui, "Position", position, 0.05);
            edit_vector(ui, "Direction", direction, 0.01);
            ui.slider("Range", 0.1, 50.0, range);
            edit_color(ui, color);
            ui.slider("Intensity", 0.0, 10.0, intensity);

            let mut inner = Deg::from(Rad(*inner_angle)).0;
            let mut outer = Deg::from(Rad(*outer_angle)).0;
            let changed = ui.slider("Inner angle", 0.0, 89.0, &mut inner)
                | ui.slider("Outer angle", 0.0, 89.0, &mut outer);
            if changed {
                let (inner, outer) = ordered_cone(inner, outer);
                *inner_angle = Rad::from(Deg(inner)).0;
                *outer_angle = Rad::from(Deg(outer)).0;
            }
        }
    }
}

fn edit_vector(ui: &Ui, label: &str, value: &mut Vector3<f32>, speed: f32) {
    let mut array: [f32; 3] = (*value).into();
    if Drag::new(label).speed(speed).build_array(ui, &mut array) {
        *value = array.into();
    }
}

fn edit_color(ui: &Ui, color: &mut Vector3<f32>) {
    let mut array: [f32; 3] = (*color).into();
    if ui.color_edit3("Color", &mut array) {
        *color = array.into();
    }
}

fn camera_label(index: usize, camera: &Camera) -> String {
    format!("Camera {} ({})", index, camera.projection_kind().name())
}

fn degrees(angles: Vector3<f32>) -> [f32; 3] {
    [
        Deg::from(Rad(angles.x)).0,
        Deg::from(Rad(angles.y)).0,
        Deg::from(Rad(angles.z)).0,
    ]
}

fn radians(angles: [f32; 3]) -> Vector3<f32> {
    Vector3::new(
        Rad::from(Deg(angles[0])).0,
        Rad::from(Deg(angles[1])).0,
        Rad::from(Deg(angles[2])).0,
    )
}

/// Keeps the inner cone inside the outer one.
fn ordered_cone(inner: f32, outer: f32) -> (f32, f32) {
    (inner.min(outer), outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_conversion_round_trip() {
        let angles = Vector3::new(0.3, -1.2, 2.0);
        let back = radians(degrees(angles));
        assert!((back.x - angles.x).abs() < 1e-5);
        assert!((back.y - angles.y).abs() < 1e-5);
        assert!((back.z - angles.z).abs() < 1e-5);
    }

    #[test]
    fn test_cone_ordering() {
        assert_eq!(ordered_cone(10.0, 20.0), (10.0, 20.0));
        assert_eq!(ordered_cone(30.0, 20.0), (20.0, 20.0));
    }

    #[test]
    fn test_camera_label() {
        let camera = Camera::new(1.0, Vector3::new(0.0, 0.0, 0.0), 60.0, 1.0, 1.0)
            .with_projection(ProjectionKind::Orthographic);
        assert_eq!(camera_label(2, &camera), "Camera 2 (Orthographic)");
    }
}
