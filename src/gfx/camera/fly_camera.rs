//! Free-flying first person camera
//!
//! The camera owns a [`Transform`] and derives a left-handed view matrix from its
//! position and basis vectors. Horizontal movement follows the camera's local
//! axes, vertical movement is in world space, and the mouse only steers while the
//! left button is held.

use cgmath::{Deg, Matrix4, Rad, Vector3, Zero};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::gfx::math::{look_to_lh, orthographic_lh, perspective_fov_lh};
use crate::gfx::transform::Transform;
use crate::input::InputState;

/// Mouse deltas are scaled by this before sensitivity is applied.
const LOOK_SCALE: f32 = 0.01;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

impl ProjectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Perspective => "Perspective",
            ProjectionKind::Orthographic => "Orthographic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    fov: Rad<f32>,
    near_clip: f32,
    far_clip: f32,
    aspect_ratio: f32,
    ortho_height: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    projection_kind: ProjectionKind,
}

impl Camera {
    /// Creates a perspective camera looking down +Z.
    ///
    /// # Arguments
    /// * `aspect_ratio` - Output width divided by height
    /// * `position` - World position of the eye
    /// * `fov_degrees` - Vertical field of view
    /// * `movement_speed` - Units per second
    /// * `mouse_sensitivity` - Look speed multiplier
    pub fn new(
        aspect_ratio: f32,
        position: Vector3<f32>,
        fov_degrees: f32,
        movement_speed: f32,
        mouse_sensitivity: f32,
    ) -> Self {
        let mut transform = Transform::new();
        transform.set_position(position);

        let mut camera = Self {
            transform,
            view: Matrix4::zero(),
            projection: Matrix4::zero(),
            fov: Deg(fov_degrees).into(),
            near_clip: 0.1,
            far_clip: 100.0,
            aspect_ratio,
            ortho_height: 10.0,
            movement_speed,
            mouse_sensitivity,
            projection_kind: ProjectionKind::Perspective,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix(aspect_ratio);
        camera
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near_clip = near;
        self.far_clip = far;
        self.update_projection_matrix(self.aspect_ratio);
        self
    }

    pub fn with_projection(mut self, kind: ProjectionKind) -> Self {
        self.set_projection_kind(kind);
        self
    }

    /// Applies one frame of keyboard and mouse input.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        let speed = self.movement_speed * dt;

        let mut local = Vector3::zero();
        if input.key_down(KeyCode::KeyW) {
            local.z += speed;
        }
        if input.key_down(KeyCode::KeyS) {
            local.z -= speed;
        }
        if input.key_down(KeyCode::KeyA) {
            local.x -= speed;
        }
        if input.key_down(KeyCode::KeyD) {
            local.x += speed;
        }
        if local != Vector3::zero() {
            self.transform.move_relative(local);
        }

        let mut vertical = 0.0;
        if input.key_down(KeyCode::Space) {
            vertical += speed;
        }
        if input.key_down(KeyCode::ShiftLeft) {
            vertical -= speed;
        }
        if vertical != 0.0 {
            self.transform
                .move_absolute(Vector3::new(0.0, vertical, 0.0));
        }

        if input.mouse_button_down(MouseButton::Left) {
            let (dx, dy) = input.mouse_delta();
            self.look(dx, dy);
        }

        self.update_view_matrix();
    }

    /// Turns the camera by a mouse delta; x drives yaw and y drives pitch.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let scale = self.mouse_sensitivity * LOOK_SCALE;
        self.transform
            .rotate(Vector3::new(dy * scale, dx * scale, 0.0));

        let rotation = self.transform.pitch_yaw_roll();
        let clamped = rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        if clamped != rotation.x {
            self.transform
                .set_rotation(Vector3::new(clamped, rotation.y, rotation.z));
        }
        self.update_view_matrix();
    }

    pub fn update_view_matrix(&mut self) {
        self.view = look_to_lh(
            self.transform.position(),
            self.transform.forward(),
            self.transform.up(),
        );
    }

    /// Rebuilds the projection for a new output aspect ratio.
    pub fn update_projection_matrix(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.projection = match self.projection_kind {
            ProjectionKind::Perspective => self.perspective_matrix(),
            ProjectionKind::Orthographic => orthographic_lh(
                self.ortho_height * aspect_ratio,
                self.ortho_height,
                self.near_clip,
                self.far_clip,
            ),
        };
    }

    /// Perspective projection for the current settings, whatever the active kind.
    pub fn perspective_matrix(&self) -> Matrix4<f32> {
        perspective_fov_lh(self.fov, self.aspect_ratio, self.near_clip, self.far_clip)
    }

    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov = Deg(degrees).into();
        self.update_projection_matrix(self.aspect_ratio);
    }

    pub fn set_ortho_height(&mut self, height: f32) {
        self.ortho_height = height;
        self.update_projection_matrix(self.aspect_ratio);
    }

    pub fn set_projection_kind(&mut self, kind: ProjectionKind) {
        self.projection_kind = kind;
        self.update_projection_matrix(self.aspect_ratio);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.set_position(position);
        self.update_view_matrix();
    }

    /// Points the camera with explicit pitch and yaw in radians.
    pub fn set_rotation(&mut self, pitch: f32, yaw: f32) {
        self.transform.set_rotation(Vector3::new(
            pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            yaw,
            0.0,
        ));
        self.update_view_matrix();
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn projection_kind(&self) -> ProjectionKind {
        self.projection_kind
    }

    pub fn fov_degrees(&self) -> f32 {
        Deg::from(self.fov).0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn ortho_height(&self) -> f32 {
        self.ortho_height
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near_clip, self.far_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::gfx::math::tests::{approx, approx_mat, approx_vec};

    fn camera() -> Camera {
        Camera::new(16.0 / 9.0, Vector3::new(0.0, 0.0, -5.0), 60.0, 5.0, 1.0)
    }

    #[test]
    fn test_pitch_clamped_under_repeated_input() {
        let mut camera = camera();
        let mut input = InputState::new();
        input.set_mouse_button(MouseButton::Left, true);

        for _ in 0..200 {
            input.add_mouse_motion(0.0, 5000.0);
            camera.update(0.016, &input);
            input.end_frame();
            assert!(camera.transform().pitch_yaw_roll().x <= PITCH_LIMIT);
        }
        assert!(approx(camera.transform().pitch_yaw_roll().x, PITCH_LIMIT));

        for _ in 0..200 {
            input.add_mouse_motion(0.0, -5000.0);
            camera.update(0.016, &input);
            input.end_frame();
            assert!(camera.transform().pitch_yaw_roll().x >= -PITCH_LIMIT);
        }
        assert!(approx(camera.transform().pitch_yaw_roll().x, -PITCH_LIMIT));
    }

    #[test]
    fn test_default_settings_turn_visibly() {
        let settings = CameraConfig::default();
        let mut camera = Camera::new(
            16.0 / 9.0,
            Vector3::zero(),
            settings.fov_degrees,
            settings.movement_speed,
            settings.mouse_sensitivity,
        );
        camera.look(100.0, 0.0);
        // 100 px should turn well past 20 degrees
        assert!(camera.transform().pitch_yaw_roll().y > Rad::from(Deg(20.0)).0);
    }

    #[test]
    fn test_mouse_ignored_without_button() {
        let mut camera = camera();
        let mut input = InputState::new();
        input.add_mouse_motion(100.0, 100.0);
        camera.update(0.016, &input);
        assert_eq!(camera.transform().pitch_yaw_roll(), Vector3::zero());
    }

    #[test]
    fn test_forward_key_moves_along_local_z() {
        let mut camera = camera();
        camera.set_rotation(0.0, std::f32::consts::FRAC_PI_2);
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, true);
        camera.update(1.0, &input);
        assert!(approx_vec(
            camera.transform().position(),
            Vector3::new(5.0, 0.0, -5.0)
        ));
    }

    #[test]
    fn test_vertical_movement_is_world_space() {
        let mut camera = camera();
        camera.set_rotation(0.6, 0.0);
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        camera.update(0.5, &input);
        assert!(approx_vec(
            camera.transform().position(),
            Vector3::new(0.0, 2.5, -5.0)
        ));
    }

    #[test]
    fn test_resize_changes_projection_only() {
        let mut camera = camera();
        let view = camera.view_matrix();
        let before = camera.projection_matrix();

        camera.update_projection_matrix(4.0 / 3.0);
        assert!(approx_mat(camera.view_matrix(), view));
        assert!(!approx_mat(camera.projection_matrix(), before));
        assert!(approx(
            camera.projection_matrix()[0][0] * 4.0 / 3.0,
            camera.projection_matrix()[1][1]
        ));
    }

    #[test]
    fn test_orthographic_projection_uses_height_and_aspect() {
        let mut camera = camera().with_projection(ProjectionKind::Orthographic);
        camera.set_ortho_height(4.0);
        camera.update_projection_matrix(2.0);
        assert!(approx(camera.projection_matrix()[1][1], 0.5));
        assert!(approx(camera.projection_matrix()[0][0], 0.25));
        assert!(approx(camera.projection_matrix()[3][3], 1.0));
    }
}
