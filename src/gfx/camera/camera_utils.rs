use cgmath::{Matrix4, Vector3};

use super::fly_camera::Camera;
use crate::error::{RenderError, Result};
use crate::input::InputState;

/// A fixed list of cameras with exactly one active at a time.
pub struct CameraManager {
    cameras: Vec<Camera>,
    active: usize,
}

impl CameraManager {
    pub fn new(camera: Camera) -> Self {
        Self {
            cameras: vec![camera],
            active: 0,
        }
    }

    /// Adds a camera and returns its index. The active camera is unchanged.
    pub fn add(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.cameras.len() {
            return Err(RenderError::CameraIndex {
                index,
                count: self.cameras.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Camera {
        &self.cameras[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Camera> {
        self.cameras.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Drives the active camera from input.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.active_mut().update(dt, input);
    }

    /// Every camera gets the new aspect ratio, not only the active one.
    pub fn on_resize(&mut self, aspect_ratio: f32) {
        for camera in &mut self.cameras {
            camera.update_projection_matrix(aspect_ratio);
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.active().view_matrix()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.active().projection_matrix()
    }

    pub fn eye_position(&self) -> Vector3<f32> {
        self.active().transform().position()
    }
}
