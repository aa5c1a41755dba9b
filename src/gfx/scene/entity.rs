//! Something visible in the world: a transform plus shared mesh and material

use cgmath::Vector3;
use std::f32::consts::TAU;

use super::mesh::Mesh;
use super::scene::{MaterialId, MeshId};
use crate::error::{RenderError, Result};
use crate::gfx::rendering::context::GraphicsContext;
use crate::gfx::transform::Transform;

/// Per-frame motion applied in [`Entity::animate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Adds `rate` radians per second to yaw.
    Spin { rate: f32 },
    /// Oscillates around `origin` along `axis`.
    Bob {
        axis: Vector3<f32>,
        amplitude: f32,
        frequency: f32,
        origin: Vector3<f32>,
    },
}

pub struct Entity {
    pub name: String,
    transform: Transform,
    mesh: MeshId,
    material: MaterialId,
    animation: Option<Animation>,
}

impl Entity {
    pub fn new(name: &str, mesh: MeshId, material: MaterialId) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            mesh,
            material,
            animation: None,
        }
    }

    /// Builder pattern: place the entity
    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.set_position(position);
        self
    }

    /// Builder pattern: set uniform or per-axis scale
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.transform.set_scale(scale);
        self
    }

    /// Builder pattern: attach an animation
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Reassigns this entity's material. Other entities are unaffected.
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    pub fn set_animation(&mut self, animation: Option<Animation>) {
        self.animation = animation;
    }

    pub fn animate(&mut self, dt: f32, total_time: f32) {
        match self.animation {
            Some(Animation::Spin { rate }) => {
                self.transform.rotate(Vector3::new(0.0, rate * dt, 0.0));
            }
            Some(Animation::Bob {
                axis,
                amplitude,
                frequency,
                origin,
            }) => {
                let offset = (total_time * frequency * TAU).sin() * amplitude;
                self.transform.set_position(origin + axis * offset);
            }
            None => {}
        }
    }

    /// Draws the mesh with whatever material state is already bound.
    pub fn draw(&self, ctx: &mut dyn GraphicsContext, meshes: &[Mesh]) -> Result<()> {
        let mesh = meshes
            .get(self.mesh.index())
            .ok_or_else(|| RenderError::InvalidHandle(format!("{:?}", self.mesh)))?;
        mesh.draw(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::primitives::generate_cube;
    use crate::gfx::math::tests::approx_vec;
    use crate::gfx::rendering::recording::{Command, RecordingContext};

    #[test]
    fn test_spin_accumulates_yaw() {
        let mut entity = Entity::new("spinner", MeshId(0), MaterialId(0))
            .with_animation(Animation::Spin { rate: 2.0 });
        entity.animate(0.25, 0.25);
        entity.animate(0.25, 0.5);
        assert!((entity.transform().pitch_yaw_roll().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bob_stays_on_axis() {
        let origin = Vector3::new(1.0, 2.0, 3.0);
        let mut entity = Entity::new("bobber", MeshId(0), MaterialId(0)).with_animation(
            Animation::Bob {
                axis: Vector3::unit_y(),
                amplitude: 0.5,
                frequency: 1.0,
                origin,
            },
        );
        entity.animate(0.0, 0.25);
        assert!(approx_vec(entity.transform().position(), Vector3::new(1.0, 2.5, 3.0)));
        entity.animate(0.0, 0.5);
        assert!(approx_vec(entity.transform().position(), origin));
    }

    #[test]
    fn test_set_material_only_changes_this_entity() {
        let mut a = Entity::new("a", MeshId(0), MaterialId(0));
        let b = Entity::new("b", MeshId(0), MaterialId(0));
        a.set_material(MaterialId(1));
        assert_eq!(a.material(), MaterialId(1));
        assert_eq!(b.material(), MaterialId(0));
    }

    #[test]
    fn test_draw_does_not_bind_material_state() {
        let mut ctx = RecordingContext::new();
        let meshes = vec![Mesh::from_geometry(&mut ctx, "cube", &generate_cube()).unwrap()];
        let entity = Entity::new("cube", MeshId(0), MaterialId(0));

        ctx.clear_log();
        let _ = entity.draw(&mut ctx, &meshes);
        assert!(ctx
            .commands()
            .iter()
            .all(|c| matches!(c, Command::SetVertexBuffer(_) | Command::SetIndexBuffer(_))));
    }

    #[test]
    fn test_unknown_mesh_is_an_error() {
        let mut ctx = RecordingContext::new();
        let entity = Entity::new("ghost", MeshId(4), MaterialId(0));
        assert!(matches!(
            entity.draw(&mut ctx, &[]),
            Err(RenderError::InvalidHandle(_))
        ));
    }
}
