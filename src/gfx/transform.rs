//! Position, rotation and scale of a single object
//!
//! Every entity and camera owns one [`Transform`]. Transforms are flat: there is
//! no parent/child inheritance, each one is absolute in world space.
//!
//! The world matrix and its inverse-transpose are recomputed on every mutation,
//! so the getters never observe stale values.

use cgmath::{
    ElementWise, Matrix, Matrix4, Quaternion, Rotation, SquareMatrix, Vector3, Zero,
};

use super::math::euler_orientation;

/// Scale, then rotate, then translate.
///
/// Rotation is stored as euler angles (pitch about X, yaw about Y, roll about Z,
/// in radians) and accumulated by [`Transform::rotate`]. Large cumulative
/// rotations can drift into gimbal lock; that is an accepted limitation.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3<f32>,
    pitch_yaw_roll: Vector3<f32>,
    scale: Vector3<f32>,
    world: Matrix4<f32>,
    world_inverse_transpose: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            pitch_yaw_roll: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            world: Matrix4::identity(),
            world_inverse_transpose: Matrix4::identity(),
        }
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.update_matrices();
    }

    /// Replaces pitch, yaw and roll (radians).
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vector3<f32>) {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self.update_matrices();
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.update_matrices();
    }

    /// Adds a world-space offset, ignoring orientation.
    pub fn move_absolute(&mut self, offset: Vector3<f32>) {
        self.position += offset;
        self.update_matrices();
    }

    /// Adds an offset expressed in the transform's local axes.
    pub fn move_relative(&mut self, offset: Vector3<f32>) {
        self.position += self.orientation().rotate_vector(offset);
        self.update_matrices();
    }

    /// Adds to pitch, yaw and roll.
    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.pitch_yaw_roll += delta;
        self.update_matrices();
    }

    /// Multiplies the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vector3<f32>) {
        self.scale.mul_assign_element_wise(factor);
        self.update_matrices();
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn pitch_yaw_roll(&self) -> Vector3<f32> {
        self.pitch_yaw_roll
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        euler_orientation(
            self.pitch_yaw_roll.x,
            self.pitch_yaw_roll.y,
            self.pitch_yaw_roll.z,
        )
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation().rotate_vector(Vector3::unit_z())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation().rotate_vector(Vector3::unit_y())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation().rotate_vector(Vector3::unit_x())
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    /// Inverse of the transposed world matrix, used to carry normals.
    ///
    /// A singular world matrix (any scale component of zero) has no inverse; the
    /// result is then the zero matrix.
    pub fn world_inverse_transpose_matrix(&self) -> Matrix4<f32> {
        self.world_inverse_transpose
    }

    fn update_matrices(&mut self) {
        let translation = Matrix4::from_translation(self.position);
        let rotation = Matrix4::from(self.orientation());
        let scale = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);

        self.world = translation * rotation * scale;
        self.world_inverse_transpose = self
            .world
            .transpose()
            .invert()
            .unwrap_or_else(Matrix4::zero);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::tests::{approx_mat, approx_vec};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f32::consts::FRAC_PI_2;

    fn random_vector(rng: &mut StdRng, min: f32, max: f32) -> Vector3<f32> {
        Vector3::new(
            rng.random_range(min..max),
            rng.random_range(min..max),
            rng.random_range(min..max),
        )
    }

    #[test]
    fn test_basis_invariant_under_translation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut transform = Transform::new();
        transform.set_rotation(Vector3::new(0.3, -1.2, 0.5));
        let (forward, up, right) = (transform.forward(), transform.up(), transform.right());

        for _ in 0..32 {
            transform.set_position(random_vector(&mut rng, -50.0, 50.0));
            transform.move_absolute(random_vector(&mut rng, -5.0, 5.0));
            assert!(approx_vec(transform.forward(), forward));
            assert!(approx_vec(transform.up(), up));
            assert!(approx_vec(transform.right(), right));
        }
    }

    #[test]
    fn test_inverse_transpose_matches_definition() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..64 {
            let mut transform = Transform::new();
            transform.set_position(random_vector(&mut rng, -10.0, 10.0));
            transform.set_rotation(random_vector(&mut rng, -3.0, 3.0));
            transform.set_scale(random_vector(&mut rng, 0.25, 4.0));

            let expected = transform.world_matrix().transpose().invert().unwrap();
            assert!(approx_mat(transform.world_inverse_transpose_matrix(), expected));
        }
    }

    #[test]
    fn test_uniform_scale_inverse_transpose_keeps_orientation() {
        let mut transform = Transform::new();
        transform.set_rotation(Vector3::new(0.4, 1.1, -0.2));
        transform.set_scale(Vector3::new(3.0, 3.0, 3.0));

        let normal = transform.world_inverse_transpose_matrix() * Vector3::unit_z().extend(0.0);
        let rotated = transform.forward();
        assert!(approx_vec(normal.truncate() * 3.0, rotated));
    }

    #[test]
    fn test_move_relative_matches_absolute_without_rotation() {
        let mut relative = Transform::new();
        let mut absolute = Transform::new();
        relative.move_relative(Vector3::new(1.0, 0.0, 0.0));
        absolute.move_absolute(Vector3::new(1.0, 0.0, 0.0));
        assert!(approx_vec(relative.position(), absolute.position()));
    }

    #[test]
    fn test_move_relative_after_quarter_yaw() {
        let mut transform = Transform::new();
        transform.rotate(Vector3::new(0.0, FRAC_PI_2, 0.0));
        transform.move_relative(Vector3::new(1.0, 0.0, 0.0));
        assert!(approx_vec(transform.position(), Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_scale_does_not_affect_absolute_move() {
        let mut transform = Transform::new();
        transform.scale_by(Vector3::new(2.0, 2.0, 2.0));
        transform.move_absolute(Vector3::new(1.0, 0.0, 0.0));

        let world = transform.world_matrix();
        assert!(approx_vec(world.w.truncate(), Vector3::new(1.0, 0.0, 0.0)));
        assert!(approx_vec(
            Vector3::new(world.x.x, world.y.y, world.z.z),
            Vector3::new(2.0, 2.0, 2.0)
        ));
    }

    #[test]
    fn test_scale_by_multiplies() {
        let mut transform = Transform::new();
        transform.set_scale(Vector3::new(2.0, 3.0, 4.0));
        transform.scale_by(Vector3::new(0.5, 2.0, 1.0));
        assert!(approx_vec(transform.scale(), Vector3::new(1.0, 6.0, 4.0)));
    }

    #[test]
    fn test_zero_scale_gives_zero_inverse_transpose() {
        let mut transform = Transform::new();
        transform.set_scale(Vector3::new(0.0, 1.0, 1.0));
        assert_eq!(transform.world_inverse_transpose_matrix(), Matrix4::zero());
    }
}
