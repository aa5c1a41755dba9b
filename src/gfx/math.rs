//! Left-handed matrix helpers
//!
//! cgmath builds right-handed, OpenGL-style matrices. Kiln works in a left-handed
//! world (+Z forward, +Y up, +X right) with a `[0, 1]` depth range, so the view
//! and projection constructors live here. Matrices keep cgmath's column-vector
//! convention: a world matrix that scales, then rotates, then translates is
//! `T * R * S`.

use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, Rotation3, Vector3};

/// Builds a view matrix from an eye position, a view direction and an up vector.
pub fn look_to_lh(eye: Vector3<f32>, direction: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let z = direction.normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);

    #[rustfmt::skip]
    let view = Matrix4::new(
        x.x, y.x, z.x, 0.0,
        x.y, y.y, z.y, 0.0,
        x.z, y.z, z.z, 0.0,
        -x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0,
    );
    view
}

/// Perspective projection with a vertical field of view, mapping `near..far` to `0..1`.
pub fn perspective_fov_lh(fov_y: Rad<f32>, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let y_scale = 1.0 / (fov_y.0 * 0.5).tan();
    let x_scale = y_scale / aspect;
    let range = far / (far - near);

    #[rustfmt::skip]
    let projection = Matrix4::new(
        x_scale, 0.0, 0.0, 0.0,
        0.0, y_scale, 0.0, 0.0,
        0.0, 0.0, range, 1.0,
        0.0, 0.0, -range * near, 0.0,
    );
    projection
}

/// Orthographic projection of a `width` x `height` view volume centred on the view axis.
pub fn orthographic_lh(width: f32, height: f32, near: f32, far: f32) -> Matrix4<f32> {
    let range = 1.0 / (far - near);

    #[rustfmt::skip]
    let projection = Matrix4::new(
        2.0 / width, 0.0, 0.0, 0.0,
        0.0, 2.0 / height, 0.0, 0.0,
        0.0, 0.0, range, 0.0,
        0.0, 0.0, -range * near, 1.0,
    );
    projection
}

/// Orientation for the given euler angles: roll about Z, then pitch about X, then yaw about Y.
pub fn euler_orientation(pitch: f32, yaw: f32, roll: f32) -> Quaternion<f32> {
    Quaternion::from_angle_y(Rad(yaw))
        * Quaternion::from_angle_x(Rad(pitch))
        * Quaternion::from_angle_z(Rad(roll))
}

/// Column-major array form expected by the shader constant structs.
pub fn matrix_to_array(matrix: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix.into()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cgmath::{Deg, Rotation, Vector4};

    pub(crate) fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    pub(crate) fn approx_vec(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
    }

    pub(crate) fn approx_mat(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        (0..4).all(|c| (0..4).all(|r| (a[c][r] - b[c][r]).abs() < 1e-3))
    }

    #[test]
    fn test_look_to_moves_eye_to_origin() {
        let eye = Vector3::new(3.0, -2.0, 5.0);
        let view = look_to_lh(eye, Vector3::new(0.0, 0.0, 1.0), Vector3::unit_y());
        let p = view * eye.extend(1.0);
        assert!(approx_vec(p.truncate(), Vector3::new(0.0, 0.0, 0.0)));

        let ahead = view * Vector4::new(3.0, -2.0, 9.0, 1.0);
        assert!(approx(ahead.z, 4.0));
    }

    #[test]
    fn test_perspective_depth_range() {
        let projection = perspective_fov_lh(Deg(60.0).into(), 16.0 / 9.0, 0.1, 100.0);

        let near = projection * Vector4::new(0.0, 0.0, 0.1, 1.0);
        let far = projection * Vector4::new(0.0, 0.0, 100.0, 1.0);
        assert!(approx(near.z / near.w, 0.0));
        assert!(approx(far.z / far.w, 1.0));
    }

    #[test]
    fn test_perspective_aspect_term() {
        let projection = perspective_fov_lh(Deg(90.0).into(), 2.0, 0.1, 100.0);
        assert!(approx(projection[1][1], 1.0));
        assert!(approx(projection[0][0], 0.5));
    }

    #[test]
    fn test_orthographic_maps_volume_to_clip_space() {
        let projection = orthographic_lh(8.0, 4.0, 1.0, 11.0);
        let corner = projection * Vector4::new(4.0, -2.0, 11.0, 1.0);
        assert!(approx(corner.x, 1.0));
        assert!(approx(corner.y, -1.0));
        assert!(approx(corner.z, 1.0));
        let near = projection * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert!(approx(near.z, 0.0));
    }

    #[test]
    fn test_yaw_turns_forward_towards_positive_x() {
        let q = euler_orientation(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let forward = q.rotate_vector(Vector3::unit_z());
        assert!(approx_vec(forward, Vector3::unit_x()));
    }
}
