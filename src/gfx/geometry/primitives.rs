//! # Primitive Shape Generation
//!
//! Every shape comes with outward normals and texture coordinates.

use super::GeometryData;
use cgmath::Vector3;
use std::f32::consts::PI;

/// Appends one unit quad facing `normal`, with `up` as its texture V axis.
fn push_face(data: &mut GeometryData, normal: Vector3<f32>, up: Vector3<f32>) {
    let right = normal.cross(up);
    let center = normal * 0.5;
    let half_up = up * 0.5;
    let half_right = right * 0.5;

    let base = data.vertices.len() as u32;
    let corners = [
        (center + half_up - half_right, [0.0, 0.0]),
        (center + half_up + half_right, [1.0, 0.0]),
        (center - half_up + half_right, [1.0, 1.0]),
        (center - half_up - half_right, [0.0, 1.0]),
    ];
    for (position, uv) in corners {
        data.vertices.push(position.into());
        data.tex_coords.push(uv);
        data.normals.push(normal.into());
    }

    data.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Generate a unit cube centered at the origin
///
/// Vertices span -0.5 to 0.5 on all axes. Each face has its own four vertices
/// so normals stay flat and UVs cover the full 0..1 range.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    let x = Vector3::unit_x();
    let y = Vector3::unit_y();
    let z = Vector3::unit_z();

    push_face(&mut data, x, y);
    push_face(&mut data, -x, y);
    push_face(&mut data, y, z);
    push_face(&mut data, -y, -z);
    push_face(&mut data, z, y);
    push_face(&mut data, -z, y);

    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 0.5 centered at the origin, so it fits the unit cube.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let phi = lat as f32 * PI / lat_segs as f32; // 0 at the top, PI at the bottom
        let (sin_phi, cos_phi) = phi.sin_cos();

        for long in 0..=long_segs {
            let theta = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            data.vertices
                .push([normal[0] * 0.5, normal[1] * 0.5, normal[2] * 0.5]);
            data.normals.push(normal);
            data.tex_coords.push([
                long as f32 / long_segs as f32,
                lat as f32 / lat_segs as f32,
            ]);
        }
    }

    let row = long_segs + 1;
    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let a = lat * row + long;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;

            data.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    data
}

/// Generate a ground plane in the XZ plane
///
/// # Arguments
/// * `width` - Size along X
/// * `depth` - Size along Z
/// * `width_segments` - Number of subdivisions along X
/// * `depth_segments` - Number of subdivisions along Z
///
/// The plane is centered at the origin with its normal pointing up (+Y).
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for j in 0..=d_segs {
        let t = j as f32 / d_segs as f32;
        let pos_z = (t - 0.5) * depth;

        for i in 0..=w_segs {
            let u = i as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u, 1.0 - t]);
        }
    }

    let row = w_segs + 1;
    for j in 0..d_segs {
        for i in 0..w_segs {
            let a = j * row + i;
            let b = a + row;
            let c = a + 1;
            let d = b + 1;

            data.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    /// Every triangle's geometric normal must agree with its vertex normals.
    fn assert_outward_winding(data: &GeometryData) {
        for tri in data.indices.chunks(3) {
            let p: Vec<Vector3<f32>> = tri.iter().map(|&i| data.vertices[i as usize].into()).collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            if face.magnitude2() < 1e-10 {
                continue;
            }
            let normal: Vector3<f32> = data.normals[tri[0] as usize].into();
            assert!(face.dot(normal) > 0.0, "triangle {:?} winds inward", tri);
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.iter().all(|c| c.abs() <= 0.5 + 1e-6)));
        assert_outward_winding(&cube);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.indices.len(), 8 * 6 * 6);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        assert_outward_winding(&sphere);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert_outward_winding(&plane);
    }

    #[test]
    fn test_to_vertices_interleaves() {
        let plane = generate_plane(1.0, 1.0, 1, 1);
        let vertices = plane.to_vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, plane.vertices[0]);
        assert_eq!(vertices[0].uv, plane.tex_coords[0]);
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
    }
}
