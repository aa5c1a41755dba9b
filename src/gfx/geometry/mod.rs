//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes used by the demo scene and the sky, so the
//! renderer runs without any model files on disk.
//!
//! ## Supported Primitives
//!
//! - **Cube**: unit cube, one quad per face
//! - **Sphere**: UV sphere with configurable resolution
//! - **Plane**: flat ground plane in XZ with configurable subdivisions
//!
//! All shapes use the left-handed convention: +Y up, +Z forward, and triangles
//! wind clockwise when seen from the side their normals point to.
//!
//! ## Usage
//!
//! ```rust
//! use kiln::gfx::geometry::{generate_cube, generate_sphere, generate_plane};
//!
//! let cube = generate_cube();
//! let sphere = generate_sphere(32, 16);
//! let plane = generate_plane(10.0, 10.0, 4, 4);
//! assert_eq!(cube.triangle_count(), 12);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex;

/// Generated geometry ready to be turned into a mesh
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute streams. Tangents are left zeroed for the mesh to compute.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| {
                Vertex::new(
                    *position,
                    self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                    self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                )
            })
            .collect()
    }
}
