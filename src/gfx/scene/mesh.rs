//! Immutable GPU geometry
//!
//! A [`Mesh`] is built once from raw vertices, procedural [`GeometryData`] or an
//! OBJ file, gets its tangents generated, and is uploaded to two immutable
//! buffers. Meshes live in the scene's arena and are shared by id.

use std::path::Path;

use cgmath::{InnerSpace, Vector3, Zero};

use super::vertex::Vertex;
use crate::error::{RenderError, Result};
use crate::gfx::geometry::GeometryData;
use crate::gfx::rendering::context::{BufferHandle, BufferKind, GraphicsContext};

pub struct Mesh {
    name: String,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Builds a mesh from vertices without tangents; they are computed here.
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        name: &str,
        mut vertices: Vec<Vertex>,
        indices: &[u32],
    ) -> Result<Self> {
        validate_indices(vertices.len(), indices)?;
        compute_tangents(&mut vertices, indices);
        Self::with_tangents(ctx, name, &vertices, indices)
    }

    /// Uploads vertices as given, trusting their tangents.
    pub fn with_tangents(
        ctx: &mut dyn GraphicsContext,
        name: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self> {
        validate_indices(vertices.len(), indices)?;

        let vertex_buffer = ctx.create_buffer(
            BufferKind::Vertex,
            &format!("{} Vertex Buffer", name),
            bytemuck::cast_slice(vertices),
        )?;
        let index_buffer = ctx.create_buffer(
            BufferKind::Index,
            &format!("{} Index Buffer", name),
            bytemuck::cast_slice(indices),
        )?;

        Ok(Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        })
    }

    pub fn from_geometry(
        ctx: &mut dyn GraphicsContext,
        name: &str,
        geometry: &GeometryData,
    ) -> Result<Self> {
        Self::new(ctx, name, geometry.to_vertices(), &geometry.indices)
    }

    /// Loads a triangulated OBJ file. The mesh is named after the file stem.
    pub fn from_obj(ctx: &mut dyn GraphicsContext, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (vertices, indices) = load_obj(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());

        log::info!(
            "Loaded '{}': {} vertices, {} triangles",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );
        Self::new(ctx, &name, vertices, &indices)
    }

    /// Binds this mesh's buffers and draws every index.
    pub fn draw(&self, ctx: &mut dyn GraphicsContext) -> Result<()> {
        ctx.set_vertex_buffer(self.vertex_buffer);
        ctx.set_index_buffer(self.index_buffer);
        ctx.draw_indexed(self.index_count)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }
}

fn validate_indices(vertex_count: usize, indices: &[u32]) -> Result<()> {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(RenderError::InvalidGeometry(format!(
            "index count {} is not a positive multiple of 3",
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::InvalidGeometry(format!(
            "index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }
    Ok(())
}

/// Per-vertex tangents from triangle edges and UV deltas.
///
/// Contributions are summed over every triangle that shares a vertex, then
/// orthogonalized against the vertex normal and normalized. Vertices whose
/// triangles have no usable UV gradient get an arbitrary unit vector
/// perpendicular to the normal.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vector3::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let (v0, v1, v2) = (&vertices[i0], &vertices[i1], &vertices[i2]);

        let edge1 = Vector3::from(v1.position) - Vector3::from(v0.position);
        let edge2 = Vector3::from(v2.position) - Vector3::from(v0.position);
        let du1 = v1.uv[0] - v0.uv[0];
        let dv1 = v1.uv[1] - v0.uv[1];
        let du2 = v2.uv[0] - v0.uv[0];
        let dv2 = v2.uv[1] - v0.uv[1];

        let det = du1 * dv2 - du2 * dv1;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge1 * dv2 - edge2 * dv1) / det;

        for index in [i0, i1, i2] {
            accumulated[index] += tangent;
        }
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accumulated) {
        let normal = Vector3::from(vertex.normal);
        let normal = if normal.magnitude2() > f32::EPSILON {
            normal.normalize()
        } else {
            Vector3::unit_y()
        };

        // Gram-Schmidt
        let orthogonal = tangent - normal * normal.dot(tangent);
        let tangent = if orthogonal.magnitude2() > 1e-12 {
            orthogonal.normalize()
        } else {
            any_perpendicular(normal)
        };
        vertex.tangent = tangent.into();
    }
}

fn any_perpendicular(normal: Vector3<f32>) -> Vector3<f32> {
    let axis = if normal.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    normal.cross(axis).normalize()
}

/// Area-weighted vertex normals from triangle winding.
pub fn compute_smooth_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vector3::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let p: [Vector3<f32>; 3] =
            std::array::from_fn(|k| Vector3::from(vertices[triangle[k] as usize].position));
        let face = (p[1] - p[0]).cross(p[2] - p[0]);
        for &index in triangle {
            accumulated[index as usize] += face;
        }
    }

    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = if normal.magnitude2() > f32::EPSILON {
            normal.normalize().into()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

/// Reads every model in an OBJ file into one vertex/index list.
///
/// OBJ data is right-handed with V pointing up. Positions and normals get their
/// Z negated, V is flipped, and triangle winding is reversed so the result
/// matches the left-handed convention used everywhere else.
pub fn load_obj(path: &Path) -> Result<(Vec<Vertex>, Vec<u32>)> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| RenderError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let base = vertices.len() as u32;
        let count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == count;

        for i in 0..count {
            let position = [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                -mesh.positions[i * 3 + 2],
            ];
            let uv = if has_uvs {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            };
            let normal = if has_normals {
                [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    -mesh.normals[i * 3 + 2],
                ]
            } else {
                [0.0; 3]
            };
            vertices.push(Vertex::new(position, uv, normal));
        }

        let model_indices: Vec<u32> = mesh
            .indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[2], t[1]])
            .collect();

        if !has_normals {
            log::debug!("'{}' has no normals, generating them", model.name);
            compute_smooth_normals(&mut vertices[base as usize..], &model_indices);
        }

        indices.extend(model_indices.into_iter().map(|i| i + base));
    }

    if indices.is_empty() {
        return Err(RenderError::EmptyModel(path.to_path_buf()));
    }
    Ok((vertices, indices))
}
