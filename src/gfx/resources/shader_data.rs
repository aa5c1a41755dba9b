//! Constant blocks copied byte-for-byte into shader-visible buffers
//!
//! Field order and padding mirror the WGSL declarations in `gfx/shaders`.

use bytemuck::{Pod, Zeroable};

pub const LIGHT_TYPE_DIRECTIONAL: i32 = 0;
pub const LIGHT_TYPE_POINT: i32 = 1;
pub const LIGHT_TYPE_SPOT: i32 = 2;

/// Lights visible to a single draw.
pub const MAX_LIGHTS: usize = 5;

/// Vertex stage, slot 0, for standard meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexShaderData {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
}

/// One light, 16-byte aligned stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightRecord {
    pub kind: i32,
    pub direction: [f32; 3],
    pub range: f32,
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub spot_inner_angle: f32,
    pub spot_outer_angle: f32,
    pub padding: [f32; 2],
}

impl Default for LightRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Pixel stage, slot 0, for standard meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PixelShaderData {
    pub color_tint: [f32; 4],
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
    pub camera_position: [f32; 3],
    pub roughness: f32,
    pub ambient_light: [f32; 3],
    pub time: f32,
    pub lights: [LightRecord; MAX_LIGHTS],
    /// Entries of `lights` the shader reads; the rest are ignored.
    pub light_count: u32,
    pub padding: [u32; 3],
}

/// Vertex stage, slot 0, for the sky. `view` has its translation removed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyShaderData {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_vertex_data_layout() {
        assert_eq!(size_of::<VertexShaderData>(), 256);
        assert_eq!(offset_of!(VertexShaderData, view), 64);
        assert_eq!(offset_of!(VertexShaderData, projection), 128);
        assert_eq!(offset_of!(VertexShaderData, world_inverse_transpose), 192);
    }

    #[test]
    fn test_light_record_layout() {
        assert_eq!(size_of::<LightRecord>(), 64);
        assert_eq!(offset_of!(LightRecord, direction), 4);
        assert_eq!(offset_of!(LightRecord, range), 16);
        assert_eq!(offset_of!(LightRecord, position), 20);
        assert_eq!(offset_of!(LightRecord, intensity), 32);
        assert_eq!(offset_of!(LightRecord, color), 36);
        assert_eq!(offset_of!(LightRecord, spot_inner_angle), 48);
        assert_eq!(offset_of!(LightRecord, spot_outer_angle), 52);
    }

    #[test]
    fn test_pixel_data_layout() {
        assert_eq!(size_of::<PixelShaderData>(), 400);
        assert_eq!(offset_of!(PixelShaderData, uv_offset), 16);
        assert_eq!(offset_of!(PixelShaderData, uv_scale), 24);
        assert_eq!(offset_of!(PixelShaderData, camera_position), 32);
        assert_eq!(offset_of!(PixelShaderData, roughness), 44);
        assert_eq!(offset_of!(PixelShaderData, ambient_light), 48);
        assert_eq!(offset_of!(PixelShaderData, time), 60);
        assert_eq!(offset_of!(PixelShaderData, lights), 64);
        assert_eq!(offset_of!(PixelShaderData, light_count), 384);
    }

    #[test]
    fn test_sky_data_layout() {
        assert_eq!(size_of::<SkyShaderData>(), 128);
    }
}
