//! CPU-side image data, sampler descriptions and the depth target
//!
//! Images are decoded to tightly packed RGBA8 before they reach a
//! [`GraphicsContext`](crate::gfx::rendering::context::GraphicsContext).

use std::path::Path;

use crate::error::{RenderError, Result};

/// Largest texture edge requested from the device.
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Wraps raw RGBA8 pixels, checking the buffer length.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            pixels,
        };
        image.check_length()?;
        Ok(image)
    }

    fn check_length(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(RenderError::InvalidGeometry(format!(
                "image of {}x{} needs {} bytes, got {}",
                self.width,
                self.height,
                expected,
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Checks the pixel buffer and that neither edge exceeds `max_dimension`.
    pub fn validate(&self, max_dimension: u32) -> Result<()> {
        self.check_length()?;
        if self.width > max_dimension || self.height > max_dimension {
            return Err(RenderError::TextureTooLarge {
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }

    /// Decodes a PNG or JPEG file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| RenderError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// A single pixel of one colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    /// A square image fading from `top` to `bottom`.
    pub fn vertical_gradient(size: u32, top: [u8; 4], bottom: [u8; 4]) -> Self {
        let size = size.max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            let t = if size > 1 {
                y as f32 / (size - 1) as f32
            } else {
                0.0
            };
            let row: [u8; 4] =
                std::array::from_fn(|c| (top[c] as f32 + (bottom[c] as f32 - top[c] as f32) * t).round() as u8);
            for _ in 0..size {
                pixels.extend_from_slice(&row);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// A two-colour checkerboard with `cells` squares per side.
    pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

/// Checks that six cubemap faces are square and share one size, returning that size.
pub fn validate_cubemap_faces(faces: &[ImageData; 6]) -> Result<u32> {
    let expected = faces[0].width;
    for (face, image) in faces.iter().enumerate() {
        if image.width != image.height || image.width != expected {
            return Err(RenderError::CubemapFace {
                face,
                width: image.width,
                height: image.height,
                expected,
            });
        }
    }
    Ok(expected)
}

/// Filtering and addressing for a sampler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    pub address_mode: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    /// 1 disables anisotropic filtering.
    pub anisotropy: u16,
}

impl SamplerDesc {
    pub fn wrap_linear() -> Self {
        Self {
            address_mode: wgpu::AddressMode::Repeat,
            filter: wgpu::FilterMode::Linear,
            anisotropy: 16,
        }
    }

    pub fn clamp_linear() -> Self {
        Self {
            address_mode: wgpu::AddressMode::ClampToEdge,
            filter: wgpu::FilterMode::Linear,
            anisotropy: 1,
        }
    }
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::wrap_linear()
    }
}

/// Depth buffer sized to the surface.
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(ImageData::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(ImageData::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(ImageData::from_rgba(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_oversized_image_rejected() {
        let edge = MAX_TEXTURE_DIMENSION + 1;
        let wide = ImageData::from_rgba(edge, 1, vec![0; edge as usize * 4]).unwrap();
        assert!(matches!(
            wide.validate(MAX_TEXTURE_DIMENSION),
            Err(RenderError::TextureTooLarge { width, height: 1, max: MAX_TEXTURE_DIMENSION })
                if width == edge
        ));
        assert!(ImageData::solid([0; 4]).validate(MAX_TEXTURE_DIMENSION).is_ok());

        let truncated = ImageData {
            width: 2,
            height: 2,
            pixels: vec![0; 4],
        };
        assert!(truncated.validate(MAX_TEXTURE_DIMENSION).is_err());
    }

    #[test]
    fn test_gradient_endpoints() {
        let image = ImageData::vertical_gradient(4, [0, 0, 0, 255], [255, 255, 255, 255]);
        assert_eq!(image.pixels.len(), 64);
        assert_eq!(&image.pixels[0..4], &[0, 0, 0, 255]);
        assert_eq!(&image.pixels[60..64], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_cubemap_faces_must_match() {
        let face = ImageData::solid([255; 4]);
        let mut faces: [ImageData; 6] = std::array::from_fn(|_| face.clone());
        assert_eq!(validate_cubemap_faces(&faces).unwrap(), 1);

        faces[3] = ImageData::vertical_gradient(2, [0; 4], [255; 4]);
        assert!(matches!(
            validate_cubemap_faces(&faces),
            Err(RenderError::CubemapFace { face: 3, .. })
        ));

        faces[3] = ImageData::from_rgba(2, 1, vec![0; 8]).unwrap();
        faces[0] = ImageData::from_rgba(2, 1, vec![0; 8]).unwrap();
        assert!(matches!(
            validate_cubemap_faces(&faces),
            Err(RenderError::CubemapFace { face: 0, .. })
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = ImageData::load("definitely/not/here.png").unwrap_err();
        match error {
            RenderError::Image { path, .. } => assert!(path.ends_with("here.png")),
            other => panic!("unexpected error {other}"),
        }
    }
}
