//! Error type shared by every fallible operation in kiln.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load model '{path}': {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model '{0}' contains no triangles")]
    EmptyModel(PathBuf),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("cubemap face {face} is {width}x{height}, expected a square face of {expected}x{expected}")]
    CubemapFace {
        face: usize,
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("{kind} slot {slot} is out of range (maximum {max})")]
    SlotOutOfRange {
        kind: &'static str,
        slot: u32,
        max: u32,
    },

    #[error("light capacity of {0} exceeded")]
    LightCapacity(usize),

    #[error("unknown light type tag {0}")]
    UnknownLightType(i32),

    #[error("camera index {index} out of range ({count} cameras)")]
    CameraIndex { index: usize, count: usize },

    #[error("texture of {width}x{height} exceeds the {max} pixel limit")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("draw issued without {0} bound")]
    IncompleteState(&'static str),

    #[error("constant data of {size} bytes exceeds the {max} byte slot size")]
    ConstantDataTooLarge { size: usize, max: usize },

    #[error("shader error: {0}")]
    Shader(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("GPU device error: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
