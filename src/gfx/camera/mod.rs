pub mod camera_utils;
pub mod fly_camera;

// Re-export main types
pub use camera_utils::CameraManager;
pub use fly_camera::{Camera, ProjectionKind};
