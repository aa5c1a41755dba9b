//! # Scene Module
//!
//! Everything that is drawn each frame and the orchestrator that draws it.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns meshes, materials, entities, lights, cameras and the sky
//! - [`Entity`] - Transform plus shared mesh and material ids
//! - [`Mesh`] - Immutable GPU geometry with generated tangents
//! - [`Light`] / [`LightSet`] - Up to five directional, point or spot lights
//! - [`Vertex`] - The single vertex format used by every mesh
//!
//! ## Usage
//!
//! ```no_run
//! use kiln::gfx::camera::{Camera, CameraManager};
//! use kiln::gfx::scene::Scene;
//! use cgmath::Vector3;
//!
//! let camera = Camera::new(16.0 / 9.0, Vector3::new(0.0, 1.0, -5.0), 60.0, 3.0, 1.0);
//! let mut scene = Scene::new(CameraManager::new(camera));
//! scene.on_resize(1280, 720);
//! ```

pub mod entity;
pub mod light;
pub mod mesh;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use entity::{Animation, Entity};
pub use light::{Light, LightSet};
pub use mesh::Mesh;
pub use scene::{FrameControl, MaterialId, MeshId, Scene, SceneStatistics};
pub use vertex::Vertex;
