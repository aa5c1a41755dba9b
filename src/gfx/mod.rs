//! # Graphics Module
//!
//! Everything needed to describe and draw a scene.
//!
//! ## Architecture Overview
//!
//! - **Math and transforms** ([`math`], [`transform`]) - left-handed matrices and
//!   position/rotation/scale with cached world matrices
//! - **Cameras** ([`camera`]) - fly camera and the scene's camera list
//! - **Geometry** ([`geometry`]) - procedural cube, sphere and plane
//! - **Resources** ([`resources`]) - images, samplers, shader programs, materials
//!   and the constant-buffer layouts shared with WGSL
//! - **Scene** ([`scene`]) - meshes, entities, lights and the frame orchestrator
//! - **Sky** ([`sky`]) - cubemap environment drawn after opaque geometry
//! - **Rendering** ([`rendering`]) - the [`GraphicsContext`] trait and its wgpu and
//!   recording implementations
//!
//! ## Usage
//!
//! ```no_run
//! use kiln::gfx::{camera::{Camera, CameraManager}, scene::Scene};
//!
//! let camera = Camera::new(16.0 / 9.0, cgmath::Vector3::new(0.0, 2.0, -8.0), 60.0, 5.0, 1.0);
//! let scene = Scene::new(CameraManager::new(camera));
//! // scene.draw(&mut ctx, total_time)?;
//! ```
//!
//! [`GraphicsContext`]: rendering::GraphicsContext

pub mod camera;
pub mod geometry;
pub mod math;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod sky;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraManager};
pub use rendering::{GraphicsContext, RecordingContext, WgpuContext};
pub use scene::Scene;
pub use sky::Sky;
pub use transform::Transform;
