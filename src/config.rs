//! Application configuration
//!
//! Plain data with builder-style setters. `from_env` layers the `KILN_*`
//! environment variables on top of the defaults.

use std::path::{Path, PathBuf};

use cgmath::Vector3;

use crate::gfx::scene::scene::DEFAULT_CLEAR_COLOR;

pub const ASSET_ROOT_VAR: &str = "KILN_ASSET_ROOT";
pub const VSYNC_VAR: &str = "KILN_VSYNC";
pub const SKY_VAR: &str = "KILN_SKY";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub asset_root: PathBuf,
    /// Directory under `asset_root/skies` holding the six face images.
    pub sky: String,
    pub clear_color: [f32; 4],
    pub ambient_light: Vector3<f32>,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            movement_speed: 5.0,
            mouse_sensitivity: 1.0,
            near_clip: 0.1,
            far_clip: 100.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            asset_root: PathBuf::from("assets"),
            sky: "clouds".to_string(),
            clear_color: DEFAULT_CLEAR_COLOR,
            ambient_light: Vector3::new(0.1, 0.1, 0.15),
            camera: CameraConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults with `KILN_ASSET_ROOT`, `KILN_VSYNC` and `KILN_SKY` applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from any variable source. Unparseable values are
    /// logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(ASSET_ROOT_VAR) {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(value) = lookup(VSYNC_VAR) {
            match parse_flag(&value) {
                Some(vsync) => self.vsync = vsync,
                None => log::warn!("Ignoring {}={:?}: expected a boolean", VSYNC_VAR, value),
            }
        }
        if let Some(sky) = lookup(SKY_VAR) {
            self.sky = sky;
        }
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_sky(mut self, sky: &str) -> Self {
        self.sky = sky.to_owned();
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_ambient_light(mut self, ambient: Vector3<f32>) -> Self {
        self.ambient_light = ambient;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn textures_dir(&self) -> PathBuf {
        self.asset_root.join("textures")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.asset_root.join("models")
    }

    pub fn sky_dir(&self) -> PathBuf {
        self.asset_root.join("skies").join(&self.sky)
    }

    /// Path of a texture file under the asset root.
    pub fn texture(&self, name: impl AsRef<Path>) -> PathBuf {
        self.textures_dir().join(name)
    }

    /// Path of a model file under the asset root.
    pub fn model(&self, name: impl AsRef<Path>) -> PathBuf {
        self.models_dir().join(name)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
