//! Directional, point and spot lights
//!
//! Lights are edited as a Rust enum and flattened into [`LightRecord`]s when the
//! pixel constants are built. A [`LightSet`] holds at most [`MAX_LIGHTS`] lights
//! and rejects anything beyond that.

use cgmath::{InnerSpace, Vector3};

use crate::error::{RenderError, Result};
use crate::gfx::resources::shader_data::{
    LightRecord, LIGHT_TYPE_DIRECTIONAL, LIGHT_TYPE_POINT, LIGHT_TYPE_SPOT, MAX_LIGHTS,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional {
        direction: Vector3<f32>,
        color: Vector3<f32>,
        intensity: f32,
    },
    Point {
        position: Vector3<f32>,
        range: f32,
        color: Vector3<f32>,
        intensity: f32,
    },
    /// Cone half-angles are in radians.
    Spot {
        position: Vector3<f32>,
        direction: Vector3<f32>,
        range: f32,
        color: Vector3<f32>,
        intensity: f32,
        inner_angle: f32,
        outer_angle: f32,
    },
}

impl Light {
    pub fn type_name(&self) -> &'static str {
        match self {
            Light::Directional { .. } => "Directional",
            Light::Point { .. } => "Point",
            Light::Spot { .. } => "Spot",
        }
    }

    /// Inner cone angle must not exceed the outer one. Non-spot lights always pass.
    pub fn has_valid_cone(&self) -> bool {
        match self {
            Light::Spot {
                inner_angle,
                outer_angle,
                ..
            } => inner_angle <= outer_angle,
            _ => true,
        }
    }

    pub fn to_record(&self) -> LightRecord {
        let mut record = LightRecord::default();
        match *self {
            Light::Directional {
                direction,
                color,
                intensity,
            } => {
                record.kind = LIGHT_TYPE_DIRECTIONAL;
                record.direction = normalize_or_zero(direction).into();
                record.color = color.into();
                record.intensity = intensity;
            }
            Light::Point {
                position,
                range,
                color,
                intensity,
            } => {
                record.kind = LIGHT_TYPE_POINT;
                record.position = position.into();
                record.range = range;
                record.color = color.into();
                record.intensity = intensity;
            }
            Light::Spot {
                position,
                direction,
                range,
                color,
                intensity,
                inner_angle,
                outer_angle,
            } => {
                record.kind = LIGHT_TYPE_SPOT;
                record.position = position.into();
                record.direction = normalize_or_zero(direction).into();
                record.range = range;
                record.color = color.into();
                record.intensity = intensity;
                record.spot_inner_angle = inner_angle;
                record.spot_outer_angle = outer_angle;
            }
        }
        record
    }
}

impl TryFrom<LightRecord> for Light {
    type Error = RenderError;

    fn try_from(record: LightRecord) -> Result<Self> {
        let direction = Vector3::from(record.direction);
        let position = Vector3::from(record.position);
        let color = Vector3::from(record.color);

        match record.kind {
            LIGHT_TYPE_DIRECTIONAL => Ok(Light::Directional {
                direction,
                color,
                intensity: record.intensity,
            }),
            LIGHT_TYPE_POINT => Ok(Light::Point {
                position,
                range: record.range,
                color,
                intensity: record.intensity,
            }),
            LIGHT_TYPE_SPOT => Ok(Light::Spot {
                position,
                direction,
                range: record.range,
                color,
                intensity: record.intensity,
                inner_angle: record.spot_inner_angle,
                outer_angle: record.spot_outer_angle,
            }),
            other => Err(RenderError::UnknownLightType(other)),
        }
    }
}

fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON {
        v.normalize()
    } else {
        v
    }
}

/// Up to [`MAX_LIGHTS`] lights, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    lights: Vec<Light>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: Light) -> Result<usize> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(RenderError::LightCapacity(MAX_LIGHTS));
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<Light> {
        (index < self.lights.len()).then(|| self.lights.remove(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Light> {
        self.lights.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Fixed-size array for the pixel constants. Unused entries are zeroed and
    /// lie past [`LightSet::active_count`], so the shader never reads them.
    pub fn records(&self) -> [LightRecord; MAX_LIGHTS] {
        let mut records = [LightRecord::default(); MAX_LIGHTS];
        for (record, light) in records.iter_mut().zip(&self.lights) {
            *record = light.to_record();
        }
        records
    }

    pub fn active_count(&self) -> u32 {
        self.lights.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(inner_degrees: f32, outer_degrees: f32) -> Light {
        Light::Spot {
            position: Vector3::new(0.0, 3.0, 0.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
            range: 10.0,
            color: Vector3::new(1.0, 1.0, 1.0),
            intensity: 2.0,
            inner_angle: inner_degrees.to_radians(),
            outer_angle: outer_degrees.to_radians(),
        }
    }

    #[test]
    fn test_spot_angles_round_trip() {
        let light = spot(30.0, 45.0);
        let record = light.to_record();
        assert_eq!(record.kind, LIGHT_TYPE_SPOT);
        assert_eq!(record.spot_inner_angle, 30.0f32.to_radians());
        assert_eq!(record.spot_outer_angle, 45.0f32.to_radians());

        let back = Light::try_from(record).unwrap();
        assert_eq!(back, light);
    }

    #[test]
    fn test_cone_validity() {
        assert!(spot(30.0, 45.0).has_valid_cone());
        assert!(spot(45.0, 45.0).has_valid_cone());
        assert!(!spot(50.0, 45.0).has_valid_cone());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut record = LightRecord::default();
        record.kind = 9;
        assert!(matches!(
            Light::try_from(record),
            Err(RenderError::UnknownLightType(9))
        ));
    }

    #[test]
    fn test_capacity_rejected() {
        let mut set = LightSet::new();
        for _ in 0..MAX_LIGHTS {
            set.add(spot(10.0, 20.0)).unwrap();
        }
        assert!(matches!(
            set.add(spot(10.0, 20.0)),
            Err(RenderError::LightCapacity(MAX_LIGHTS))
        ));
        assert_eq!(set.len(), MAX_LIGHTS);
    }

    #[test]
    fn test_records_pad_with_zeroes() {
        let mut set = LightSet::new();
        set.add(Light::Point {
            position: Vector3::new(1.0, 2.0, 3.0),
            range: 5.0,
            color: Vector3::new(1.0, 0.5, 0.25),
            intensity: 1.0,
        })
        .unwrap();

        let records = set.records();
        assert_eq!(set.active_count(), 1);
        assert_eq!(records[0].kind, LIGHT_TYPE_POINT);
        assert_eq!(records[0].position, [1.0, 2.0, 3.0]);
        assert!(records[1..].iter().all(|r| *r == LightRecord::default()));
    }
}
