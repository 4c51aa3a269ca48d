//! Light descriptions handed to the render target.

use cgmath::{Point3, Vector3};

#[derive(Clone, Debug, PartialEq)]
pub enum LightKind {
    Directional {
        direction: Vector3<f32>,
    },
    /// Ambient light blending a sky and a ground colour along `direction`.
    Hemispheric {
        direction: Vector3<f32>,
    },
    Spot {
        position: Point3<f32>,
        direction: Vector3<f32>,
        /// Cone angle in radians.
        angle: f32,
        /// Falloff from the cone axis.
        exponent: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub intensity: f32,
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            intensity: 1.0,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}
