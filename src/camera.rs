//! Orbit camera and per-category framing.
//!
//! The preview camera circles a fixed target. Its radius is pinned by the
//! wearable category so every thumbnail of a category is framed the same way.

use std::{f32::consts::PI, fmt, str::FromStr};

use anyhow::bail;
use cgmath::{InnerSpace, Point3, Rad, Vector3};
use instant::Duration;

/// Classification of equippable assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WearableCategory {
    Eyebrows,
    Eyes,
    FacialHair,
    Hair,
    Mouth,
    UpperBody,
    LowerBody,
    Feet,
    Earring,
    Eyewear,
    Hat,
    Helmet,
    Mask,
    Tiara,
    TopHead,
    Skin,
    HandsWear,
}

impl WearableCategory {
    pub const ALL: [WearableCategory; 17] = [
        WearableCategory::Eyebrows,
        WearableCategory::Eyes,
        WearableCategory::FacialHair,
        WearableCategory::Hair,
        WearableCategory::Mouth,
        WearableCategory::UpperBody,
        WearableCategory::LowerBody,
        WearableCategory::Feet,
        WearableCategory::Earring,
        WearableCategory::Eyewear,
        WearableCategory::Hat,
        WearableCategory::Helmet,
        WearableCategory::Mask,
        WearableCategory::Tiara,
        WearableCategory::TopHead,
        WearableCategory::Skin,
        WearableCategory::HandsWear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WearableCategory::Eyebrows => "eyebrows",
            WearableCategory::Eyes => "eyes",
            WearableCategory::FacialHair => "facial_hair",
            WearableCategory::Hair => "hair",
            WearableCategory::Mouth => "mouth",
            WearableCategory::UpperBody => "upper_body",
            WearableCategory::LowerBody => "lower_body",
            WearableCategory::Feet => "feet",
            WearableCategory::Earring => "earring",
            WearableCategory::Eyewear => "eyewear",
            WearableCategory::Hat => "hat",
            WearableCategory::Helmet => "helmet",
            WearableCategory::Mask => "mask",
            WearableCategory::Tiara => "tiara",
            WearableCategory::TopHead => "top_head",
            WearableCategory::Skin => "skin",
            WearableCategory::HandsWear => "hands_wear",
        }
    }
}

impl fmt::Display for WearableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WearableCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL.iter().find(|category| category.as_str() == s) {
            Some(category) => Ok(*category),
            None => bail!("unknown wearable category {s:?}"),
        }
    }
}

/// How far the camera moves in towards the target for a category.
pub fn zoom_for_category(category: WearableCategory) -> f32 {
    match category {
        WearableCategory::UpperBody => 2.0,
        WearableCategory::Skin => 1.75,
        _ => 1.25,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective { fovy: Rad<f32>, znear: f32, zfar: f32 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fovy: Rad(0.8),
            znear: 1.0,
            zfar: 10_000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoRotation {
    /// Radians per second while nobody interacts with the camera.
    pub idle_rotation_speed: f32,
}

/// A camera on a sphere around `target`.
///
/// `alpha` is the longitudinal angle in the xz-plane measured from +x,
/// `beta` the latitudinal angle measured from +y.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub name: String,
    pub alpha: f32,
    pub beta: f32,
    radius: f32,
    pub target: Point3<f32>,
    pub projection: Projection,
    pub auto_rotation: Option<AutoRotation>,
    lower_radius_limit: Option<f32>,
    upper_radius_limit: Option<f32>,
}

// keeps the camera off the poles where the up vector degenerates
const BETA_EPSILON: f32 = 0.01;

impl OrbitCamera {
    pub fn new(name: impl Into<String>, target: Point3<f32>) -> Self {
        Self {
            name: name.into(),
            alpha: 0.0,
            beta: 0.0,
            radius: 0.0,
            target,
            projection: Projection::default(),
            auto_rotation: None,
            lower_radius_limit: None,
            upper_radius_limit: None,
        }
    }

    /// Moves the camera to `position`, recomputing angles and radius.
    pub fn set_position(&mut self, position: Point3<f32>) {
        let offset = position - self.target;
        self.radius = offset.magnitude();
        if self.radius == 0.0 {
            self.alpha = 0.0;
            self.beta = 0.0;
            return;
        }
        let planar = (offset.x * offset.x + offset.z * offset.z).sqrt();
        self.alpha = if planar == 0.0 {
            0.0
        } else {
            (offset.x / planar).clamp(-1.0, 1.0).acos()
        };
        if offset.z < 0.0 {
            self.alpha = 2.0 * PI - self.alpha;
        }
        self.beta = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        self.clamp_radius();
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target
            + Vector3::new(
                self.radius * cos_a * sin_b,
                self.radius * cos_b,
                self.radius * sin_a * sin_b,
            )
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn radius_limits(&self) -> (Option<f32>, Option<f32>) {
        (self.lower_radius_limit, self.upper_radius_limit)
    }

    /// Limits how close and how far the camera may be. Equal limits pin the
    /// radius. The current radius is clamped right away.
    pub fn set_radius_limits(&mut self, lower: Option<f32>, upper: Option<f32>) {
        self.lower_radius_limit = lower;
        self.upper_radius_limit = upper;
        self.clamp_radius();
    }

    fn clamp_radius(&mut self) {
        if let Some(lower) = self.lower_radius_limit {
            self.radius = self.radius.max(lower);
        }
        if let Some(upper) = self.upper_radius_limit {
            self.radius = self.radius.min(upper);
        }
    }

    /// User driven rotation, e.g. from a pointer drag.
    pub fn orbit(&mut self, delta_alpha: f32, delta_beta: f32) {
        self.alpha = (self.alpha + delta_alpha).rem_euclid(2.0 * PI);
        self.beta = (self.beta + delta_beta).clamp(BETA_EPSILON, PI - BETA_EPSILON);
    }

    /// User driven zoom; has no effect once the radius is pinned.
    pub fn zoom(&mut self, delta_radius: f32) {
        self.radius = (self.radius + delta_radius).max(0.0);
        self.clamp_radius();
    }

    /// Advances the idle rotation by `dt`.
    pub fn update(&mut self, dt: Duration) {
        if let Some(auto) = self.auto_rotation {
            self.alpha = (self.alpha + auto.idle_rotation_speed * dt.as_secs_f32()).rem_euclid(2.0 * PI);
        }
    }
}
