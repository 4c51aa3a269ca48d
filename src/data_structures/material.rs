//! Surface materials and the roles the preview cares about.

use std::{fmt, str::FromStr};

use anyhow::bail;

/// Index of a material in its [`crate::data_structures::scene_graph::Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

/// Parts of an avatar a wearable may carry its own geometry for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialRole {
    Hair,
    Skin,
}

impl MaterialRole {
    /// Name fragment used by assets that do not tag their materials.
    pub fn legacy_name_marker(&self) -> &'static str {
        match self {
            MaterialRole::Hair => "hair_mat",
            MaterialRole::Skin => "avatarskin_mat",
        }
    }
}

impl fmt::Display for MaterialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialRole::Hair => f.write_str("hair"),
            MaterialRole::Skin => f.write_str("skin"),
        }
    }
}

impl FromStr for MaterialRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hair" => Ok(MaterialRole::Hair),
            "skin" => Ok(MaterialRole::Skin),
            other => bail!("unknown material role {other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// Base colour of the PBR metallic-roughness model.
    pub albedo: wgpu::Color,
    pub alpha: f32,
    /// Explicit role set by the loader; takes precedence over the name.
    pub role: Option<MaterialRole>,
    /// Resolved url of the base colour texture, fetched by the render target.
    pub base_color_texture: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            albedo: wgpu::Color::WHITE,
            alpha: 1.0,
            role: None,
            base_color_texture: None,
        }
    }

    pub fn with_role(mut self, role: MaterialRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Tagged materials only match their tag. Untagged ones match by a
    /// case-insensitive substring of their name, so a legacy material may
    /// match both roles.
    pub fn has_role(&self, role: MaterialRole) -> bool {
        match self.role {
            Some(tagged) => tagged == role,
            None => self
                .name
                .to_lowercase()
                .contains(role.legacy_name_marker()),
        }
    }
}
