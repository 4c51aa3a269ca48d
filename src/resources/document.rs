//! Conversion of parsed glTF documents into scene-ready data.

use std::fmt;

use anyhow::{Context, bail};
use cgmath::Point3;
use serde::Deserialize;

use crate::data_structures::{
    bounds::Aabb,
    material::{Material, MaterialId, MaterialRole},
    scene_graph::{NodeId, NodeKind, Scene},
    transform::Transform,
};

/// glTF node hierarchies deeper than this are rejected.
const MAX_NODE_DEPTH: usize = 128;

/// Packaging variants of a glTF asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetFormat {
    /// Single `.glb` container with an embedded binary chunk.
    Binary,
    /// `.gltf` JSON document with external buffers.
    Text,
}

impl AssetFormat {
    /// Order in which formats are attempted when the packaging is unknown.
    pub const FALLBACK_ORDER: [AssetFormat; 2] = [AssetFormat::Binary, AssetFormat::Text];

    pub fn extension(&self) -> &'static str {
        match self {
            AssetFormat::Binary => ".glb",
            AssetFormat::Text => ".gltf",
        }
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension()[1..])
    }
}

/// A node of a loaded asset before it is added to a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedNode {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Aabb>,
    /// Indices into [`LoadedAsset::materials`].
    pub materials: Vec<usize>,
    pub children: Vec<LoadedNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedAsset {
    pub url: String,
    pub format: AssetFormat,
    pub nodes: Vec<LoadedNode>,
    pub materials: Vec<Material>,
    /// Every sub-resource url after resolution and remapping.
    pub resources: Vec<String>,
}

/// Scene handles of an appended asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppendedAsset {
    /// Top-level nodes of the asset.
    pub nodes: Vec<NodeId>,
    pub materials: Vec<MaterialId>,
}

impl LoadedAsset {
    /// Adds the asset's materials and node tree to `scene`.
    pub fn append_to(&self, scene: &mut Scene) -> AppendedAsset {
        let materials: Vec<MaterialId> = self
            .materials
            .iter()
            .cloned()
            .map(|material| scene.add_material(material))
            .collect();
        let nodes = self
            .nodes
            .iter()
            .map(|node| append_node(scene, node, None, &materials))
            .collect();
        AppendedAsset { nodes, materials }
    }
}

fn append_node(
    scene: &mut Scene,
    node: &LoadedNode,
    parent: Option<NodeId>,
    materials: &[MaterialId],
) -> NodeId {
    let id = scene.add_node(node.name.clone(), NodeKind::Content);
    {
        let scene_node = scene.node_mut(id);
        scene_node.local = node.transform;
        scene_node.geometry = node.geometry;
        scene_node.materials = node
            .materials
            .iter()
            .filter_map(|&idx| materials.get(idx).copied())
            .collect();
    }
    scene.set_parent(id, parent);
    for child in &node.children {
        append_node(scene, child, Some(id), materials);
    }
    id
}

/// Parses `bytes` strictly as `format`, returning the validated document and
/// the GLB binary chunk if any.
pub(crate) fn parse(
    bytes: &[u8],
    format: AssetFormat,
) -> anyhow::Result<(gltf::Document, Option<Vec<u8>>)> {
    let (json, blob) = match format {
        AssetFormat::Binary => {
            let glb = gltf::Glb::from_slice(bytes).context("Not a GLB container")?;
            let json = serde_json::from_slice::<gltf::json::Root>(&glb.json)
                .context("Invalid GLB JSON chunk")?;
            (json, glb.bin.map(|bin| bin.into_owned()))
        }
        AssetFormat::Text => {
            let json = serde_json::from_slice::<gltf::json::Root>(bytes)
                .context("Not a glTF JSON document")?;
            (json, None)
        }
    };
    let document = gltf::Document::from_json(json).context("Invalid glTF document")?;
    Ok((document, blob))
}

#[derive(Deserialize)]
struct MaterialExtras {
    role: Option<String>,
}

fn material_role(material: &gltf::Material) -> Option<MaterialRole> {
    let raw = material.extras().as_ref()?;
    let extras: MaterialExtras = match serde_json::from_str(raw.get()) {
        Ok(extras) => extras,
        Err(e) => {
            log::warn!("Ignoring malformed extras of material {:?}: {}", material.name(), e);
            return None;
        }
    };
    match extras.role?.parse() {
        Ok(role) => Some(role),
        Err(e) => {
            log::warn!("Ignoring role of material {:?}: {}", material.name(), e);
            None
        }
    }
}

/// Builds the loaded asset from a parsed document.
///
/// `buffers` holds the data of every buffer in document order, `images` the
/// resolved url of every image that has one.
pub(crate) fn to_loaded_asset(
    url: &str,
    format: AssetFormat,
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    images: &[Option<String>],
    resources: Vec<String>,
) -> anyhow::Result<LoadedAsset> {
    let materials = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            let [r, g, b, a] = pbr.base_color_factor();
            let name = match (material.name(), material.index()) {
                (Some(name), _) => name.to_string(),
                (None, Some(idx)) => format!("material_{idx}"),
                (None, None) => "default_material".to_string(),
            };
            Material {
                albedo: wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: 1.0,
                },
                alpha: a,
                role: material_role(&material),
                base_color_texture: pbr
                    .base_color_texture()
                    .and_then(|info| images.get(info.texture().source().index()).cloned().flatten()),
                ..Material::new(name)
            }
        })
        .collect();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    let nodes = match scene {
        Some(scene) => scene
            .nodes()
            .map(|node| to_loaded_node(node, buffers, 0))
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => {
            log::warn!("{url} contains no scene");
            Vec::new()
        }
    };

    Ok(LoadedAsset {
        url: url.to_string(),
        format,
        nodes,
        materials,
        resources,
    })
}

fn to_loaded_node(
    node: gltf::Node,
    buffers: &[Vec<u8>],
    depth: usize,
) -> anyhow::Result<LoadedNode> {
    if depth > MAX_NODE_DEPTH {
        bail!("Node hierarchy is deeper than {MAX_NODE_DEPTH} levels");
    }
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut geometry: Option<Aabb> = None;
    let mut materials = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if let Some(bounds) = primitive_bounds(&primitive, buffers) {
                geometry = Some(geometry.map_or(bounds, |g| g.union(&bounds)));
            }
            if let Some(idx) = primitive.material().index() {
                if !materials.contains(&idx) {
                    materials.push(idx);
                }
            }
        }
    }

    let children = node
        .children()
        .map(|child| to_loaded_node(child, buffers, depth + 1))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(LoadedNode {
        name,
        transform: Transform::from(node.transform().decomposed()),
        geometry,
        materials,
        children,
    })
}

/// Bounds of a primitive from its vertex positions, falling back to the
/// POSITION accessor's declared min/max.
fn primitive_bounds(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Option<Aabb> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    if let Some(positions) = reader.read_positions() {
        if let Some(bounds) = Aabb::from_points(positions.map(Point3::from)) {
            return Some(bounds);
        }
    }
    let accessor = primitive.get(&gltf::Semantic::Positions)?;
    let min = accessor_vec3(accessor.min()?)?;
    let max = accessor_vec3(accessor.max()?)?;
    Some(Aabb::new(min, max))
}

fn accessor_vec3(value: gltf::json::Value) -> Option<Point3<f32>> {
    let values = value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()?;
    match values.as_slice() {
        [x, y, z] => Some(Point3::new(*x, *y, *z)),
        _ => None,
    }
}
