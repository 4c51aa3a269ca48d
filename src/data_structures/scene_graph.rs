//! Scene graph and hierarchical scene organization.
//!
//! The [`Scene`] is an arena: it owns every node and material, nodes refer to
//! their parent and children by [`NodeId`]. Nodes are never removed; they live
//! as long as the scene does.

use cgmath::Matrix4;

use crate::data_structures::{
    bounds::Aabb,
    material::{Material, MaterialId},
    transform::Transform,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Distinguishes grouping roots created by the engine from asset content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A node produced by the asset loader, with or without geometry.
    Content,
    /// A synthetic or placeholder root. Never contributes to the bounds of
    /// its parent.
    Root,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub local: Transform,
    /// Object-space bounds of this node's own primitives.
    pub geometry: Option<Aabb>,
    /// Explicit bounds in the node's local space; replaces the bounds derived
    /// from geometry and children once set.
    pub bounding_info: Option<Aabb>,
    pub materials: Vec<MaterialId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Per-scene clear behaviour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSettings {
    pub clear_colour: wgpu::Color,
    pub auto_clear: bool,
    pub prevent_default_on_pointer_down: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            clear_colour: wgpu::Color::TRANSPARENT,
            auto_clear: true,
            prevent_default_on_pointer_down: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    pub settings: SceneSettings,
    nodes: Vec<Node>,
    materials: Vec<Material>,
    active_materials: Vec<MaterialId>,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            kind,
            local: Transform::default(),
            geometry: None,
            bounding_info: None,
            materials: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes without a parent, in creation order.
    pub fn top_level_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Moves `child` under `parent` (or to the top level for `None`). The
    /// child's local transform is kept as is.
    ///
    /// Parenting a node under itself or one of its descendants is ignored.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        if let Some(parent) = parent {
            if self.is_ancestor_or_self(child, parent) {
                log::warn!(
                    "Refusing to parent {:?} under {:?}: that would create a cycle.",
                    self.node(child).name,
                    self.node(parent).name
                );
                return;
            }
        }
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(child);
        }
        self.nodes[child.0].parent = parent;
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let node = self.node(id);
        let local = node.local.to_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Bounds of a node and everything below it, in the node's local space.
    ///
    /// An explicit `bounding_info` short-circuits the traversal.
    pub fn subtree_bounds(&self, id: NodeId) -> Option<Aabb> {
        let node = self.node(id);
        if let Some(bounds) = node.bounding_info {
            return Some(bounds);
        }
        node.children
            .iter()
            .filter_map(|&child| self.bounds_in_parent_space(child))
            .fold(node.geometry, |acc, b| {
                Some(acc.map_or(b, |acc| acc.union(&b)))
            })
    }

    /// Subtree bounds of `id` after applying its own local transform, i.e. as
    /// seen from its parent. Includes the node's local translation.
    pub fn bounds_in_parent_space(&self, id: NodeId) -> Option<Aabb> {
        self.subtree_bounds(id)
            .map(|bounds| bounds.transform(&self.node(id).local.to_matrix()))
    }

    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.subtree_bounds(id)
            .map(|bounds| bounds.transform(&self.world_matrix(id)))
    }

    /// Registers a material and makes it active.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        self.active_materials.push(id);
        id
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    /// Deregisters a material from the active set. Meshes keep referencing it.
    pub fn remove_material(&mut self, id: MaterialId) {
        self.active_materials.retain(|&m| m != id);
    }

    pub fn is_material_active(&self, id: MaterialId) -> bool {
        self.active_materials.contains(&id)
    }

    /// Active materials in registration order.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.active_materials
            .iter()
            .map(|&id| (id, &self.materials[id.0]))
    }
}

/// Sets `parent.bounding_info` to the union of its children's bounds.
///
/// Each child contributes its subtree bounds including its own local
/// transform. [`NodeKind::Root`] children are skipped. Without any
/// contributing child the parent is left untouched.
pub fn refresh_bounding_info(scene: &mut Scene, parent: NodeId) {
    let bounds = scene
        .node(parent)
        .children()
        .iter()
        .filter(|&&child| scene.node(child).kind != NodeKind::Root)
        .filter_map(|&child| scene.bounds_in_parent_space(child))
        .reduce(|acc, b| acc.union(&b));
    if let Some(bounds) = bounds {
        scene.node_mut(parent).bounding_info = Some(bounds);
    }
}
