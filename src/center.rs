//! Normalisation of a loaded asset into a unit-sized frame around the origin.

use cgmath::{EuclideanSpace, InnerSpace, Vector3};

use crate::data_structures::scene_graph::{NodeId, NodeKind, Scene, refresh_bounding_info};

pub const ROOT_NAME: &str = "parent";

/// Groups every top-level node under a fresh synthetic root, then scales the
/// root uniformly so the half-diagonal of its bounds has length 1 and moves
/// it so the centre of those bounds lands on the origin.
///
/// Reparenting keeps local transforms; since the new root starts as the
/// identity, world transforms are unchanged until the root is adjusted.
///
/// Degenerate extents (no geometry, or a box collapsed to a point) keep a
/// scale of 1. Returns the synthetic root.
pub fn center(scene: &mut Scene) -> NodeId {
    let root = scene.add_node(ROOT_NAME, NodeKind::Root);
    for node in scene.top_level_nodes() {
        if node != root {
            scene.set_parent(node, Some(root));
        }
    }

    refresh_bounding_info(scene, root);
    let Some(bounds) = scene.node(root).bounding_info else {
        log::warn!("Nothing to center: the scene has no geometry.");
        return root;
    };

    let size = bounds.extent().magnitude();
    let scale = if size.is_finite() && size > f32::EPSILON {
        1.0 / size
    } else {
        log::warn!("Bounding extent has length {size}, skipping scaling.");
        1.0
    };

    let transform = &mut scene.node_mut(root).local;
    transform.scale = Vector3::new(scale, scale, scale);
    transform.position -= bounds.center().to_vec() * scale;
    root
}
