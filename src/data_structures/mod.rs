//! Engine-independent scene data: bounds, transforms, materials and the
//! scene graph.
//!
//! - `bounds` is the axis-aligned box used for all extent calculations
//! - `transform` holds per-node position, rotation and scale
//! - `material` contains material state and the avatar roles it may carry
//! - `colour` parses hex colour strings into `wgpu::Color`
//! - `scene_graph` owns nodes and materials and aggregates child bounds

pub mod bounds;
pub mod colour;
pub mod material;
pub mod scene_graph;
pub mod transform;
