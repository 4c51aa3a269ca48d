//! wearable-preview
//!
//! Loads a glTF wearable into a scene, recolours or hides the avatar skin and
//! hair it ships with, scales and centres it into a unit frame and keeps it
//! spinning in front of a fixed thumbnail camera. Drawing is left to a
//! [`context::RenderTarget`] implementation.
//!
//! High-level modules
//! - `camera`: orbit camera and the category zoom table
//! - `center`: normalisation of the loaded hierarchy around the origin
//! - `context`: render target, rig construction and preview lifetime
//! - `data_structures`: scene graph, bounds, transforms and materials
//! - `effects` and `lights`: glow layer and light descriptions
//! - `patch`: skin and hair material patching
//! - `preview`: the single entry point tying everything together
//! - `resources`: fetching, url remapping and glTF loading
//!

pub mod camera;
pub mod center;
pub mod context;
pub mod data_structures;
pub mod effects;
pub mod lights;
pub mod patch;
pub mod preview;
mod render;
pub mod resources;

pub use preview::{Preview, PreviewOptions, preview};

/// Initialises `env_logger` from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
