//! Post-processing effects.

/// Bloom around emissive and bright regions.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowLayer {
    pub name: String,
    /// Resolution of the square glow texture, independent of the surface size.
    pub main_texture_fixed_size: u32,
    pub blur_kernel_size: u32,
    pub intensity: f32,
}

impl Default for GlowLayer {
    fn default() -> Self {
        Self {
            name: "glow".to_string(),
            main_texture_fixed_size: 1024,
            blur_kernel_size: 64,
            intensity: 1.0,
        }
    }
}
