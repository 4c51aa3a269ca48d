use anyhow::{Context, bail};

/// Parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
///
/// Without an alpha pair the colour is opaque.
pub fn parse_hex_colour(hex: &str) -> anyhow::Result<wgpu::Color> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if !matches!(digits.len(), 6 | 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("invalid colour {hex:?}: expected #RRGGBB or #RRGGBBAA");
    }
    let channel = |idx: usize| -> anyhow::Result<f64> {
        let pair = &digits[idx * 2..idx * 2 + 2];
        let value = u8::from_str_radix(pair, 16)
            .with_context(|| format!("invalid colour {hex:?}: {pair:?} is not a hex byte"))?;
        Ok(value as f64 / 255.0)
    };
    let a = if digits.len() == 8 { channel(3)? } else { 1.0 };
    Ok(wgpu::Color {
        r: channel(0)?,
        g: channel(1)?,
        b: channel(2)?,
        a,
    })
}
