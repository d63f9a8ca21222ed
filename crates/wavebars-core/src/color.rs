use crate::error::{Result, VisualizerError};
use glam::Vec3;

/// Parse an sRGB hex triple (`#rrggbb` or `rrggbb`, any case) to normalized RGB.
pub fn parse_hex_color(hex: &str) -> Result<Vec3> {
    let invalid = || VisualizerError::InvalidColor(hex.to_string());
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| invalid())
    };
    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Canonical lowercase `#rrggbb` form of a normalized color.
pub fn to_hex_color(rgb: Vec3) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(rgb.x), byte(rgb.y), byte(rgb.z))
}
