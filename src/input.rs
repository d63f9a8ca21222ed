// Pure input helpers shared by the DOM event wiring. No web-sys types here so
// the host tests can include this file directly.

/// Actions bound to global keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlayback,
}

/// Map a `KeyboardEvent.code` / `key` pair to an action.
#[inline]
pub fn key_action(code: &str, key: &str) -> Option<KeyAction> {
    match (code, key) {
        ("Space", _) | (_, " ") | (_, "Spacebar") => Some(KeyAction::TogglePlayback),
        ("MediaPlayPause", _) | (_, "MediaPlayPause") => Some(KeyAction::TogglePlayback),
        _ => None,
    }
}

/// Keys typed into form fields belong to the field, not the player.
#[inline]
pub fn is_text_entry_tag(tag_name: &str) -> bool {
    matches!(
        tag_name.to_ascii_uppercase().as_str(),
        "INPUT" | "TEXTAREA" | "SELECT"
    )
}

/// CSS pixel coordinate to device pixels, matching the viewport measurement.
#[inline]
pub fn css_to_device_px(css: f64, device_pixel_ratio: f64) -> f32 {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    (css * dpr) as f32
}

/// CSS `width` value for a progress fill fraction.
#[inline]
pub fn percent_width(fraction: f32) -> String {
    let f = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    format!("{:.3}%", f * 100.0)
}
