//! Instance Layout Engine.
//!
//! Derives, from the viewport alone, how many instances each shape family
//! draws, how wide each one is in clip space, and the per-instance static
//! attribute (bar x offset or circle rotation). Pure: callers push the
//! results to the graphics backend.

use crate::constants::{
    BAR_PIXEL_PITCH, BAR_WIDTH_FACTOR, CIRCLE_WIDTH_FACTOR, MAX_BAR_COUNT, MAX_CIRCLE_COUNT,
    MIN_BAR_COUNT,
};
use crate::state::{ShapeFamily, ShapeInstanceSet, ViewportSize};
use std::f32::consts::TAU;

/// Width factors applied to one instance cell (`2 / count`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub bar_width_factor: f32,
    pub circle_width_factor: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            bar_width_factor: BAR_WIDTH_FACTOR,
            circle_width_factor: CIRCLE_WIDTH_FACTOR,
        }
    }
}

/// Everything derived from one viewport measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceLayout {
    pub viewport: ViewportSize,
    pub bar: ShapeInstanceSet,
    pub circle: ShapeInstanceSet,
    pub bar_screen_width: f32,
    pub circle_screen_width: f32,
    /// `height / width`, supplied to the circle family's aspect uniform.
    pub aspect: f32,
}

impl InstanceLayout {
    pub fn set(&self, family: ShapeFamily) -> &ShapeInstanceSet {
        match family {
            ShapeFamily::Bar => &self.bar,
            ShapeFamily::Circle => &self.circle,
        }
    }
}

/// Number of bars for a viewport width: the nearest power of two to
/// `width / 8`, clamped to `[16, 2048]`.
pub fn bar_count_for_width(width: u32) -> u32 {
    let raw = width / BAR_PIXEL_PITCH;
    if raw == 0 {
        return MIN_BAR_COUNT;
    }
    let exponent = (raw as f64).log2().round() as u32;
    let pow2 = 1u32.checked_shl(exponent).unwrap_or(MAX_BAR_COUNT);
    pow2.clamp(MIN_BAR_COUNT, MAX_BAR_COUNT)
}

pub fn circle_count_for_bars(bar_count: u32) -> u32 {
    bar_count.min(MAX_CIRCLE_COUNT)
}

/// Bar centers evenly tiling `[-1, 1]`, inset by half a cell.
pub fn bar_positions(count: u32) -> Vec<f32> {
    let spacing = 2.0 / count as f32;
    let offset = -1.0 + spacing / 2.0;
    (0..count).map(|i| offset + i as f32 * spacing).collect()
}

/// Rotation angles evenly distributed over a full revolution.
pub fn circle_rotations(count: u32) -> Vec<f32> {
    let step = TAU / count as f32;
    (0..count).map(|i| i as f32 * step).collect()
}

/// Clip-space width of one instance: a fraction of its `2 / count` cell.
#[inline]
pub fn screen_width(count: u32, factor: f32) -> f32 {
    (2.0 / count as f32) * factor
}

pub fn recompute(width: u32, height: u32, params: &LayoutParams) -> InstanceLayout {
    let viewport = ViewportSize::new(width, height);
    let bar_count = bar_count_for_width(width);
    let circle_count = circle_count_for_bars(bar_count);

    let bar_screen_width = screen_width(bar_count, params.bar_width_factor);
    let circle_screen_width = screen_width(circle_count, params.circle_width_factor);

    InstanceLayout {
        viewport,
        bar: ShapeInstanceSet::new(ShapeFamily::Bar, bar_screen_width, bar_positions(bar_count)),
        circle: ShapeInstanceSet::new(
            ShapeFamily::Circle,
            circle_screen_width,
            circle_rotations(circle_count),
        ),
        bar_screen_width,
        circle_screen_width,
        aspect: viewport.aspect(),
    }
}
