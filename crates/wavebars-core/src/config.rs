use crate::constants::{
    BAR_WIDTH_FACTOR, BASE_TICK_INTERVAL_MS, CIRCLE_WIDTH_FACTOR, DEFAULT_ACCENT_RGB,
};
use crate::layout::LayoutParams;
use crate::state::ShapeFamily;
use glam::Vec3;
use std::time::Duration;

/// Visualizer settings. Not persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizerConfig {
    /// Draw the radial family on top of the bars.
    pub circle_enabled: bool,
    pub accent: Vec3,
    pub bar_width_factor: f32,
    pub circle_width_factor: f32,
    /// Fixed tick interval; derived from the enabled families when `None`.
    pub tick_interval: Option<Duration>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            circle_enabled: true,
            accent: Vec3::from_array(DEFAULT_ACCENT_RGB),
            bar_width_factor: BAR_WIDTH_FACTOR,
            circle_width_factor: CIRCLE_WIDTH_FACTOR,
            tick_interval: None,
        }
    }
}

impl VisualizerConfig {
    /// Families drawn each frame, in draw order.
    pub fn families(&self) -> &'static [ShapeFamily] {
        const BARS_ONLY: &[ShapeFamily] = &[ShapeFamily::Bar];
        if self.circle_enabled {
            &ShapeFamily::ALL
        } else {
            BARS_ONLY
        }
    }

    /// One 60 Hz slot per enabled family: ~16.7ms for bars alone, ~33.3ms
    /// with the circle.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval.unwrap_or_else(|| {
            Duration::from_secs_f64(BASE_TICK_INTERVAL_MS * self.families().len() as f64 / 1000.0)
        })
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            bar_width_factor: self.bar_width_factor,
            circle_width_factor: self.circle_width_factor,
        }
    }
}
