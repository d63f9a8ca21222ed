//! Data model shared by the core and the platform shells.
//!
//! These types avoid referencing platform-specific APIs. The browser shell
//! feeds viewport sizes in and reads instance sets and playback state out;
//! everything else stays inside the `Visualizer` context.

/// Viewport dimensions in device pixels, as measured from the host window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height over width, used to keep the radial family round.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// One of the two instance groups drawn every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    Bar,
    Circle,
}

impl ShapeFamily {
    /// Stable draw order: bars first, the circle on top.
    pub const ALL: [ShapeFamily; 2] = [ShapeFamily::Bar, ShapeFamily::Circle];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Circle => "circle",
        }
    }
}

/// Per-family instance geometry derived from the viewport.
///
/// Fields are private so a set can only be built whole: `static_attribute`
/// always holds exactly `count` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeInstanceSet {
    family: ShapeFamily,
    visual_width: f32,
    static_attribute: Vec<f32>,
}

impl ShapeInstanceSet {
    pub(crate) fn new(family: ShapeFamily, visual_width: f32, static_attribute: Vec<f32>) -> Self {
        Self {
            family,
            visual_width,
            static_attribute,
        }
    }

    pub fn family(&self) -> ShapeFamily {
        self.family
    }

    pub fn count(&self) -> usize {
        self.static_attribute.len()
    }

    pub fn visual_width(&self) -> f32 {
        self.visual_width
    }

    /// Bar x offsets in `[-1, 1]`, or circle rotation angles in radians.
    pub fn static_attribute(&self) -> &[f32] {
        &self.static_attribute
    }
}

/// Playback state as seen by the controller.
///
/// `None` times mean the track metadata has not loaded yet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackSession {
    pub is_playing: bool,
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
}

impl PlaybackSession {
    /// Duration only when it is usable as a divisor.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Elapsed fraction in `[0, 1]`, or 0 while metadata is missing.
    pub fn progress(&self) -> f32 {
        match (self.current_time, self.known_duration()) {
            (Some(t), Some(d)) if t.is_finite() => (t / d).clamp(0.0, 1.0) as f32,
            _ => 0.0,
        }
    }
}

/// In-progress pointer drag over the progress bar.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrubState {
    pub pending_fraction: f32,
}
