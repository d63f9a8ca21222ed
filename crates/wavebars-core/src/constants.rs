// Shared layout/sampling/cadence tuning constants.

// Instance layout
pub const BAR_PIXEL_PITCH: u32 = 8; // minimum device pixels per bar
pub const MIN_BAR_COUNT: u32 = 16; // capture window 32
pub const MAX_BAR_COUNT: u32 = 2048; // capture window 4096
pub const MAX_CIRCLE_COUNT: u32 = 128;

// Visual width as a fraction of one instance cell (2 / count)
pub const BAR_WIDTH_FACTOR: f32 = 1.0 / 3.0;
pub const CIRCLE_WIDTH_FACTOR: f32 = 0.5;

// Signal capture window bounds (samples)
pub const MIN_CAPTURE_WINDOW: usize = 32;
pub const MAX_CAPTURE_WINDOW: usize = 4096;

// Frame cadence: one 60 Hz slot per enabled shape family
pub const BASE_TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

// Default accent color (#9bf3f0)
pub const DEFAULT_ACCENT_RGB: [f32; 3] = [0.608, 0.953, 0.941];

// Shader uniform names shared by both families
pub const UNIFORM_WIDTH: &str = "u_width";
pub const UNIFORM_ASPECT: &str = "u_aspect";
pub const UNIFORM_COLOR: &str = "u_color";
