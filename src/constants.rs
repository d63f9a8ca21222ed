// DOM element ids and browser-shell tuning constants

// Canvas and media
pub const CANVAS_ID: &str = "canvas";
pub const AUDIO_ID: &str = "player";

// Player chrome
pub const OVERLAY_ID: &str = "overlay";
pub const PROGRESS_BAR_ID: &str = "progress-bar";
pub const PROGRESS_BAR_BG_ID: &str = "progress-bar-bg";
pub const TIMER_ID: &str = "timer";
pub const TITLE_ID: &str = "title";
pub const PLAY_BUTTON_ID: &str = "play";
pub const PAUSE_BUTTON_ID: &str = "pause";

// Pickers
pub const SOURCE_INPUT_ID: &str = "source";
pub const BACKGROUND_INPUT_ID: &str = "bg-img";
pub const COLOR_INPUT_ID: &str = "color";

// Transparent clear so the page background shows through
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 0.0];
