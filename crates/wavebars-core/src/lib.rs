//! Render-synchronization core for the wavebars audio visualizer.
//!
//! Platform-free: GPU, audio graph, timer and DOM are reached only through
//! the traits in [`backend`], so everything here runs (and is tested) on the
//! host.

pub mod backend;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod player;
pub mod sampler;
pub mod scheduler;
pub mod state;
pub mod timefmt;

pub use backend::*;
pub use color::*;
pub use config::*;
pub use constants::*;
pub use error::{BackendError, VisualizerError};
pub use geometry::*;
pub use layout::{recompute, InstanceLayout, LayoutParams};
pub use player::*;
pub use sampler::*;
pub use scheduler::*;
pub use state::*;
pub use timefmt::*;

// Shaders bundled as string constants
pub static BAR_VS_WGSL: &str = include_str!("../shaders/bar_vs.wgsl");
pub static CIRCLE_VS_WGSL: &str = include_str!("../shaders/circle_vs.wgsl");
pub static SHAPE_FS_WGSL: &str = include_str!("../shaders/shape_fs.wgsl");
