//! Collaborator seams. The core never touches a GPU, an audio graph, a timer
//! or the DOM directly; platform shells implement these traits.

use crate::error::BackendError;
use crate::state::{ShapeFamily, ViewportSize};
use glam::Vec3;
use std::time::Duration;

/// Opaque handle to a compiled vertex+fragment program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

pub trait ShaderBackend {
    fn compile(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, BackendError>;
    fn set_uniform_float(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: f32,
    ) -> Result<(), BackendError>;
    fn set_uniform_vec3(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Vec3,
    ) -> Result<(), BackendError>;
}

/// Instanced draw submission over the shared quad geometry.
///
/// Each family owns two per-instance float streams: the static attribute
/// (written on layout changes) and the dynamic amplitude attribute (written
/// every tick). A frame is `clear`, then draws in order, then `present`.
pub trait GraphicsBackend: ShaderBackend {
    fn resize(&mut self, viewport: ViewportSize) -> Result<(), BackendError>;
    fn write_static_attribute(
        &mut self,
        family: ShapeFamily,
        data: &[f32],
    ) -> Result<(), BackendError>;
    fn write_dynamic_attribute(
        &mut self,
        family: ShapeFamily,
        data: &[f32],
    ) -> Result<(), BackendError>;
    fn clear(&mut self) -> Result<(), BackendError>;
    fn draw_instanced(
        &mut self,
        program: ProgramHandle,
        family: ShapeFamily,
        instance_count: u32,
    ) -> Result<(), BackendError>;
    fn present(&mut self) -> Result<(), BackendError>;
}

/// Playback transport plus time-domain capture of the playing signal.
pub trait SignalSource {
    fn is_playing(&self) -> bool;
    /// `None` until the track metadata is available.
    fn current_time(&self) -> Option<f64>;
    /// `None` until the track metadata is available.
    fn duration(&self) -> Option<f64>;
    /// Analysis window in samples; a power of two in `[32, 4096]`.
    fn set_capture_window(&mut self, window: usize);
    /// Fill `out` with the most recent time-domain samples.
    fn request_samples(&mut self, out: &mut [f32]);
    fn play(&mut self) -> Result<(), BackendError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
}

/// Handle returned by [`IntervalTimer::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i32);

/// Cancellable periodic task. After `cancel` returns the callback never
/// fires again for that handle.
pub trait IntervalTimer {
    fn start(&mut self, interval: Duration) -> Result<TimerHandle, BackendError>;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Live host window size, polled once per tick.
pub trait ViewportSource {
    fn size(&self) -> ViewportSize;
}

/// Player chrome outside the canvas.
pub trait PlayerUi {
    /// Progress fill in `[0, 1]`.
    fn set_progress(&mut self, fraction: f32);
    fn set_timer_text(&mut self, text: &str);
    /// `true` shows the pause button, `false` the play button.
    fn set_playing(&mut self, playing: bool);
    fn set_accent_color(&mut self, hex: &str);
}
