//! Signal Sampler Adapter.
//!
//! Wraps the external signal source: one capture per distinct instance count
//! per frame, with the capture window fixed at twice the instance count.
//! Samples are raw waveform amplitudes, not frequency bins.

use crate::backend::SignalSource;
use crate::constants::{MAX_CAPTURE_WINDOW, MIN_CAPTURE_WINDOW};
use crate::error::{Result, VisualizerError};
use smallvec::SmallVec;

/// One amplitude sample per instance for the current frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AmplitudeFrame {
    samples: Vec<f32>,
}

impl AmplitudeFrame {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Capture window for `count` instances, if the analyser can provide it.
pub fn capture_window(count: usize) -> Result<usize> {
    let window = count
        .checked_mul(2)
        .ok_or(VisualizerError::CaptureWindow(usize::MAX))?;
    if window.is_power_of_two() && (MIN_CAPTURE_WINDOW..=MAX_CAPTURE_WINDOW).contains(&window) {
        Ok(window)
    } else {
        Err(VisualizerError::CaptureWindow(window))
    }
}

#[derive(Debug, Default)]
pub struct SignalSampler {
    // Buffers are reused across frames; only the first `active` belong to
    // the current frame.
    frames: SmallVec<[AmplitudeFrame; 2]>,
    active: usize,
    captures: u64,
}

impl SignalSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's captures.
    pub fn begin_frame(&mut self) {
        self.active = 0;
    }

    /// Samples for `count` instances. A count already captured this frame is
    /// served from that capture without touching the source again.
    pub fn sample(
        &mut self,
        source: &mut dyn SignalSource,
        count: usize,
    ) -> Result<&AmplitudeFrame> {
        let window = capture_window(count)?;
        if let Some(i) = self.frames[..self.active]
            .iter()
            .position(|f| f.len() == count)
        {
            return Ok(&self.frames[i]);
        }

        if self.active == self.frames.len() {
            self.frames.push(AmplitudeFrame::default());
        }
        let slot = self.active;
        {
            let frame = &mut self.frames[slot];
            frame.samples.clear();
            frame.samples.resize(count, 0.0);
            source.set_capture_window(window);
            source.request_samples(&mut frame.samples);
        }
        self.active += 1;
        self.captures += 1;
        log::trace!("[sampler] captured {} samples (window {})", count, window);
        Ok(&self.frames[slot])
    }

    /// Captures taken in the current frame.
    pub fn frames(&self) -> &[AmplitudeFrame] {
        &self.frames[..self.active]
    }

    /// Total source captures since creation.
    pub fn capture_count(&self) -> u64 {
        self.captures
    }
}
