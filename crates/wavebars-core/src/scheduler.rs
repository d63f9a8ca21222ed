//! Frame Scheduler: a fixed-cadence tick loop that exists only while
//! playback is active.

use crate::backend::{IntervalTimer, TimerHandle};
use crate::error::Result;
use instant::Instant;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub ticks: u64,
    pub last_tick: Option<Instant>,
    pub last_interval: Option<Duration>,
}

#[derive(Debug)]
pub struct FrameScheduler {
    interval: Duration,
    handle: Option<TimerHandle>,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.handle.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Idle -> Running. Already running is a no-op so there is never more
    /// than one live timer.
    pub fn start(&mut self, timer: &mut dyn IntervalTimer) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let handle = timer.start(self.interval)?;
        log::debug!(
            "[scheduler] running every {:.1}ms (timer {})",
            self.interval.as_secs_f64() * 1000.0,
            handle.0
        );
        self.handle = Some(handle);
        self.stats.last_tick = None;
        Ok(())
    }

    /// Running -> Idle. The timer is cancelled before this returns.
    pub fn stop(&mut self, timer: &mut dyn IntervalTimer) {
        if let Some(handle) = self.handle.take() {
            timer.cancel(handle);
            log::debug!("[scheduler] idle after {} ticks", self.stats.ticks);
        }
    }

    /// Gate for a timer callback. Returns `false` for a stray tick that
    /// arrives while Idle.
    pub fn begin_tick(&mut self) -> bool {
        if self.handle.is_none() {
            return false;
        }
        let now = Instant::now();
        self.stats.last_interval = self.stats.last_tick.map(|prev| now - prev);
        self.stats.last_tick = Some(now);
        self.stats.ticks += 1;
        if let Some(dt) = self.stats.last_interval {
            // More than two slots since the previous tick
            if dt > self.interval * 2 {
                log::debug!(
                    "[scheduler] tick {} late: {:.1}ms for a {:.1}ms slot",
                    self.stats.ticks,
                    dt.as_secs_f64() * 1000.0,
                    self.interval.as_secs_f64() * 1000.0
                );
            }
        }
        true
    }
}
