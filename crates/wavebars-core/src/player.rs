//! The visualizer context: Playback/Scrub Controller plus the per-tick
//! render pipeline. One `Visualizer` owns every piece of mutable state; the
//! platform shell holds it and forwards events and timer ticks to it.

use crate::backend::{
    GraphicsBackend, IntervalTimer, PlayerUi, ProgramHandle, SignalSource, ViewportSource,
};
use crate::color::{parse_hex_color, to_hex_color};
use crate::config::VisualizerConfig;
use crate::constants::{UNIFORM_ASPECT, UNIFORM_COLOR, UNIFORM_WIDTH};
use crate::error::{BackendError, Result, VisualizerError};
use crate::layout::{self, InstanceLayout};
use crate::sampler::SignalSampler;
use crate::scheduler::{FrameScheduler, SchedulerState};
use crate::state::{PlaybackSession, ScrubState, ShapeFamily};
use crate::timefmt::timer_text;
use crate::{BAR_VS_WGSL, CIRCLE_VS_WGSL, SHAPE_FS_WGSL};
use glam::Vec3;

/// Platform implementations the visualizer drives.
pub struct Collaborators {
    pub graphics: Box<dyn GraphicsBackend>,
    pub signal: Box<dyn SignalSource>,
    pub timer: Box<dyn IntervalTimer>,
    pub viewport: Box<dyn ViewportSource>,
    pub ui: Box<dyn PlayerUi>,
}

#[derive(Clone, Copy, Debug)]
struct Programs {
    bar: ProgramHandle,
    circle: Option<ProgramHandle>,
}

impl Programs {
    fn get(&self, family: ShapeFamily) -> Option<ProgramHandle> {
        match family {
            ShapeFamily::Bar => Some(self.bar),
            ShapeFamily::Circle => self.circle,
        }
    }
}

pub struct Visualizer {
    config: VisualizerConfig,
    graphics: Box<dyn GraphicsBackend>,
    signal: Box<dyn SignalSource>,
    timer: Box<dyn IntervalTimer>,
    viewport: Box<dyn ViewportSource>,
    ui: Box<dyn PlayerUi>,
    programs: Programs,
    // Last applied layout; `None` only if the startup layout failed.
    layout: Option<InstanceLayout>,
    sampler: SignalSampler,
    scheduler: FrameScheduler,
    session: PlaybackSession,
    scrub: Option<ScrubState>,
    accent: Vec3,
}

impl Visualizer {
    /// Compile both programs, apply the accent color and the initial layout.
    /// Any failure here is a configuration error.
    pub fn new(config: VisualizerConfig, parts: Collaborators) -> Result<Self> {
        let Collaborators {
            mut graphics,
            signal,
            timer,
            viewport,
            ui,
        } = parts;

        let bar = graphics
            .compile(BAR_VS_WGSL, SHAPE_FS_WGSL)
            .map_err(|e| VisualizerError::Configuration(format!("bar program: {e}")))?;
        let circle = if config.circle_enabled {
            Some(
                graphics
                    .compile(CIRCLE_VS_WGSL, SHAPE_FS_WGSL)
                    .map_err(|e| VisualizerError::Configuration(format!("circle program: {e}")))?,
            )
        } else {
            None
        };

        let scheduler = FrameScheduler::new(config.tick_interval());
        let accent = config.accent;
        let mut vis = Self {
            config,
            graphics,
            signal,
            timer,
            viewport,
            ui,
            programs: Programs { bar, circle },
            layout: None,
            sampler: SignalSampler::new(),
            scheduler,
            session: PlaybackSession::default(),
            scrub: None,
            accent,
        };

        vis.apply_accent(accent)
            .map_err(|e| VisualizerError::Configuration(format!("accent uniform: {e}")))?;
        vis.ui.set_accent_color(&to_hex_color(accent));

        let size = vis.viewport.size();
        vis.on_resize(size.width, size.height)
            .map_err(|e| VisualizerError::Configuration(format!("initial layout: {e}")))?;

        vis.ui.set_playing(false);
        vis.refresh_session();
        vis.publish_progress();
        Ok(vis)
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn scrub(&self) -> Option<&ScrubState> {
        self.scrub.as_ref()
    }

    pub fn layout(&self) -> Option<&InstanceLayout> {
        self.layout.as_ref()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn sampler(&self) -> &SignalSampler {
        &self.sampler
    }

    pub fn accent(&self) -> Vec3 {
        self.accent
    }

    // ---------------- Layout ----------------

    /// Recompute the instance layout for a viewport and push it to the
    /// backend. On failure the previous layout is pushed again so the
    /// backend never holds a mix of old and new instance data.
    pub fn on_resize(&mut self, width: u32, height: u32) -> Result<()> {
        let next = layout::recompute(width, height, &self.config.layout_params());
        if let Err(e) = self.apply_layout(&next) {
            if let Some(prev) = self.layout.take() {
                if let Err(restore) = self.apply_layout(&prev) {
                    log::warn!(
                        "[layout] could not restore {}x{}: {}",
                        prev.viewport.width,
                        prev.viewport.height,
                        restore
                    );
                }
                self.layout = Some(prev);
            }
            return Err(e.into());
        }
        log::info!(
            "[layout] {}x{} -> bars={} circles={}",
            width,
            height,
            next.bar.count(),
            next.circle.count()
        );
        self.layout = Some(next);
        Ok(())
    }

    fn apply_layout(&mut self, next: &InstanceLayout) -> Result<(), BackendError> {
        self.graphics.resize(next.viewport)?;
        for &family in self.config.families() {
            let Some(program) = self.programs.get(family) else {
                continue;
            };
            let set = next.set(family);
            self.graphics
                .write_static_attribute(family, set.static_attribute())?;
            self.graphics
                .set_uniform_float(program, UNIFORM_WIDTH, set.visual_width())?;
            if family == ShapeFamily::Circle {
                self.graphics
                    .set_uniform_float(program, UNIFORM_ASPECT, next.aspect)?;
            }
        }
        Ok(())
    }

    // ---------------- Frame ----------------

    /// One scheduler tick: reconcile the viewport, sample, draw, publish.
    /// Never fails; backend errors are logged and the tick moves on.
    pub fn render_tick(&mut self) {
        if !self.scheduler.begin_tick() {
            log::trace!("[scheduler] stray tick while idle");
            return;
        }

        // Layout changes land before any sampling so sample counts match
        // the instance counts drawn this tick.
        let live = self.viewport.size();
        if self.layout.as_ref().map(|l| l.viewport) != Some(live) {
            if let Err(e) = self.on_resize(live.width, live.height) {
                log::warn!("[layout] resize to {}x{} failed: {}", live.width, live.height, e);
            }
        }

        self.refresh_session();

        if let Some(layout) = self.layout.as_ref() {
            let families = self.config.families();
            self.sampler.begin_frame();
            if self.session.is_playing && self.signal.is_playing() {
                for &family in families {
                    let count = layout.set(family).count();
                    match self.sampler.sample(self.signal.as_mut(), count) {
                        Ok(frame) => {
                            if let Err(e) =
                                self.graphics.write_dynamic_attribute(family, frame.samples())
                            {
                                log::warn!("[gpu] {} amplitudes not updated: {}", family.name(), e);
                            }
                        }
                        Err(e) => log::warn!("[sampler] {}: {}", family.name(), e),
                    }
                }
            }

            if let Err(e) = submit_frame(self.graphics.as_mut(), self.programs, families, layout) {
                log::warn!("[gpu] frame dropped: {}", e);
            }
        }

        self.publish_progress();
    }

    fn refresh_session(&mut self) {
        self.session.current_time = self.signal.current_time();
        self.session.duration = self.signal.duration();
    }

    fn publish_progress(&mut self) {
        self.ui.set_progress(self.session.progress());
        self.ui.set_timer_text(&timer_text(
            self.session.current_time,
            self.session.known_duration(),
        ));
    }

    // ---------------- Playback ----------------

    /// Start playback and the tick loop. A pending scrub is committed first.
    pub fn play(&mut self) -> Result<()> {
        if let Some(scrub) = self.scrub.take() {
            self.commit_scrub(scrub.pending_fraction);
        }
        if self.session.is_playing && self.scheduler.is_running() {
            return Ok(());
        }
        if let Err(e) = self.signal.play() {
            log::error!("[playback] signal source refused to play: {}", e);
            return Err(e.into());
        }
        if let Err(e) = self.scheduler.start(self.timer.as_mut()) {
            log::error!("[scheduler] could not start: {}", e);
            self.signal.pause();
            return Err(e);
        }
        self.session.is_playing = true;
        self.ui.set_playing(true);
        log::info!("[playback] playing");
        Ok(())
    }

    /// Stop the tick loop and playback. No tick fires after this returns.
    pub fn pause(&mut self) {
        self.scheduler.stop(self.timer.as_mut());
        self.signal.pause();
        self.session.is_playing = false;
        self.ui.set_playing(false);
        log::info!("[playback] paused");
    }

    pub fn toggle_playback(&mut self) -> Result<()> {
        if self.session.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Natural end of track: back to "ready to play".
    pub fn on_track_ended(&mut self) {
        log::info!("[playback] track ended");
        self.pause();
    }

    /// Track metadata became available: show `0:00/total`.
    pub fn on_metadata_loaded(&mut self) {
        self.refresh_session();
        log::info!(
            "[playback] metadata loaded, duration {:?}",
            self.session.known_duration()
        );
        self.publish_progress();
    }

    /// A new track was selected: stop everything and forget the old session.
    /// The media element keeps reporting the previous track's times until
    /// the new one loads, so the guard display is shown until
    /// `on_metadata_loaded`.
    pub fn on_source_changed(&mut self) {
        self.pause();
        self.scrub = None;
        self.session = PlaybackSession::default();
        self.publish_progress();
    }

    // ---------------- Scrubbing ----------------

    pub fn on_scrub_start(&mut self, pointer_x: f32) {
        self.pause();
        let fraction = self.pointer_fraction(pointer_x);
        self.scrub = Some(ScrubState {
            pending_fraction: fraction,
        });
        self.preview_scrub(fraction);
        log::debug!("[scrub] start at {:.3}", fraction);
    }

    /// Immediate fill and clock preview; no tick involved.
    pub fn on_scrub_move(&mut self, pointer_x: f32) {
        let fraction = self.pointer_fraction(pointer_x);
        let Some(scrub) = self.scrub.as_mut() else {
            return;
        };
        scrub.pending_fraction = fraction;
        self.preview_scrub(fraction);
    }

    /// The gesture was taken over by the browser (scroll, pan). Drop the
    /// pending position, stay paused and show the real position again.
    pub fn on_scrub_cancel(&mut self) {
        if self.scrub.take().is_none() {
            return;
        }
        log::debug!("[scrub] cancelled");
        self.refresh_session();
        self.publish_progress();
    }

    fn preview_scrub(&mut self, fraction: f32) {
        self.refresh_session();
        let duration = self.session.known_duration();
        self.ui.set_progress(fraction);
        self.ui
            .set_timer_text(&timer_text(duration.map(|d| fraction as f64 * d), duration));
    }

    /// Commit the drag: seek and resume when the duration is known,
    /// otherwise reset the fill and stay paused.
    pub fn on_scrub_end(&mut self, pointer_x: f32) -> Result<()> {
        let fraction = self.pointer_fraction(pointer_x);
        if self.scrub.take().is_none() {
            return Ok(());
        }
        if self.commit_scrub(fraction) {
            self.play()
        } else {
            log::debug!("[scrub] no duration yet, staying paused");
            self.ui.set_progress(0.0);
            Ok(())
        }
    }

    fn commit_scrub(&mut self, fraction: f32) -> bool {
        self.refresh_session();
        match self.session.known_duration() {
            Some(duration) => {
                let target = fraction as f64 * duration;
                self.signal.seek(target);
                self.session.current_time = Some(target);
                log::debug!("[scrub] seek to {:.2}s of {:.2}s", target, duration);
                true
            }
            None => false,
        }
    }

    fn pointer_fraction(&self, pointer_x: f32) -> f32 {
        let width = self.viewport.size().width;
        if width == 0 || !pointer_x.is_finite() {
            return 0.0;
        }
        (pointer_x / width as f32).clamp(0.0, 1.0)
    }

    // ---------------- Color ----------------

    /// Parse and apply an accent color to both families. Malformed input is
    /// rejected and the previous color stays.
    pub fn set_accent_color(&mut self, hex: &str) -> Result<()> {
        let rgb = match parse_hex_color(hex) {
            Ok(rgb) => rgb,
            Err(e) => {
                log::warn!("[ui] {}; keeping {}", e, to_hex_color(self.accent));
                return Err(e);
            }
        };
        if let Err(e) = self.apply_accent(rgb) {
            log::warn!("[gpu] accent uniform failed: {}", e);
            _ = self.apply_accent(self.accent);
            return Err(e.into());
        }
        self.accent = rgb;
        self.ui.set_accent_color(&to_hex_color(rgb));
        Ok(())
    }

    fn apply_accent(&mut self, rgb: Vec3) -> Result<(), BackendError> {
        for &family in self.config.families() {
            if let Some(program) = self.programs.get(family) {
                self.graphics.set_uniform_vec3(program, UNIFORM_COLOR, rgb)?;
            }
        }
        Ok(())
    }
}

fn submit_frame(
    graphics: &mut dyn GraphicsBackend,
    programs: Programs,
    families: &[ShapeFamily],
    layout: &InstanceLayout,
) -> Result<(), BackendError> {
    graphics.clear()?;
    for &family in families {
        if let Some(program) = programs.get(family) {
            graphics.draw_instanced(program, family, layout.set(family).count() as u32)?;
        }
    }
    graphics.present()
}
