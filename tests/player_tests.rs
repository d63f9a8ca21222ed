// Host-side tests for the visualizer context, driven through recording
// collaborators that share one log.

use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wavebars_core::*;

#[derive(Default)]
struct Record {
    // Ordered trace across collaborators
    trace: Vec<&'static str>,
    compiled: u32,
    fail_compile: bool,
    fail_vec3: bool,
    fail_resize: bool,
    fail_static_once: Option<ShapeFamily>,
    fail_dynamic: bool,
    fail_present: bool,
    resizes: Vec<ViewportSize>,
    static_writes: Vec<(ShapeFamily, usize)>,
    dynamic_writes: Vec<(ShapeFamily, usize)>,
    draws: Vec<(ShapeFamily, u32)>,
    presents: usize,
    colors: Vec<(u32, Vec3)>,

    playing: bool,
    current_time: Option<f64>,
    duration: Option<f64>,
    windows: Vec<usize>,
    sample_requests: usize,
    seeks: Vec<f64>,

    fail_timer: bool,
    timers_started: usize,
    live_timers: Vec<i32>,
    interval: Option<Duration>,

    viewport: ViewportSize,

    progress: f32,
    timer_text: String,
    ui_playing: Option<bool>,
    ui_accent: String,
}

type Shared = Rc<RefCell<Record>>;

struct MockGraphics(Shared);
struct MockSignal(Shared);
struct MockTimer(Shared);
struct MockViewport(Shared);
struct MockUi(Shared);

impl ShaderBackend for MockGraphics {
    fn compile(&mut self, vs: &str, fs: &str) -> Result<ProgramHandle, BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_compile {
            return Err(BackendError::new("no context"));
        }
        assert!(vs.contains("vs_main") && fs.contains("fs_main"));
        r.compiled += 1;
        Ok(ProgramHandle(r.compiled - 1))
    }
    fn set_uniform_float(&mut self, _: ProgramHandle, name: &str, v: f32) -> Result<(), BackendError> {
        assert!(name == UNIFORM_WIDTH || name == UNIFORM_ASPECT, "{name}");
        assert!(v.is_finite());
        Ok(())
    }
    fn set_uniform_vec3(&mut self, p: ProgramHandle, name: &str, v: Vec3) -> Result<(), BackendError> {
        assert_eq!(name, UNIFORM_COLOR);
        let mut r = self.0.borrow_mut();
        if r.fail_vec3 {
            return Err(BackendError::new("lost context"));
        }
        r.colors.push((p.0, v));
        Ok(())
    }
}

impl GraphicsBackend for MockGraphics {
    fn resize(&mut self, viewport: ViewportSize) -> Result<(), BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_resize {
            return Err(BackendError::new("surface lost"));
        }
        r.trace.push("resize");
        r.resizes.push(viewport);
        Ok(())
    }
    fn write_static_attribute(&mut self, f: ShapeFamily, data: &[f32]) -> Result<(), BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_static_once == Some(f) {
            r.fail_static_once = None;
            return Err(BackendError::new("buffer write failed"));
        }
        r.static_writes.push((f, data.len()));
        Ok(())
    }
    fn write_dynamic_attribute(&mut self, f: ShapeFamily, data: &[f32]) -> Result<(), BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_dynamic {
            return Err(BackendError::new("buffer write failed"));
        }
        r.dynamic_writes.push((f, data.len()));
        Ok(())
    }
    fn clear(&mut self) -> Result<(), BackendError> {
        self.0.borrow_mut().trace.push("clear");
        Ok(())
    }
    fn draw_instanced(&mut self, _: ProgramHandle, f: ShapeFamily, n: u32) -> Result<(), BackendError> {
        self.0.borrow_mut().draws.push((f, n));
        Ok(())
    }
    fn present(&mut self) -> Result<(), BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_present {
            return Err(BackendError::new("surface timeout"));
        }
        r.trace.push("present");
        r.presents += 1;
        Ok(())
    }
}

impl SignalSource for MockSignal {
    fn is_playing(&self) -> bool {
        self.0.borrow().playing
    }
    fn current_time(&self) -> Option<f64> {
        self.0.borrow().current_time
    }
    fn duration(&self) -> Option<f64> {
        self.0.borrow().duration
    }
    fn set_capture_window(&mut self, window: usize) {
        self.0.borrow_mut().windows.push(window);
    }
    fn request_samples(&mut self, out: &mut [f32]) {
        let mut r = self.0.borrow_mut();
        r.trace.push("sample");
        r.sample_requests += 1;
        out.fill(0.25);
    }
    fn play(&mut self) -> Result<(), BackendError> {
        self.0.borrow_mut().playing = true;
        Ok(())
    }
    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }
    fn seek(&mut self, seconds: f64) {
        let mut r = self.0.borrow_mut();
        r.seeks.push(seconds);
        r.current_time = Some(seconds);
    }
}

impl IntervalTimer for MockTimer {
    fn start(&mut self, interval: Duration) -> Result<TimerHandle, BackendError> {
        let mut r = self.0.borrow_mut();
        if r.fail_timer {
            return Err(BackendError::new("no timer"));
        }
        r.timers_started += 1;
        let id = r.timers_started as i32;
        r.live_timers.push(id);
        r.interval = Some(interval);
        Ok(TimerHandle(id))
    }
    fn cancel(&mut self, handle: TimerHandle) {
        self.0.borrow_mut().live_timers.retain(|&id| id != handle.0);
    }
}

impl ViewportSource for MockViewport {
    fn size(&self) -> ViewportSize {
        self.0.borrow().viewport
    }
}

impl PlayerUi for MockUi {
    fn set_progress(&mut self, fraction: f32) {
        self.0.borrow_mut().progress = fraction;
    }
    fn set_timer_text(&mut self, text: &str) {
        self.0.borrow_mut().timer_text = text.to_string();
    }
    fn set_playing(&mut self, playing: bool) {
        self.0.borrow_mut().ui_playing = Some(playing);
    }
    fn set_accent_color(&mut self, hex: &str) {
        self.0.borrow_mut().ui_accent = hex.to_string();
    }
}

fn record(width: u32, height: u32) -> Shared {
    Rc::new(RefCell::new(Record {
        viewport: ViewportSize::new(width, height),
        ..Default::default()
    }))
}

fn build(rec: &Shared, config: VisualizerConfig) -> wavebars_core::error::Result<Visualizer> {
    Visualizer::new(
        config,
        Collaborators {
            graphics: Box::new(MockGraphics(rec.clone())),
            signal: Box::new(MockSignal(rec.clone())),
            timer: Box::new(MockTimer(rec.clone())),
            viewport: Box::new(MockViewport(rec.clone())),
            ui: Box::new(MockUi(rec.clone())),
        },
    )
}

fn visualizer(rec: &Shared) -> Visualizer {
    build(rec, VisualizerConfig::default()).unwrap()
}

fn reset_frame_log(rec: &Shared) {
    let mut r = rec.borrow_mut();
    r.trace.clear();
    r.dynamic_writes.clear();
    r.draws.clear();
    r.windows.clear();
    r.sample_requests = 0;
}

#[test]
fn startup_is_idle_with_layout_and_zero_clock() {
    let rec = record(1000, 600);
    let vis = visualizer(&rec);
    assert_eq!(vis.scheduler_state(), SchedulerState::Idle);
    assert_eq!(vis.layout().map(|l| l.bar.count()), Some(128));

    let r = rec.borrow();
    assert_eq!(r.compiled, 2);
    assert_eq!(r.resizes, vec![ViewportSize::new(1000, 600)]);
    assert_eq!(
        r.static_writes,
        vec![(ShapeFamily::Bar, 128), (ShapeFamily::Circle, 128)]
    );
    assert_eq!(r.ui_playing, Some(false));
    assert_eq!(r.timer_text, "0:00/0:00");
    assert_eq!(r.ui_accent, "#9bf3f0");
    assert!(r.live_timers.is_empty());
}

#[test]
fn startup_failure_is_a_configuration_error() {
    let rec = record(800, 600);
    rec.borrow_mut().fail_compile = true;
    match build(&rec, VisualizerConfig::default()) {
        Err(VisualizerError::Configuration(_)) => {}
        other => panic!("expected configuration error, got {:?}", other.err()),
    }
}

#[test]
fn repeated_play_keeps_a_single_timer() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    vis.play().unwrap();
    vis.toggle_playback().unwrap();
    vis.toggle_playback().unwrap();

    let r = rec.borrow();
    assert_eq!(r.live_timers.len(), 1);
    assert_eq!(r.timers_started, 2);
    assert_eq!(r.ui_playing, Some(true));
    assert_eq!(vis.scheduler_state(), SchedulerState::Running);
}

#[test]
fn tick_samples_draws_and_publishes_progress() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(100.0);
        r.current_time = Some(50.0);
    }
    vis.play().unwrap();
    reset_frame_log(&rec);
    vis.render_tick();

    let r = rec.borrow();
    // 128 bars and 128 circles read the same capture
    assert_eq!(r.sample_requests, 1);
    assert_eq!(r.windows, vec![256]);
    assert_eq!(
        r.dynamic_writes,
        vec![(ShapeFamily::Bar, 128), (ShapeFamily::Circle, 128)]
    );
    assert_eq!(
        r.draws,
        vec![(ShapeFamily::Bar, 128), (ShapeFamily::Circle, 128)]
    );
    assert_eq!(r.trace.last(), Some(&"present"));
    assert!((r.progress - 0.5).abs() < 1e-6);
    assert_eq!(r.timer_text, "0:50/1:40");
    assert_eq!(vis.scheduler().stats().ticks, 1);
}

#[test]
fn wide_viewport_captures_each_count_once() {
    let rec = record(2000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    reset_frame_log(&rec);
    vis.render_tick();

    let r = rec.borrow();
    assert_eq!(r.windows, vec![512, 256]);
    assert_eq!(
        r.dynamic_writes,
        vec![(ShapeFamily::Bar, 256), (ShapeFamily::Circle, 128)]
    );
}

#[test]
fn no_work_after_pause() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    vis.pause();
    reset_frame_log(&rec);
    vis.render_tick();

    let r = rec.borrow();
    assert!(r.live_timers.is_empty());
    assert_eq!(r.sample_requests, 0);
    assert!(r.draws.is_empty());
    assert_eq!(r.presents, 0);
    assert_eq!(r.ui_playing, Some(false));
    assert_eq!(vis.scheduler_state(), SchedulerState::Idle);
}

#[test]
fn stalled_signal_still_draws_without_sampling() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    rec.borrow_mut().playing = false;
    reset_frame_log(&rec);
    vis.render_tick();

    let r = rec.borrow();
    assert_eq!(r.sample_requests, 0);
    assert_eq!(r.draws.len(), 2);
}

#[test]
fn resize_lands_before_sampling_in_the_same_tick() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    reset_frame_log(&rec);
    rec.borrow_mut().viewport = ViewportSize::new(2000, 900);
    vis.render_tick();

    let r = rec.borrow();
    let resize_at = r.trace.iter().position(|t| *t == "resize").unwrap();
    let sample_at = r.trace.iter().position(|t| *t == "sample").unwrap();
    assert!(resize_at < sample_at);
    assert_eq!(r.dynamic_writes[0], (ShapeFamily::Bar, 256));
    assert_eq!(r.draws[0], (ShapeFamily::Bar, 256));
    assert_eq!(vis.layout().map(|l| l.viewport), Some(ViewportSize::new(2000, 900)));
}

#[test]
fn unchanged_viewport_does_not_resize() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    reset_frame_log(&rec);
    vis.render_tick();
    vis.render_tick();
    assert!(!rec.borrow().trace.contains(&"resize"));
}

#[test]
fn scrub_round_trip_seeks_and_resumes() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(200.0);
        r.current_time = Some(20.0);
    }
    vis.play().unwrap();

    vis.on_scrub_start(250.0);
    assert_eq!(vis.scheduler_state(), SchedulerState::Idle);
    assert!(rec.borrow().live_timers.is_empty());

    vis.on_scrub_move(500.0);
    {
        let r = rec.borrow();
        assert!((r.progress - 0.5).abs() < 1e-6);
        assert_eq!(r.timer_text, "1:40/3:20");
        assert!(r.seeks.is_empty());
    }

    vis.on_scrub_end(750.0).unwrap();
    let r = rec.borrow();
    assert_eq!(r.seeks, vec![150.0]);
    assert_eq!(r.live_timers.len(), 1);
    assert_eq!(r.ui_playing, Some(true));
    assert!(vis.scrub().is_none());
    assert!(vis.session().is_playing);
}

#[test]
fn scrub_clamps_outside_the_bar() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    rec.borrow_mut().duration = Some(100.0);
    vis.on_scrub_start(-40.0);
    vis.on_scrub_move(5000.0);
    assert!((rec.borrow().progress - 1.0).abs() < 1e-6);
    vis.on_scrub_end(-10.0).unwrap();
    assert_eq!(rec.borrow().seeks, vec![0.0]);
}

#[test]
fn scrub_without_duration_stays_paused() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.on_scrub_start(100.0);
    vis.on_scrub_move(600.0);
    assert_eq!(rec.borrow().timer_text, "0:00/0:00");
    vis.on_scrub_end(600.0).unwrap();

    let r = rec.borrow();
    assert!(r.seeks.is_empty());
    assert_eq!(r.progress, 0.0);
    assert!(r.live_timers.is_empty());
    assert!(!vis.session().is_playing);
}

#[test]
fn scrub_move_without_start_is_ignored() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    rec.borrow_mut().duration = Some(100.0);
    rec.borrow_mut().progress = 0.0;
    vis.on_scrub_move(900.0);
    vis.on_scrub_end(900.0).unwrap();
    let r = rec.borrow();
    assert_eq!(r.progress, 0.0);
    assert!(r.seeks.is_empty());
}

#[test]
fn invalid_color_keeps_the_previous_one() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    let before = vis.accent();
    let colors_before = rec.borrow().colors.len();

    assert!(matches!(
        vis.set_accent_color("#zzzzzz"),
        Err(VisualizerError::InvalidColor(_))
    ));
    assert_eq!(vis.accent(), before);
    assert_eq!(rec.borrow().colors.len(), colors_before);
    assert_eq!(rec.borrow().ui_accent, "#9bf3f0");

    vis.set_accent_color("#FF0000").unwrap();
    let r = rec.borrow();
    assert_eq!(vis.accent(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(r.ui_accent, "#ff0000");
    let applied: Vec<u32> = r.colors[colors_before..].iter().map(|c| c.0).collect();
    assert_eq!(applied, vec![0, 1]);
}

#[test]
fn color_backend_failure_keeps_the_previous_one() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    let before = vis.accent();
    rec.borrow_mut().fail_vec3 = true;
    assert!(matches!(
        vis.set_accent_color("#00ff00"),
        Err(VisualizerError::Backend(_))
    ));
    assert_eq!(vis.accent(), before);
    assert_eq!(rec.borrow().ui_accent, "#9bf3f0");
}

#[test]
fn track_end_returns_to_ready() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    vis.on_track_ended();
    let r = rec.borrow();
    assert!(r.live_timers.is_empty());
    assert_eq!(r.ui_playing, Some(false));
    assert!(!vis.session().is_playing);
}

#[test]
fn metadata_shows_total_duration() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(125.0);
        r.current_time = Some(0.0);
    }
    vis.on_metadata_loaded();
    assert_eq!(rec.borrow().timer_text, "0:00/2:05");
}

#[test]
fn source_change_resets_the_session() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(100.0);
        r.current_time = Some(30.0);
    }
    vis.play().unwrap();
    vis.on_scrub_start(10.0);
    {
        // The element still reports the previous track until the new one loads
        let mut r = rec.borrow_mut();
        r.duration = Some(225.0);
        r.current_time = Some(83.0);
    }
    vis.on_source_changed();
    {
        let r = rec.borrow();
        assert!(vis.scrub().is_none());
        assert!(!vis.session().is_playing);
        assert_eq!(vis.session().duration, None);
        assert_eq!(r.progress, 0.0);
        assert_eq!(r.timer_text, "0:00/0:00");
    }

    {
        let mut r = rec.borrow_mut();
        r.duration = Some(125.0);
        r.current_time = Some(0.0);
    }
    vis.on_metadata_loaded();
    assert_eq!(rec.borrow().timer_text, "0:00/2:05");
}

#[test]
fn timer_failure_leaves_playback_stopped() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    rec.borrow_mut().fail_timer = true;
    assert!(vis.play().is_err());
    let r = rec.borrow();
    assert!(!r.playing);
    assert_eq!(r.ui_playing, Some(false));
    assert_eq!(vis.scheduler_state(), SchedulerState::Idle);
}

#[test]
fn bars_only_runs_at_the_base_cadence() {
    let rec = record(1000, 600);
    let config = VisualizerConfig {
        circle_enabled: false,
        ..Default::default()
    };
    let mut vis = build(&rec, config).unwrap();
    vis.play().unwrap();
    reset_frame_log(&rec);
    vis.render_tick();

    let r = rec.borrow();
    assert_eq!(r.compiled, 1);
    assert_eq!(r.draws, vec![(ShapeFamily::Bar, 128)]);
    let ms = r.interval.unwrap().as_secs_f64() * 1000.0;
    assert!((ms - 1000.0 / 60.0).abs() < 1e-3);
}

#[test]
fn both_families_double_the_interval() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    let ms = rec.borrow().interval.unwrap().as_secs_f64() * 1000.0;
    assert!((ms - 2000.0 / 60.0).abs() < 1e-3);
}

#[test]
fn scrub_start_previews_immediately() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    rec.borrow_mut().duration = Some(200.0);
    vis.on_scrub_start(250.0);
    let r = rec.borrow();
    assert!((r.progress - 0.25).abs() < 1e-6);
    assert_eq!(r.timer_text, "0:50/3:20");
}

#[test]
fn cancelled_scrub_is_discarded() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(200.0);
        r.current_time = Some(20.0);
    }
    vis.play().unwrap();
    vis.on_scrub_start(250.0);
    vis.on_scrub_move(600.0);
    vis.on_scrub_cancel();
    {
        let r = rec.borrow();
        assert!(vis.scrub().is_none());
        assert!((r.progress - 0.1).abs() < 1e-6);
        assert_eq!(r.timer_text, "0:20/3:20");
        assert!(r.live_timers.is_empty());
    }

    // A later release or play must not seek to the abandoned position
    vis.on_scrub_end(900.0).unwrap();
    vis.play().unwrap();
    assert!(rec.borrow().seeks.is_empty());
    assert_eq!(vis.scheduler_state(), SchedulerState::Running);
}

#[test]
fn failed_layout_change_is_rolled_back() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    reset_frame_log(&rec);
    {
        let mut r = rec.borrow_mut();
        r.static_writes.clear();
        r.resizes.clear();
        r.viewport = ViewportSize::new(2000, 600);
        r.fail_static_once = Some(ShapeFamily::Circle);
    }
    vis.render_tick();
    {
        let r = rec.borrow();
        // New bars went out, the circle write failed, the old layout went back
        assert_eq!(
            r.static_writes,
            vec![
                (ShapeFamily::Bar, 256),
                (ShapeFamily::Bar, 128),
                (ShapeFamily::Circle, 128)
            ]
        );
        assert_eq!(r.resizes.last(), Some(&ViewportSize::new(1000, 600)));
        assert_eq!(
            r.draws,
            vec![(ShapeFamily::Bar, 128), (ShapeFamily::Circle, 128)]
        );
        assert_eq!(r.dynamic_writes[0], (ShapeFamily::Bar, 128));
    }
    assert_eq!(vis.layout().map(|l| l.bar.count()), Some(128));

    // The viewport still differs, so the next tick tries again and succeeds
    reset_frame_log(&rec);
    vis.render_tick();
    let r = rec.borrow();
    assert_eq!(r.draws[0], (ShapeFamily::Bar, 256));
    assert_eq!(vis.layout().map(|l| l.viewport), Some(ViewportSize::new(2000, 600)));
}

#[test]
fn failed_resize_keeps_the_previous_layout() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    reset_frame_log(&rec);
    {
        let mut r = rec.borrow_mut();
        r.viewport = ViewportSize::new(2000, 600);
        r.fail_resize = true;
    }
    vis.render_tick();
    let r = rec.borrow();
    assert_eq!(r.draws[0], (ShapeFamily::Bar, 128));
    assert_eq!(r.sample_requests, 1);
    assert_eq!(vis.layout().map(|l| l.viewport), Some(ViewportSize::new(1000, 600)));
}

#[test]
fn failing_present_does_not_stop_later_ticks() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    {
        let mut r = rec.borrow_mut();
        r.duration = Some(100.0);
        r.current_time = Some(10.0);
        r.fail_present = true;
    }
    vis.play().unwrap();
    reset_frame_log(&rec);

    vis.render_tick();
    assert_eq!(rec.borrow().timer_text, "0:10/1:40");
    rec.borrow_mut().current_time = Some(11.0);
    vis.render_tick();

    let r = rec.borrow();
    assert_eq!(r.sample_requests, 2);
    assert_eq!(r.draws.len(), 4);
    assert_eq!(r.presents, 0);
    assert_eq!(r.timer_text, "0:11/1:40");
    assert!((r.progress - 0.11).abs() < 1e-6);
    assert_eq!(vis.scheduler_state(), SchedulerState::Running);
    let stats = vis.scheduler().stats();
    assert_eq!(stats.ticks, 2);
    assert!(stats.last_tick.is_some());
    assert!(stats.last_interval.is_some());
}

#[test]
fn failing_amplitude_write_still_draws() {
    let rec = record(1000, 600);
    let mut vis = visualizer(&rec);
    vis.play().unwrap();
    rec.borrow_mut().fail_dynamic = true;
    reset_frame_log(&rec);
    vis.render_tick();
    vis.render_tick();

    let r = rec.borrow();
    assert_eq!(r.sample_requests, 2);
    assert!(r.dynamic_writes.is_empty());
    assert_eq!(r.draws.len(), 4);
    assert_eq!(r.presents, 2);
}
