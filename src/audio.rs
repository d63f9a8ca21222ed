use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use wavebars_core::{BackendError, SignalSource};
use web_sys as web;

fn js_err(context: &str, e: JsValue) -> BackendError {
    BackendError::new(format!("{}: {:?}", context, e))
}

#[inline]
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// WebAudio graph tapping the `<audio>` element:
/// element -> media source -> analyser -> destination.
struct AnalyserGraph {
    audio_ctx: web::AudioContext,
    _source: web::MediaElementAudioSourceNode,
    analyser: web::AnalyserNode,
}

fn build_analyser_graph(element: &web::HtmlAudioElement) -> Result<AnalyserGraph, BackendError> {
    let audio_ctx = web::AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
    let source = audio_ctx
        .create_media_element_source(element)
        .map_err(|e| js_err("MediaElementSource", e))?;
    let analyser = web::AnalyserNode::new(&audio_ctx).map_err(|e| js_err("AnalyserNode", e))?;
    source
        .connect_with_audio_node(&analyser)
        .map_err(|e| js_err("connect source", e))?;
    analyser
        .connect_with_audio_node(&audio_ctx.destination())
        .map_err(|e| js_err("connect destination", e))?;
    log::info!(
        "[audio] analyser ready (sample rate {:.0} Hz)",
        audio_ctx.sample_rate()
    );
    Ok(AnalyserGraph {
        audio_ctx,
        _source: source,
        analyser,
    })
}

/// Signal source over an `<audio>` element. The audio graph is created on the
/// first `play()`, inside the user gesture that browsers require.
pub struct MediaElementSignal {
    element: web::HtmlAudioElement,
    graph: Option<AnalyserGraph>,
}

impl MediaElementSignal {
    pub fn new(element: web::HtmlAudioElement) -> Self {
        Self {
            element,
            graph: None,
        }
    }

    fn ensure_graph(&mut self) -> Result<&AnalyserGraph, BackendError> {
        if self.graph.is_none() {
            self.graph = Some(build_analyser_graph(&self.element)?);
        }
        self.graph
            .as_ref()
            .ok_or_else(|| BackendError::new("audio graph unavailable"))
    }
}

impl SignalSource for MediaElementSignal {
    fn is_playing(&self) -> bool {
        !self.element.paused() && !self.element.ended()
    }

    fn current_time(&self) -> Option<f64> {
        finite(self.element.current_time())
    }

    fn duration(&self) -> Option<f64> {
        finite(self.element.duration()).filter(|d| *d > 0.0)
    }

    fn set_capture_window(&mut self, window: usize) {
        if let Some(g) = &self.graph {
            if g.analyser.fft_size() as usize != window {
                g.analyser.set_fft_size(window as u32);
            }
        }
    }

    fn request_samples(&mut self, out: &mut [f32]) {
        match &self.graph {
            Some(g) => g.analyser.get_float_time_domain_data(out),
            None => out.fill(0.0),
        }
    }

    fn play(&mut self) -> Result<(), BackendError> {
        let graph = self.ensure_graph()?;
        if let Ok(resume) = graph.audio_ctx.resume() {
            spawn_local(async move {
                _ = JsFuture::from(resume).await;
            });
        }
        let promise = self.element.play().map_err(|e| js_err("play", e))?;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[audio] play rejected: {:?}", e);
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        _ = self.element.pause();
    }

    fn seek(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }
}
