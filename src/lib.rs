#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use wavebars_core::{to_hex_color, Collaborators, ViewportSource, Visualizer, VisualizerConfig};
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod render;

use constants::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("wavebars-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            overlay::report_fatal(&format!("Visualizer unavailable: {}", e));
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = dom::element_by_id(&document, CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?;
    let audio_el: web::HtmlAudioElement = dom::element_by_id(&document, AUDIO_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", AUDIO_ID))?;
    _ = audio_el.pause();

    // Backing store must match the viewport before the surface is configured
    let viewport = dom::DomViewport;
    dom::sync_canvas_backing_size(&canvas, viewport.size());
    let gpu = render::GpuState::new(&canvas).await?;

    let config = VisualizerConfig::default();
    if let Some(picker) = dom::element_by_id::<web::HtmlInputElement>(&document, COLOR_INPUT_ID) {
        picker.set_value(&to_hex_color(config.accent));
    }

    let (timer, tick_slot) = frame::WebIntervalTimer::new();
    let visualizer = Visualizer::new(
        config,
        Collaborators {
            graphics: Box::new(gpu),
            signal: Box::new(audio::MediaElementSignal::new(audio_el.clone())),
            timer: Box::new(timer),
            viewport: Box::new(viewport),
            ui: Box::new(overlay::DomUi::new(&document)),
        },
    )?;
    let vis = Rc::new(RefCell::new(visualizer));
    frame::bind_tick(&tick_slot, &vis);

    events::wire_controls(&document, &audio_el, &vis);
    events::wire_scrub_handlers(&document, &vis);
    events::wire_global_keydown(&vis);

    log::info!("[init] ready");
    Ok(())
}
