use super::{with_visualizer, SharedVisualizer};
use crate::input::{self, KeyAction};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn target_is_text_entry(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| input::is_text_entry_tag(&el.tag_name()))
        .unwrap_or(false)
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, vis: &SharedVisualizer) {
    if ev.repeat() || target_is_text_entry(ev) {
        return;
    }
    match input::key_action(&ev.code(), &ev.key()) {
        Some(KeyAction::TogglePlayback) => {
            ev.prevent_default();
            with_visualizer(vis, |v| {
                if let Err(e) = v.toggle_playback() {
                    log::warn!("[keys] toggle failed: {}", e);
                }
                log::info!("[keys] playing={}", v.session().is_playing);
            });
        }
        None => {}
    }
}

pub fn wire_global_keydown(vis: &SharedVisualizer) {
    let vis = vis.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &vis);
    }) as Box<dyn FnMut(_)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
