use super::{with_visualizer, SharedVisualizer};
use crate::constants::PROGRESS_BAR_BG_ID;
use crate::dom;
use crate::input;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Pointer x in the same device-pixel space the viewport is measured in.
#[inline]
fn pointer_device_x(ev: &web::PointerEvent) -> f32 {
    input::css_to_device_px(ev.client_x() as f64, dom::device_pixel_ratio())
}

/// Press on the progress track starts a scrub; move and release are tracked
/// on the window so a drag that leaves the bar still lands.
pub fn wire_scrub_handlers(document: &web::Document, vis: &SharedVisualizer) {
    wire_pointerdown(document, vis);
    wire_pointermove(vis);
    wire_pointerup(vis);
    wire_pointercancel(vis);
}

fn wire_pointerdown(document: &web::Document, vis: &SharedVisualizer) {
    let Some(track) = document.get_element_by_id(PROGRESS_BAR_BG_ID) else {
        log::warn!("[scrub] missing #{}", PROGRESS_BAR_BG_ID);
        return;
    };
    // Touch drags on the track scrub instead of panning the page
    if let Some(el) = track.dyn_ref::<web::HtmlElement>() {
        _ = el.style().set_property("touch-action", "none");
    }
    let vis = vis.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let x = pointer_device_x(&ev);
        with_visualizer(&vis, |v| v.on_scrub_start(x));
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    _ = track.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointermove(vis: &SharedVisualizer) {
    let vis = vis.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let x = pointer_device_x(&ev);
        with_visualizer(&vis, |v| v.on_scrub_move(x));
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_pointerup(vis: &SharedVisualizer) {
    let vis = vis.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let x = pointer_device_x(&ev);
        with_visualizer(&vis, |v| {
            if let Err(e) = v.on_scrub_end(x) {
                log::warn!("[scrub] resume failed: {}", e);
            }
        });
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_pointercancel(vis: &SharedVisualizer) {
    let vis = vis.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        with_visualizer(&vis, |v| v.on_scrub_cancel());
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
