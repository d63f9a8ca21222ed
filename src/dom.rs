use crate::input;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wavebars_core::{ViewportSize, ViewportSource};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn element_by_id<T: JsCast>(document: &web::Document, element_id: &str) -> Option<T> {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    handler: impl FnMut() + 'static,
) {
    add_listener(document, element_id, "click", handler);
}

/// Attach a no-argument listener for `event` on the element with `element_id`.
pub fn add_listener(
    document: &web::Document,
    element_id: &str,
    event: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[ui] missing #{} for '{}' listener", element_id, event);
    }
}

/// Set one inline CSS property on the element with `element_id`.
pub fn set_style(document: &web::Document, element_id: &str, property: &str, value: &str) {
    if let Some(el) = element_by_id::<web::HtmlElement>(document, element_id) {
        _ = el.style().set_property(property, value);
    }
}

#[inline]
pub fn device_pixel_ratio() -> f64 {
    web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// Body client area in device pixels.
pub fn body_device_size() -> ViewportSize {
    let Some(body) = window_document().and_then(|d| d.body()) else {
        return ViewportSize::default();
    };
    let dpr = device_pixel_ratio();
    let w = input::css_to_device_px(body.client_width() as f64, dpr);
    let h = input::css_to_device_px(body.client_height() as f64, dpr);
    ViewportSize::new(w.max(0.0) as u32, h.max(0.0) as u32)
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, size: ViewportSize) {
    canvas.set_width(size.width.max(1));
    canvas.set_height(size.height.max(1));
}

/// Live viewport read straight from the document on every poll.
#[derive(Default)]
pub struct DomViewport;

impl ViewportSource for DomViewport {
    fn size(&self) -> ViewportSize {
        body_device_size()
    }
}
