use crate::constants::*;
use crate::dom;
use crate::input;
use std::sync::atomic::{AtomicBool, Ordering};
use wavebars_core::PlayerUi;
use web_sys as web;

/// Player chrome around the canvas: progress fill, clock, transport buttons
/// and accent-colored overlay.
pub struct DomUi {
    document: web::Document,
}

impl DomUi {
    pub fn new(document: &web::Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    #[inline]
    fn set_visible(&self, element_id: &str, visible: bool) {
        let display = if visible { "inline-block" } else { "none" };
        dom::set_style(&self.document, element_id, "display", display);
    }
}

impl PlayerUi for DomUi {
    fn set_progress(&mut self, fraction: f32) {
        dom::set_style(
            &self.document,
            PROGRESS_BAR_ID,
            "width",
            &input::percent_width(fraction),
        );
    }

    fn set_timer_text(&mut self, text: &str) {
        if let Some(el) = dom::element_by_id::<web::HtmlElement>(&self.document, TIMER_ID) {
            el.set_inner_text(text);
        }
    }

    fn set_playing(&mut self, playing: bool) {
        self.set_visible(PLAY_BUTTON_ID, !playing);
        self.set_visible(PAUSE_BUTTON_ID, playing);
    }

    fn set_accent_color(&mut self, hex: &str) {
        dom::set_style(&self.document, OVERLAY_ID, "color", hex);
        dom::set_style(&self.document, PROGRESS_BAR_ID, "background-color", hex);
        dom::set_style(&self.document, PROGRESS_BAR_BG_ID, "border-color", hex);
    }
}

/// Tell the user the visualizer cannot run, once per page: in the title slot
/// when the page has one, otherwise as an alert.
pub fn report_fatal(message: &str) {
    static REPORTED: AtomicBool = AtomicBool::new(false);
    log::error!("[init] {}", message);
    if REPORTED.swap(true, Ordering::SeqCst) {
        return;
    }
    let title = dom::window_document()
        .and_then(|d| dom::element_by_id::<web::HtmlElement>(&d, TITLE_ID));
    match title {
        Some(el) => el.set_inner_text(message),
        None => {
            if let Some(w) = web::window() {
                _ = w.alert_with_message(message);
            }
        }
    }
}
