use super::{with_visualizer, SharedVisualizer};
use crate::constants::*;
use crate::dom;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// Buttons, pickers and media element events.
pub fn wire_controls(
    document: &web::Document,
    audio: &web::HtmlAudioElement,
    vis: &SharedVisualizer,
) {
    wire_transport_buttons(document, vis);
    wire_source_picker(document, audio, vis);
    wire_color_picker(document, vis);
    wire_background_picker(document);
    wire_media_events(document, vis);
}

fn wire_transport_buttons(document: &web::Document, vis: &SharedVisualizer) {
    let vis_play = vis.clone();
    dom::add_click_listener(document, PLAY_BUTTON_ID, move || {
        with_visualizer(&vis_play, |v| {
            if let Err(e) = v.play() {
                log::warn!("[ui] play failed: {}", e);
            }
        });
    });
    let vis_pause = vis.clone();
    dom::add_click_listener(document, PAUSE_BUTTON_ID, move || {
        with_visualizer(&vis_pause, |v| v.pause());
    });
}

/// First file of a file input as a fresh object URL, revoking the one it replaces.
fn take_object_url(
    input: &web::HtmlInputElement,
    previous: &RefCell<Option<String>>,
) -> Option<(String, String)> {
    let file = input.files().and_then(|list| list.get(0))?;
    let url = match web::Url::create_object_url_with_blob(&file) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("[ui] object url for '{}' failed: {:?}", file.name(), e);
            return None;
        }
    };
    if let Some(old) = previous.borrow_mut().replace(url.clone()) {
        _ = web::Url::revoke_object_url(&old);
    }
    Some((url, file.name()))
}

fn wire_source_picker(
    document: &web::Document,
    audio: &web::HtmlAudioElement,
    vis: &SharedVisualizer,
) {
    let Some(input) = dom::element_by_id::<web::HtmlInputElement>(document, SOURCE_INPUT_ID) else {
        log::warn!("[ui] missing #{}", SOURCE_INPUT_ID);
        return;
    };
    let current: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let audio = audio.clone();
    let vis = vis.clone();
    let doc = document.clone();
    dom::add_listener(document, SOURCE_INPUT_ID, "change", move || {
        let Some((url, name)) = take_object_url(&input, &current) else {
            return;
        };
        audio.set_src(&url);
        with_visualizer(&vis, |v| v.on_source_changed());
        if let Some(title) = dom::element_by_id::<web::HtmlElement>(&doc, TITLE_ID) {
            title.set_inner_text(&name);
        }
        log::info!("[ui] source '{}'", name);
    });
}

fn wire_color_picker(document: &web::Document, vis: &SharedVisualizer) {
    let Some(input) = dom::element_by_id::<web::HtmlInputElement>(document, COLOR_INPUT_ID) else {
        log::warn!("[ui] missing #{}", COLOR_INPUT_ID);
        return;
    };
    let vis = vis.clone();
    dom::add_listener(document, COLOR_INPUT_ID, "input", move || {
        let value = input.value();
        // Rejections are logged by the visualizer; the old color stays.
        with_visualizer(&vis, |v| {
            _ = v.set_accent_color(&value);
        });
    });
}

fn wire_background_picker(document: &web::Document) {
    let Some(input) = dom::element_by_id::<web::HtmlInputElement>(document, BACKGROUND_INPUT_ID)
    else {
        log::warn!("[ui] missing #{}", BACKGROUND_INPUT_ID);
        return;
    };
    let current: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let doc = document.clone();
    dom::add_listener(document, BACKGROUND_INPUT_ID, "change", move || {
        let Some((url, name)) = take_object_url(&input, &current) else {
            return;
        };
        if let Some(body) = doc.body() {
            let style = body.style();
            _ = style.set_property("background-image", &format!("url(\"{}\")", url));
            _ = style.set_property("background-size", "cover");
            _ = style.set_property("background-position", "center");
        }
        log::info!("[ui] background '{}'", name);
    });
}

fn wire_media_events(document: &web::Document, vis: &SharedVisualizer) {
    let vis_ended = vis.clone();
    dom::add_listener(document, AUDIO_ID, "ended", move || {
        with_visualizer(&vis_ended, |v| v.on_track_ended());
    });
    let vis_meta = vis.clone();
    dom::add_listener(document, AUDIO_ID, "loadedmetadata", move || {
        with_visualizer(&vis_meta, |v| v.on_metadata_loaded());
    });
}
