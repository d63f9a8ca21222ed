pub mod controls;
pub mod keyboard;
pub mod pointer;

pub use controls::wire_controls;
pub use keyboard::wire_global_keydown;
pub use pointer::wire_scrub_handlers;

use std::cell::RefCell;
use std::rc::Rc;
use wavebars_core::Visualizer;

pub type SharedVisualizer = Rc<RefCell<Visualizer>>;

/// Run `f` against the visualizer unless a tick currently holds it.
pub(crate) fn with_visualizer(vis: &SharedVisualizer, f: impl FnOnce(&mut Visualizer)) {
    match vis.try_borrow_mut() {
        Ok(mut v) => f(&mut v),
        Err(_) => log::warn!("[events] visualizer busy, event dropped"),
    }
}
