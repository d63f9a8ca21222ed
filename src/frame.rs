use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wavebars_core::{BackendError, IntervalTimer, TimerHandle, Visualizer};
use web_sys as web;

/// Slot holding the tick callback shared by every interval the timer starts.
pub type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `setInterval`-backed timer. The callback lives in a shared slot so it can
/// be bound after the visualizer that owns this timer has been built.
pub struct WebIntervalTimer {
    tick: TickSlot,
}

impl WebIntervalTimer {
    pub fn new() -> (Self, TickSlot) {
        let tick: TickSlot = Rc::new(RefCell::new(None));
        (Self { tick: tick.clone() }, tick)
    }
}

impl IntervalTimer for WebIntervalTimer {
    fn start(&mut self, interval: Duration) -> Result<TimerHandle, BackendError> {
        let window = web::window().ok_or_else(|| BackendError::new("no window"))?;
        let slot = self.tick.borrow();
        let Some(callback) = slot.as_ref() else {
            return Err(BackendError::new("tick callback not bound"));
        };
        let timeout_ms = interval.as_secs_f64() * 1000.0;
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                timeout_ms.round().max(1.0) as i32,
            )
            .map_err(|e| BackendError::new(format!("setInterval: {:?}", e)))?;
        log::info!("[frame] interval {} every {:.1}ms", id, timeout_ms);
        Ok(TimerHandle(id))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(w) = web::window() {
            w.clear_interval_with_handle(handle.0);
            log::info!("[frame] interval {} cleared", handle.0);
        }
    }
}

/// Install the per-tick callback. The closure holds only a weak reference so
/// dropping the visualizer ends the loop; a tick that lands while an event
/// handler holds the visualizer is skipped.
pub fn bind_tick(slot: &TickSlot, visualizer: &Rc<RefCell<Visualizer>>) {
    let weak: Weak<RefCell<Visualizer>> = Rc::downgrade(visualizer);
    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let Some(vis) = weak.upgrade() else {
            return;
        };
        match vis.try_borrow_mut() {
            Ok(mut v) => v.render_tick(),
            Err(_) => log::debug!("[frame] tick skipped, visualizer busy"),
        };
    }) as Box<dyn FnMut()>));
}
