use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::window;

use crate::runtime::Runtime;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Drives `Runtime::tick` from `requestAnimationFrame`.
///
/// `pending` holds the id of the one outstanding request; the scheduler's
/// armed flag decides whether another is made.
pub struct FrameLoop {
    runtime: Rc<RefCell<Runtime>>,
    pending: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    pub fn new(runtime: Rc<RefCell<Runtime>>) -> Self {
        let pending = Rc::new(Cell::new(None));
        // `callback` holds the animation-frame closure so it can request
        // itself again; the closure keeps a clone of the slot it lives in.
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let slot = callback.clone();
        let rt = runtime.clone();
        let outstanding = pending.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            outstanding.set(None);
            let armed = match rt.try_borrow_mut() {
                Ok(mut runtime) => {
                    if runtime.scheduler.is_armed() {
                        runtime.tick(timestamp);
                    }
                    runtime.scheduler.is_armed()
                }
                // Busy inside an event handler; try again next frame.
                Err(_) => true,
            };
            if armed {
                if let Err(err) = request(&slot, &outstanding) {
                    log::error!("requestAnimationFrame failed: {err:?}");
                }
            }
        }) as Box<dyn FnMut(f64)>));

        Self {
            runtime,
            pending,
            callback,
        }
    }

    /// Brings the outstanding request in line with the armed flag.
    pub fn sync(&self) -> Result<(), JsValue> {
        let armed = self.runtime.borrow().scheduler.is_armed();
        match (armed, self.pending.get()) {
            (true, None) => request(&self.callback, &self.pending),
            (false, Some(handle)) => {
                self.pending.set(None);
                window()
                    .ok_or("no window")?
                    .cancel_animation_frame(handle)
            }
            _ => Ok(()),
        }
    }

    /// Cancels any request and drops the closure, breaking its self-reference.
    pub fn dispose(&self) {
        if let (Some(handle), Some(win)) = (self.pending.take(), window()) {
            if let Err(err) = win.cancel_animation_frame(handle) {
                log::debug!("cancelAnimationFrame failed: {err:?}");
            }
        }
        self.callback.borrow_mut().take();
    }
}

fn request(callback: &RefCell<Option<FrameCallback>>, pending: &Cell<Option<i32>>) -> Result<(), JsValue> {
    if pending.get().is_some() {
        return Ok(());
    }
    let callback = callback.borrow();
    let Some(cb) = callback.as_ref() else {
        return Ok(());
    };
    let handle = window()
        .ok_or("no window")?
        .request_animation_frame(cb.as_ref().unchecked_ref())?;
    pending.set(Some(handle));
    Ok(())
}
