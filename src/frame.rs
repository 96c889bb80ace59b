use std::cell::{Cell, RefCell};
use std::rc::Rc;
use testerz_core::LoopHandle;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` loop that re-arms itself after every frame until cancelled.
///
/// Cancelling clears the pending request and drops the callback, which also
/// breaks the closure's reference back to itself.
pub struct AnimationLoop {
    tick: FrameClosure,
    request_id: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start(mut frame: Box<dyn FnMut()>) -> Self {
        let tick: FrameClosure = Rc::new(RefCell::new(None));
        let request_id = Rc::new(Cell::new(None));

        let tick_clone = tick.clone();
        let request_id_tick = request_id.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            request_id_tick.set(None);
            frame();
            if let Some(cb) = tick_clone.borrow().as_ref() {
                request_id_tick.set(request_frame(cb));
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = tick.borrow().as_ref() {
            request_id.set(request_frame(cb));
        }
        Self { tick, request_id }
    }
}

impl LoopHandle for AnimationLoop {
    fn cancel(&mut self) {
        if let Some(id) = self.request_id.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        if let Ok(mut tick) = self.tick.try_borrow_mut() {
            tick.take();
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn request_frame(cb: &Closure<dyn FnMut()>) -> Option<i32> {
    web::window()?
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .ok()
}
