use crate::constants::{TOAST_DESCRIPTION_ID, TOAST_DURATION_MS, TOAST_ID, TOAST_TITLE_ID};
use std::cell::Cell;
use std::rc::Rc;
use testerz_core::{Notice, NotificationSink};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(TOAST_ID) {
        _ = el.class_list().remove_1("hidden");
        // fallback for pages without the CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(TOAST_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

/// Notification sink backed by the page's `#toast` element.
///
/// Each notice replaces the previous one and hides itself after
/// `TOAST_DURATION_MS`; a newer notice keeps an older timer from hiding it.
#[derive(Clone)]
pub struct ToastSink {
    document: web::Document,
    generation: Rc<Cell<u32>>,
}

impl ToastSink {
    pub fn new(document: web::Document) -> Self {
        Self {
            document,
            generation: Rc::new(Cell::new(0)),
        }
    }
}

impl NotificationSink for ToastSink {
    fn notify(&self, notice: &Notice) {
        let Some(el) = self.document.get_element_by_id(TOAST_ID) else {
            // No toast element on this page: the console is the only place left.
            if notice.is_error() {
                log::error!("{}: {}", notice.title, notice.description);
            } else {
                log::info!("{}: {}", notice.title, notice.description);
            }
            return;
        };
        crate::dom::set_text(&self.document, TOAST_TITLE_ID, &notice.title);
        crate::dom::set_text(&self.document, TOAST_DESCRIPTION_ID, &notice.description);
        let classes = el.class_list();
        if notice.is_error() {
            _ = classes.add_1("toast-error");
        } else {
            _ = classes.remove_1("toast-error");
        }
        show(&self.document);

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        let current = self.generation.clone();
        let document = self.document.clone();
        let closure = Closure::once(move || {
            if current.get() == generation {
                hide(&document);
            }
        });
        if let Some(window) = web::window() {
            _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                TOAST_DURATION_MS,
            );
        }
        closure.forget();
    }
}
