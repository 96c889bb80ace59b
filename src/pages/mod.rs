pub mod auth;
pub mod dashboard;
pub mod landing;

use crate::constants::CANVAS_CONTAINER_ID;
use crate::host::WebHost;
use std::cell::RefCell;
use testerz_core::{MotionProfile, Navigator, PageBackground, Route};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Full page navigation; leaving the page fires `pagehide`, which unmounts the background.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebNavigator;

impl Navigator for WebNavigator {
    fn navigate(&self, route: Route) {
        let Some(window) = web::window() else {
            return;
        };
        log::info!("[nav] -> {}", route.path());
        if let Err(e) = window.location().assign(route.path()) {
            log::error!("[nav] could not open {}: {:?}", route.path(), e);
        }
    }
}

thread_local! {
    static ACTIVE_BACKGROUND: RefCell<PageBackground<WebHost>> =
        RefCell::new(PageBackground::new(CANVAS_CONTAINER_ID));
}

/// Mount the page background into `#canvas-container`, replacing any earlier one.
pub fn mount_background(document: &web::Document, profile: MotionProfile) {
    let host = WebHost::new(document.clone());
    ACTIVE_BACKGROUND.with(|slot| slot.borrow_mut().mount(host, profile));
}

fn hide_background() {
    ACTIVE_BACKGROUND.with(|slot| slot.borrow_mut().hide());
}

fn restore_background() {
    let Some(document) = crate::dom::window_document() else {
        return;
    };
    let host = WebHost::new(document);
    ACTIVE_BACKGROUND.with(|slot| {
        slot.borrow_mut().restore(host);
    });
}

/// Window-level wiring shared by every page: resize follows the viewport,
/// leaving the page tears the background down and a back/forward-cache restore
/// brings it back.
pub fn wire_window_events() {
    crate::dom::on_window_event("resize", || {
        let (w, h) = crate::dom::viewport_size();
        ACTIVE_BACKGROUND.with(|slot| slot.borrow().resize(w, h));
    });
    crate::dom::on_window_event("pagehide", hide_background);
    crate::dom::on_window_event_with("pageshow", |event| {
        let restored = event
            .dyn_ref::<web::PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        if restored {
            restore_background();
        }
    });
}
