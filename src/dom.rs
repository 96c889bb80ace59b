use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] #{element_id} not found; click handler not wired");
    }
}

/// Listen for `submit` on a form and suppress the browser's own navigation.
pub fn add_submit_listener(
    document: &web::Document,
    form_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(form_id) {
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            ev.prevent_default();
            handler();
        }) as Box<dyn FnMut(web::Event)>);
        let _ = el.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] #{form_id} not found; submit handler not wired");
    }
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

#[inline]
pub fn set_visible(document: &web::Document, element_id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(element_id) {
        if visible {
            let _ = el.remove_attribute("hidden");
        } else {
            let _ = el.set_attribute("hidden", "");
        }
    }
}

pub fn input_value(document: &web::Document, element_id: &str) -> String {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default()
}

pub fn set_disabled(document: &web::Document, element_id: &str, disabled: bool) {
    if let Some(button) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlButtonElement>().ok())
    {
        button.set_disabled(disabled);
    }
}

/// `<body data-page="...">`, used to decide which page to wire.
pub fn page_name(document: &web::Document) -> Option<String> {
    document.body().and_then(|b| b.dataset().get("page"))
}

pub fn origin() -> String {
    web::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Viewport size in CSS pixels, never zero.
pub fn viewport_size() -> (u32, u32) {
    let Some(w) = web::window() else {
        return (1, 1);
    };
    let width = w
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let height = w
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    ((width as u32).max(1), (height as u32).max(1))
}

pub fn on_window_event(event: &str, handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

pub fn on_window_event_with(event: &str, handler: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
