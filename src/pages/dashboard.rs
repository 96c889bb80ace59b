use super::WebNavigator;
use crate::constants::*;
use crate::dom;
use crate::identity::{HttpIdentity, SessionStore};
use crate::toast::ToastSink;
use std::cell::Cell;
use std::rc::Rc;
use testerz_core::dashboard::{self, Dashboard};
use testerz_core::Navigator;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

fn append(
    document: &web::Document,
    parent: &web::Element,
    tag: &str,
    class: &str,
    text: Option<&str>,
) -> Result<web::Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class);
    if let Some(text) = text {
        el.set_text_content(Some(text));
    }
    parent.append_child(&el)?;
    Ok(el)
}

fn render_headlines(document: &web::Document, view: &Dashboard) -> Result<(), JsValue> {
    let Some(root) = document.get_element_by_id(DASHBOARD_HEADLINES_ID) else {
        return Ok(());
    };
    root.set_inner_html("");
    for headline in &view.headlines {
        let card = append(document, &root, "div", "stat-card", None)?;
        append(document, &card, "span", "stat-value", Some(&headline.value.to_string()))?;
        append(document, &card, "span", "stat-label", Some(headline.label))?;
    }
    Ok(())
}

fn render_chart(document: &web::Document, view: &Dashboard) -> Result<(), JsValue> {
    let Some(root) = document.get_element_by_id(DASHBOARD_CHART_ID) else {
        return Ok(());
    };
    root.set_inner_html("");
    for bar in &view.weekly {
        let column = append(document, &root, "div", "chart-column", None)?;
        let fill = append(document, &column, "div", "chart-bar", None)?;
        _ = fill.set_attribute(
            "style",
            &format!("height:{:.0}px", bar.fraction * CHART_BAR_MAX_PX),
        );
        _ = fill.set_attribute("title", &format!("{} tests", bar.value));
        append(document, &column, "span", "chart-label", Some(bar.label))?;
    }
    append(
        document,
        &root,
        "p",
        "chart-total",
        Some(&format!("{} tests this week", view.weekly_total())),
    )?;
    Ok(())
}

fn render_activity(document: &web::Document, view: &Dashboard) -> Result<(), JsValue> {
    let Some(root) = document.get_element_by_id(DASHBOARD_ACTIVITY_ID) else {
        return Ok(());
    };
    root.set_inner_html("");
    for entry in &view.activity {
        let item = append(document, &root, "li", "activity-item", None)?;
        append(document, &item, "span", "activity-when", Some(entry.when))?;
        append(document, &item, "span", "activity-what", Some(entry.what))?;
    }
    Ok(())
}

/// Dashboard page. Without a session the visitor is sent to the auth page and
/// nothing is rendered.
pub fn wire(document: &web::Document, identity: Rc<HttpIdentity>, sessions: SessionStore) {
    let stored = sessions.load();
    let session = match dashboard::guard(stored.as_ref()) {
        Ok(session) => session,
        Err(route) => {
            log::info!("[dashboard] no session; redirecting");
            WebNavigator.navigate(route);
            return;
        }
    };

    let view = Dashboard::for_session(session);
    dom::set_text(document, DASHBOARD_EMAIL_ID, &view.email);
    let rendered = render_headlines(document, &view)
        .and_then(|_| render_chart(document, &view))
        .and_then(|_| render_activity(document, &view));
    if let Err(e) = rendered {
        log::error!("[dashboard] render error: {:?}", e);
    }
    dom::set_visible(document, DASHBOARD_ROOT_ID, true);

    let toasts = ToastSink::new(document.clone());
    let signing_out = Rc::new(Cell::new(false));
    let doc = document.clone();
    dom::add_click_listener(document, SIGN_OUT_BUTTON_ID, move || {
        if signing_out.replace(true) {
            return;
        }
        dom::set_disabled(&doc, SIGN_OUT_BUTTON_ID, true);
        let identity = identity.clone();
        let toasts = toasts.clone();
        let signing_out = signing_out.clone();
        let doc = doc.clone();
        spawn_local(async move {
            let outcome = dashboard::sign_out(identity.as_ref()).await;
            signing_out.set(false);
            dom::set_disabled(&doc, SIGN_OUT_BUTTON_ID, false);
            outcome.apply(&toasts, &WebNavigator);
        });
    });
}
