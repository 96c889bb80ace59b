//! Auth page: background scene plus the sign-in / sign-up / reset form.

use super::{mount_background, WebNavigator};
use crate::constants::*;
use crate::dom;
use crate::identity::HttpIdentity;
use crate::toast::ToastSink;
use std::cell::RefCell;
use std::rc::Rc;
use testerz_core::auth::{self, AuthForm, Submission};
use testerz_core::MotionProfile;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

fn render_form(document: &web::Document, form: &AuthForm) {
    dom::set_text(document, AUTH_HEADING_ID, form.heading());
    dom::set_text(document, AUTH_SUBHEADING_ID, form.subheading());
    dom::set_text(document, AUTH_SUBMIT_ID, form.submit_label());
    dom::set_disabled(document, AUTH_SUBMIT_ID, form.is_loading());
    dom::set_visible(document, AUTH_PASSWORD_ID, form.shows_password());
    match form.sign_up_toggle_label() {
        Some(label) => {
            dom::set_text(document, AUTH_TOGGLE_SIGN_UP_ID, label);
            dom::set_visible(document, AUTH_TOGGLE_SIGN_UP_ID, true);
        }
        None => dom::set_visible(document, AUTH_TOGGLE_SIGN_UP_ID, false),
    }
    dom::set_text(document, AUTH_TOGGLE_RESET_ID, form.reset_toggle_label());
}

pub fn wire(document: &web::Document, identity: Rc<HttpIdentity>) {
    mount_background(document, MotionProfile::AUTH);

    let form = Rc::new(RefCell::new(AuthForm::new()));
    let toasts = ToastSink::new(document.clone());
    render_form(document, &form.borrow());

    {
        let doc = document.clone();
        let form = form.clone();
        dom::add_click_listener(document, AUTH_TOGGLE_SIGN_UP_ID, move || {
            let mut form = form.borrow_mut();
            form.toggle_sign_up();
            render_form(&doc, &form);
        });
    }
    {
        let doc = document.clone();
        let form = form.clone();
        dom::add_click_listener(document, AUTH_TOGGLE_RESET_ID, move || {
            let mut form = form.borrow_mut();
            form.toggle_reset();
            render_form(&doc, &form);
        });
    }

    let document_submit = document.clone();
    dom::add_submit_listener(document, AUTH_FORM_ID, move || {
        let document = document_submit.clone();
        let email = dom::input_value(&document, AUTH_EMAIL_ID);
        let password = dom::input_value(&document, AUTH_PASSWORD_ID);

        let submission = form.borrow_mut().begin(&email, &password);
        let request = match submission {
            Submission::Ignored => return,
            Submission::Invalid(outcome) => {
                outcome.apply(&toasts, &WebNavigator);
                return;
            }
            Submission::Pending(request) => request,
        };
        render_form(&document, &form.borrow());

        let form = form.clone();
        let identity = identity.clone();
        let toasts = toasts.clone();
        spawn_local(async move {
            let reply = auth::perform(identity.as_ref(), &request, &dom::origin()).await;
            let outcome = form.borrow_mut().complete(&request, reply);
            // Sign-in already persisted the session inside the identity client.
            render_form(&document, &form.borrow());
            outcome.apply(&toasts, &WebNavigator);
        });
    });
}
