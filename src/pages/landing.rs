use super::{mount_background, WebNavigator};
use crate::constants::{GET_STARTED_BUTTON_ID, NAV_ACCOUNT_BUTTON_ID};
use crate::dom;
use crate::identity::SessionStore;
use testerz_core::{MotionProfile, Navigator, Route};
use web_sys as web;

pub fn wire(document: &web::Document, sessions: SessionStore) {
    mount_background(document, MotionProfile::LANDING);

    // Signed-in visitors get a shortcut to their dashboard instead of the sign-in button.
    let (label, target) = match sessions.load() {
        Some(_) => ("Dashboard", Route::Dashboard),
        None => ("Sign In", Route::Auth),
    };
    dom::set_text(document, NAV_ACCOUNT_BUTTON_ID, label);
    dom::add_click_listener(document, NAV_ACCOUNT_BUTTON_ID, move || {
        WebNavigator.navigate(target)
    });
    dom::add_click_listener(document, GET_STARTED_BUTTON_ID, || {
        WebNavigator.navigate(Route::Auth)
    });
}
