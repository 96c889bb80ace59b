#![cfg(target_arch = "wasm32")]
use std::rc::Rc;
use testerz_core::config::IdentityConfig;
use testerz_core::{BackgroundScene, MotionProfile, Route};
use wasm_bindgen::prelude::*;

mod constants;
mod dom;
mod frame;
mod gotrue;
mod host;
mod identity;
mod pages;
mod render;
mod toast;

use host::WebHost;
use identity::{HttpIdentity, SessionStore};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("testerz-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let config = IdentityConfig::from_build_env();
    // A broken config is reported but the site still loads; the client refuses requests.
    config.log_diagnostics();
    let sessions = SessionStore;
    let identity = Rc::new(HttpIdentity::new(config, sessions));

    pages::wire_window_events();

    let page = dom::page_name(&document);
    match page.as_deref().and_then(Route::from_page_name) {
        Some(Route::Landing) => pages::landing::wire(&document, sessions),
        Some(Route::Auth) => pages::auth::wire(&document, identity),
        Some(Route::Dashboard) => pages::dashboard::wire(&document, identity, sessions),
        None => log::warn!("unknown page {:?}; nothing wired", page),
    }
    Ok(())
}

/// Background scene mounted by the embedding page itself rather than by
/// `data-page` dispatch. Call `unmount()` (or `free()`) when the hosting view goes away.
#[wasm_bindgen]
pub struct SceneMount {
    scene: BackgroundScene<WebHost>,
}

#[wasm_bindgen]
impl SceneMount {
    /// `profile` is `"landing"` or `"auth"`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, profile: &str) -> Result<SceneMount, JsValue> {
        let document =
            dom::window_document().ok_or_else(|| JsValue::from_str("no document"))?;
        let profile = MotionProfile::named(profile)
            .ok_or_else(|| JsValue::from_str(&format!("unknown motion profile {profile:?}")))?;
        Ok(Self {
            scene: BackgroundScene::mount(WebHost::new(document), container_id, profile),
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    pub fn unmount(&mut self) {
        self.scene.unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.scene.is_running()
    }
}
