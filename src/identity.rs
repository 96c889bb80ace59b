//! HTTP client for the hosted identity service, plus the browser-side session store.

use crate::constants::SESSION_STORAGE_KEY;
use crate::gotrue::{self, Credentials, RecoverRequest, TokenResponse};
use serde::Serialize;
use testerz_core::config::IdentityConfig;
use testerz_core::{IdentityError, IdentityService, Session};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn transport(e: JsValue) -> IdentityError {
    IdentityError::Transport(format!("{:?}", e))
}

/// Signed-in session persisted in `localStorage`, so it survives page loads.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStore;

impl SessionStore {
    fn storage() -> Option<web::Storage> {
        web::window()?.local_storage().ok()?
    }

    pub fn load(&self) -> Option<Session> {
        let raw = Self::storage()?.get_item(SESSION_STORAGE_KEY).ok()??;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("[session] discarding unreadable stored session: {e}");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, session: &Session) {
        let Some(storage) = Self::storage() else {
            log::warn!("[session] localStorage unavailable; session not persisted");
            return;
        };
        match serde_json::to_string(session) {
            Ok(raw) => {
                if let Err(e) = storage.set_item(SESSION_STORAGE_KEY, &raw) {
                    log::warn!("[session] could not store session: {:?}", e);
                }
            }
            Err(e) => log::warn!("[session] could not encode session: {e}"),
        }
    }

    pub fn clear(&self) {
        if let Some(storage) = Self::storage() {
            _ = storage.remove_item(SESSION_STORAGE_KEY);
        }
    }
}

pub struct HttpIdentity {
    config: IdentityConfig,
    sessions: SessionStore,
}

impl HttpIdentity {
    pub fn new(config: IdentityConfig, sessions: SessionStore) -> Self {
        Self { config, sessions }
    }

    fn ensure_configured(&self) -> Result<(), IdentityError> {
        if self.config.is_usable() {
            Ok(())
        } else {
            Err(IdentityError::NotConfigured)
        }
    }

    async fn post<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value, IdentityError> {
        self.ensure_configured()?;
        let window = web::window().ok_or_else(|| IdentityError::Transport("no window".into()))?;
        let payload =
            serde_json::to_string(body).map_err(|e| IdentityError::Transport(e.to_string()))?;

        let init = web::RequestInit::new();
        init.set_method("POST");
        init.set_mode(web::RequestMode::Cors);
        init.set_body(&JsValue::from_str(&payload));
        let request = web::Request::new_with_str_and_init(url, &init).map_err(transport)?;
        let headers = request.headers();
        headers
            .set("Content-Type", "application/json")
            .map_err(transport)?;
        headers
            .set("apikey", &self.config.anon_key)
            .map_err(transport)?;
        let token = bearer.unwrap_or(&self.config.anon_key);
        headers
            .set("Authorization", &format!("Bearer {token}"))
            .map_err(transport)?;

        let response: web::Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;
        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        let body = gotrue::parse_body(&text);
        if response.ok() {
            Ok(body)
        } else {
            log::debug!("[identity] {url} -> {}", response.status());
            Err(gotrue::error_from_body(response.status(), &body))
        }
    }
}

impl IdentityService for HttpIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let url = gotrue::endpoint(&self.config.url, gotrue::SIGNUP_PATH);
        self.post(&url, &Credentials { email, password }, None)
            .await
            .map(|_| ())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let url = gotrue::endpoint(&self.config.url, gotrue::TOKEN_PATH);
        let body = self
            .post(&url, &Credentials { email, password }, None)
            .await?;
        let token: TokenResponse = serde_json::from_value(body).map_err(|e| {
            IdentityError::Transport(format!("unexpected sign-in reply: {e}"))
        })?;
        let session = token.into_session(email);
        self.sessions.save(&session);
        Ok(session)
    }

    async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let encoded = String::from(js_sys::encode_uri_component(redirect_to));
        let url = gotrue::recover_endpoint(&self.config.url, &encoded);
        self.post(&url, &RecoverRequest { email }, None)
            .await
            .map(|_| ())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let reply = match self.sessions.load() {
            Some(session) => {
                let url = gotrue::endpoint(&self.config.url, gotrue::LOGOUT_PATH);
                Some(
                    self.post(&url, &serde_json::json!({}), Some(&session.access_token))
                        .await,
                )
            }
            None => None,
        };
        let result = gotrue::logout_result(reply);
        if result.is_ok() {
            self.sessions.clear();
        }
        result
    }
}
