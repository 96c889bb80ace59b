// Wire format of the GoTrue-compatible REST API behind the identity service.
// Kept free of web-sys so host tests can include it directly.

use serde::{Deserialize, Serialize};
use testerz_core::{IdentityError, Session};

pub const SIGNUP_PATH: &str = "/auth/v1/signup";
pub const TOKEN_PATH: &str = "/auth/v1/token?grant_type=password";
pub const RECOVER_PATH: &str = "/auth/v1/recover";
pub const LOGOUT_PATH: &str = "/auth/v1/logout";

// Fields the service has used for a human-readable error, most specific first.
const ERROR_MESSAGE_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

#[derive(Serialize, Debug)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct RecoverRequest<'a> {
    pub email: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

#[derive(Deserialize, Debug)]
pub struct UserRecord {
    #[serde(default)]
    pub email: Option<String>,
}

impl TokenResponse {
    /// The account email from the token reply, or `fallback` when the reply omits it.
    pub fn into_session(self, fallback: &str) -> Session {
        let email = self
            .user
            .and_then(|u| u.email)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_owned());
        Session {
            email,
            access_token: self.access_token,
        }
    }
}

#[inline]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Recover endpoint with an already URI-encoded `redirect_to`.
pub fn recover_endpoint(base_url: &str, encoded_redirect: &str) -> String {
    format!(
        "{}?redirect_to={}",
        endpoint(base_url, RECOVER_PATH),
        encoded_redirect
    )
}

pub fn error_message(body: &serde_json::Value) -> Option<String> {
    ERROR_MESSAGE_FIELDS
        .iter()
        .filter_map(|field| body.get(field).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_owned)
}

/// Map a non-2xx reply onto the identity error the pages understand.
///
/// Only the service's own "user not found" answer means an unknown account.
/// A bare 404 is a missing endpoint (wrong base URL or proxy path), not a verdict
/// on the account.
pub fn error_from_body(status: u16, body: &serde_json::Value) -> IdentityError {
    let message = error_message(body);
    if message
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("user not found"))
    {
        return IdentityError::UnknownAccount;
    }
    match message {
        Some(message) => IdentityError::rejected(message),
        None if status == 404 => {
            IdentityError::Transport(format!("identity endpoint not found (status {status})"))
        }
        None => IdentityError::rejected(format!("Request failed with status {status}")),
    }
}

/// Result of signing out, given the logout reply (`None` when there was no
/// stored session and nothing was sent). `Ok` means the local session is cleared.
pub fn logout_result<T>(reply: Option<Result<T, IdentityError>>) -> Result<(), IdentityError> {
    match reply {
        None | Some(Ok(_)) => Ok(()),
        // The service no longer knows the token; locally the user is signed out either way.
        Some(Err(IdentityError::Rejected { .. } | IdentityError::UnknownAccount)) => Ok(()),
        Some(Err(e)) => Err(e),
    }
}

/// Parse a reply body; empty or non-JSON bodies become `Null`.
pub fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
}
