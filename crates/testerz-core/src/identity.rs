//! Contract with the hosted identity service.
//!
//! The service is always passed in explicitly, so pages can run against the
//! HTTP client in the browser and against an in-memory fake in tests.

use serde::{Deserialize, Serialize};

/// A signed-in user as returned by `sign_in`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub access_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The service refused the request; the message is shown to the user as-is.
    #[error("{message}")]
    Rejected { message: String },
    #[error("Invalid login credentials")]
    UnknownAccount,
    #[error("Could not reach the identity service: {0}")]
    Transport(String),
    #[error("The identity service is not configured")]
    NotConfigured,
}

impl IdentityError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait IdentityService {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;
    async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
