// Host-side tests for the identity service wire format.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod gotrue {
    include!("../src/gotrue.rs");
}

use gotrue::*;
use serde_json::json;
use testerz_core::auth::{AuthForm, Submission};
use testerz_core::IdentityError;

#[test]
fn endpoints_join_without_double_slashes() {
    assert_eq!(
        endpoint("https://id.example/", TOKEN_PATH),
        "https://id.example/auth/v1/token?grant_type=password"
    );
    assert_eq!(
        recover_endpoint("https://id.example", "https%3A%2F%2Fsite%2Fauth%2Freset-password"),
        "https://id.example/auth/v1/recover?redirect_to=https%3A%2F%2Fsite%2Fauth%2Freset-password"
    );
}

#[test]
fn credentials_serialize_as_plain_json() {
    let body = serde_json::to_value(Credentials {
        email: "a@b.co",
        password: "pw",
    })
    .unwrap();
    assert_eq!(body, json!({ "email": "a@b.co", "password": "pw" }));
}

#[test]
fn error_message_prefers_most_specific_field() {
    let body = json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" });
    assert_eq!(
        error_from_body(400, &body),
        IdentityError::rejected("Invalid login credentials")
    );
    let body = json!({ "msg": "Email rate limit exceeded", "message": "ignored" });
    assert_eq!(
        error_message(&body).as_deref(),
        Some("Email rate limit exceeded")
    );
}

#[test]
fn only_the_service_verdict_means_unknown_account() {
    assert_eq!(
        error_from_body(400, &json!({ "msg": "User not found" })),
        IdentityError::UnknownAccount
    );
    assert_eq!(
        error_from_body(404, &json!({ "message": "user not found" })),
        IdentityError::UnknownAccount
    );
}

#[test]
fn bare_not_found_is_a_transport_failure() {
    let err = error_from_body(404, &parse_body("<html>Not Found</html>"));
    assert!(matches!(err, IdentityError::Transport(_)), "{err:?}");
    assert_ne!(err, IdentityError::UnknownAccount);
}

#[test]
fn missing_endpoint_is_not_reported_as_reset_sent() {
    let err = error_from_body(404, &parse_body("<html>Not Found</html>"));

    let mut form = AuthForm::new();
    form.toggle_reset();
    let Submission::Pending(request) = form.begin("ana@example.com", "") else {
        panic!("expected a pending request");
    };
    let outcome = form.complete(&request, Err(err.clone()));
    let notice = outcome.notice.expect("notice");
    assert!(notice.is_error());
    assert_ne!(notice.title, "Password reset email sent");

    let mut form = AuthForm::new();
    form.toggle_sign_up();
    let Submission::Pending(request) = form.begin("ana@example.com", "pw") else {
        panic!("expected a pending request");
    };
    let notice = form.complete(&request, Err(err)).notice.expect("notice");
    assert!(notice.is_error());
    assert_ne!(notice.description, "Invalid login credentials");
}

#[test]
fn sign_out_clears_locally_unless_the_service_is_unreachable() {
    assert_eq!(logout_result::<()>(None), Ok(()));
    assert_eq!(logout_result(Some(Ok(json!({})))), Ok(()));
    assert_eq!(
        logout_result::<()>(Some(Err(IdentityError::rejected("invalid JWT")))),
        Ok(())
    );
    assert_eq!(
        logout_result::<()>(Some(Err(IdentityError::UnknownAccount))),
        Ok(())
    );
    let offline = IdentityError::Transport("offline".into());
    assert_eq!(logout_result::<()>(Some(Err(offline.clone()))), Err(offline));
    assert_eq!(
        logout_result::<()>(Some(Err(IdentityError::NotConfigured))),
        Err(IdentityError::NotConfigured)
    );
}

#[test]
fn empty_error_body_falls_back_to_status() {
    assert_eq!(
        error_from_body(500, &parse_body("")),
        IdentityError::rejected("Request failed with status 500")
    );
    assert_eq!(parse_body("<html>"), serde_json::Value::Null);
}

#[test]
fn token_reply_becomes_session() {
    let reply: TokenResponse = serde_json::from_value(json!({
        "access_token": "abc",
        "token_type": "bearer",
        "user": { "id": "1", "email": "ana@example.com" }
    }))
    .unwrap();
    let session = reply.into_session("typed@example.com");
    assert_eq!(session.email, "ana@example.com");
    assert_eq!(session.access_token, "abc");

    let bare: TokenResponse = serde_json::from_value(json!({ "access_token": "xyz" })).unwrap();
    assert_eq!(bare.into_session("typed@example.com").email, "typed@example.com");
}
