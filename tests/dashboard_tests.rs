use testerz_core::dashboard::{self, shape_bars, Dashboard};
use testerz_core::*;

fn session() -> Session {
    Session {
        email: "ana@example.com".to_owned(),
        access_token: "token".to_owned(),
    }
}

struct SignOutService(Result<(), IdentityError>);

impl IdentityService for SignOutService {
    async fn sign_up(&self, _: &str, _: &str) -> Result<(), IdentityError> {
        unreachable!()
    }
    async fn sign_in(&self, _: &str, _: &str) -> Result<Session, IdentityError> {
        unreachable!()
    }
    async fn request_password_reset(&self, _: &str, _: &str) -> Result<(), IdentityError> {
        unreachable!()
    }
    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.0.clone()
    }
}

#[test]
fn guard_redirects_without_session() {
    assert_eq!(dashboard::guard(None), Err(Route::Auth));
    let s = session();
    assert_eq!(dashboard::guard(Some(&s)), Ok(&s));
}

#[test]
fn dashboard_shows_the_signed_in_email() {
    let view = Dashboard::for_session(&session());
    assert_eq!(view.email, "ana@example.com");
    assert_eq!(view.weekly.len(), 7);
    assert_eq!(view.weekly_total(), 89);
    assert_eq!(view.headlines.len(), 3);
    assert!(!view.activity.is_empty());
}

#[test]
fn bars_scale_to_the_tallest() {
    let bars = shape_bars(&[("a", 5), ("b", 10), ("c", 0)]);
    let fractions: Vec<f32> = bars.iter().map(|b| b.fraction).collect();
    assert_eq!(fractions, vec![0.5, 1.0, 0.0]);

    let flat = shape_bars(&[("a", 0), ("b", 0)]);
    assert!(flat.iter().all(|b| b.fraction == 0.0));
    assert!(shape_bars(&[]).is_empty());
}

#[test]
fn sign_out_success_goes_home() {
    let outcome = pollster::block_on(dashboard::sign_out(&SignOutService(Ok(()))));
    assert_eq!(outcome.navigate, Some(Route::Landing));
    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.title, "Signed out successfully");
    assert!(!notice.is_error());
}

#[test]
fn sign_out_failure_stays_put() {
    let outcome = pollster::block_on(dashboard::sign_out(&SignOutService(Err(
        IdentityError::Transport("offline".into()),
    ))));
    assert_eq!(outcome.navigate, None);
    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.title, "Error signing out");
    assert!(notice.is_error());
}
