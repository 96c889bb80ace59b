//! Sign-in / sign-up / password-reset form logic.
//!
//! Submitting is split in three steps so the browser can keep the form state
//! in a `RefCell` without holding a borrow across the network call:
//! [`AuthForm::begin`] validates and marks the form busy, [`perform`] talks to
//! the identity service, and [`AuthForm::complete`] turns the reply into an
//! [`AuthOutcome`].

use crate::identity::{is_valid_email, IdentityError, IdentityService, Session};
use crate::notice::{Notice, NotificationSink};
use crate::route::{Navigator, Route};

/// Path the reset email links back to, appended to the page origin.
pub const RESET_REDIRECT_PATH: &str = "/auth/reset-password";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
    ResetPassword,
}

#[derive(Clone, Debug, Default)]
pub struct AuthForm {
    mode: AuthMode,
    // Mode to return to when leaving the reset view.
    return_mode: AuthMode,
    loading: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthRequest {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
}

pub type AuthReply = Result<Option<Session>, IdentityError>;

#[derive(Debug)]
pub enum Submission {
    /// A request is already in flight.
    Ignored,
    /// Rejected before reaching the service.
    Invalid(AuthOutcome),
    Pending(AuthRequest),
}

/// What the page should do after a submit or sign-out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthOutcome {
    pub notice: Option<Notice>,
    pub navigate: Option<Route>,
    pub session: Option<Session>,
}

impl AuthOutcome {
    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    /// Show the notice (if any), then navigate (if requested).
    pub fn apply<S, N>(&self, sink: &S, navigator: &N)
    where
        S: NotificationSink + ?Sized,
        N: Navigator + ?Sized,
    {
        if let Some(notice) = &self.notice {
            sink.notify(notice);
        }
        if let Some(route) = self.navigate {
            navigator.navigate(route);
        }
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch between sign-in and sign-up. Not offered on the reset view.
    pub fn toggle_sign_up(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
            AuthMode::ResetPassword => return,
        };
    }

    pub fn toggle_reset(&mut self) {
        if self.mode == AuthMode::ResetPassword {
            self.mode = self.return_mode;
        } else {
            self.return_mode = self.mode;
            self.mode = AuthMode::ResetPassword;
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            AuthMode::ResetPassword => "Reset Password",
            AuthMode::SignUp => "Create Account",
            AuthMode::SignIn => "Welcome Back",
        }
    }

    pub fn subheading(&self) -> &'static str {
        match self.mode {
            AuthMode::ResetPassword => "Enter your email to reset your password",
            AuthMode::SignUp => "Join the Game Testerz community",
            AuthMode::SignIn => "Sign in to your account",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            return "Loading...";
        }
        match self.mode {
            AuthMode::ResetPassword => "Send Reset Link",
            AuthMode::SignUp => "Sign Up",
            AuthMode::SignIn => "Sign In",
        }
    }

    pub fn sign_up_toggle_label(&self) -> Option<&'static str> {
        match self.mode {
            AuthMode::ResetPassword => None,
            AuthMode::SignUp => Some("Already have an account? Sign in"),
            AuthMode::SignIn => Some("Need an account? Sign up"),
        }
    }

    pub fn reset_toggle_label(&self) -> &'static str {
        if self.mode == AuthMode::ResetPassword {
            "Back to sign in"
        } else {
            "Forgot your password?"
        }
    }

    pub fn shows_password(&self) -> bool {
        self.mode != AuthMode::ResetPassword
    }

    pub fn begin(&mut self, email: &str, password: &str) -> Submission {
        if self.loading {
            return Submission::Ignored;
        }
        let email = email.trim();
        if !is_valid_email(email) {
            return Submission::Invalid(AuthOutcome::notice(Notice::error(
                "Error",
                "Please enter a valid email address",
            )));
        }
        if self.shows_password() && password.is_empty() {
            return Submission::Invalid(AuthOutcome::notice(Notice::error(
                "Error",
                "Please enter your password",
            )));
        }
        self.loading = true;
        Submission::Pending(AuthRequest {
            mode: self.mode,
            email: email.to_owned(),
            password: password.to_owned(),
        })
    }

    pub fn complete(&mut self, request: &AuthRequest, reply: AuthReply) -> AuthOutcome {
        self.loading = false;
        match (request.mode, reply) {
            // Unknown accounts get the same answer as known ones.
            (AuthMode::ResetPassword, Ok(_))
            | (AuthMode::ResetPassword, Err(IdentityError::UnknownAccount)) => {
                if self.mode == AuthMode::ResetPassword {
                    self.mode = self.return_mode;
                }
                AuthOutcome::notice(Notice::info(
                    "Password reset email sent",
                    "Please check your email to reset your password.",
                ))
            }
            (AuthMode::SignUp, Ok(_)) => AuthOutcome::notice(Notice::info(
                "Success!",
                "Please check your email to verify your account.",
            )),
            (AuthMode::SignIn, Ok(Some(session))) => AuthOutcome {
                notice: None,
                navigate: Some(Route::Dashboard),
                session: Some(session),
            },
            (AuthMode::SignIn, Ok(None)) => {
                AuthOutcome::notice(Notice::error("Error", "Sign in did not return a session"))
            }
            (_, Err(e)) => {
                log::warn!("[auth] {:?} failed: {e}", request.mode);
                AuthOutcome::notice(Notice::error("Error", e.to_string()))
            }
        }
    }
}

/// Run `request` against the identity service.
pub async fn perform<S>(service: &S, request: &AuthRequest, origin: &str) -> AuthReply
where
    S: IdentityService,
{
    match request.mode {
        AuthMode::ResetPassword => {
            let redirect_to = format!("{}{}", origin.trim_end_matches('/'), RESET_REDIRECT_PATH);
            service
                .request_password_reset(&request.email, &redirect_to)
                .await
                .map(|_| None)
        }
        AuthMode::SignUp => service
            .sign_up(&request.email, &request.password)
            .await
            .map(|_| None),
        AuthMode::SignIn => service
            .sign_in(&request.email, &request.password)
            .await
            .map(Some),
    }
}

/// Convenience for callers that own the form outright: begin, perform, complete.
/// Returns `None` when the submit was ignored because a request is in flight.
pub async fn submit<S>(
    form: &mut AuthForm,
    service: &S,
    origin: &str,
    email: &str,
    password: &str,
) -> Option<AuthOutcome>
where
    S: IdentityService,
{
    match form.begin(email, password) {
        Submission::Ignored => None,
        Submission::Invalid(outcome) => Some(outcome),
        Submission::Pending(request) => {
            let reply = perform(service, &request, origin).await;
            Some(form.complete(&request, reply))
        }
    }
}
