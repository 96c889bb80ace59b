//! Dashboard view model: session guard, profile card and mock statistics.
//!
//! The statistics are static sample data; only their shaping for display
//! (bar heights, labels) lives here.

use crate::auth::AuthOutcome;
use crate::identity::{IdentityError, IdentityService, Session};
use crate::notice::Notice;
use crate::route::Route;

#[derive(Clone, Debug, PartialEq)]
pub struct StatBar {
    pub label: &'static str,
    pub value: u32,
    /// Height relative to the tallest bar, in `[0, 1]`.
    pub fraction: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Headline {
    pub label: &'static str,
    pub value: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityEntry {
    pub when: &'static str,
    pub what: &'static str,
}

const WEEKLY_TESTS: [(&str, u32); 7] = [
    ("Mon", 12),
    ("Tue", 19),
    ("Wed", 8),
    ("Thu", 24),
    ("Fri", 17),
    ("Sat", 6),
    ("Sun", 3),
];

const HEADLINES: [Headline; 3] = [
    Headline {
        label: "Active projects",
        value: 4,
    },
    Headline {
        label: "Bugs reported",
        value: 128,
    },
    Headline {
        label: "Hours tested",
        value: 342,
    },
];

const ACTIVITY: [ActivityEntry; 4] = [
    ActivityEntry {
        when: "2h ago",
        what: "Performance pass completed on build 0.9.3",
    },
    ActivityEntry {
        when: "Yesterday",
        what: "14 new bugs filed against the inventory screen",
    },
    ActivityEntry {
        when: "2 days ago",
        what: "Gameplay balance report delivered",
    },
    ActivityEntry {
        when: "Last week",
        what: "Project onboarding call",
    },
];

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub email: String,
    pub weekly: Vec<StatBar>,
    pub headlines: Vec<Headline>,
    pub activity: Vec<ActivityEntry>,
}

impl Dashboard {
    pub fn for_session(session: &Session) -> Self {
        Self {
            email: session.email.clone(),
            weekly: shape_bars(&WEEKLY_TESTS),
            headlines: HEADLINES.to_vec(),
            activity: ACTIVITY.to_vec(),
        }
    }

    pub fn weekly_total(&self) -> u32 {
        self.weekly.iter().map(|b| b.value).sum()
    }
}

/// Scale each value against the maximum so the tallest bar has fraction 1.
pub fn shape_bars(data: &[(&'static str, u32)]) -> Vec<StatBar> {
    let max = data.iter().map(|&(_, v)| v).max().unwrap_or(0);
    data.iter()
        .map(|&(label, value)| StatBar {
            label,
            value,
            fraction: if max == 0 {
                0.0
            } else {
                value as f32 / max as f32
            },
        })
        .collect()
}

/// The dashboard is only for signed-in users; everyone else goes to the auth page.
pub fn guard(session: Option<&Session>) -> Result<&Session, Route> {
    session.ok_or(Route::Auth)
}

pub fn sign_out_outcome(result: Result<(), IdentityError>) -> AuthOutcome {
    match result {
        Ok(()) => AuthOutcome {
            notice: Some(Notice::info(
                "Signed out successfully",
                "You have been logged out of your account.",
            )),
            navigate: Some(Route::Landing),
            session: None,
        },
        Err(e) => {
            log::warn!("[dashboard] sign out failed: {e}");
            AuthOutcome::notice(Notice::error(
                "Error signing out",
                "There was a problem signing out. Please try again.",
            ))
        }
    }
}

pub async fn sign_out<S: IdentityService>(service: &S) -> AuthOutcome {
    sign_out_outcome(service.sign_out().await)
}
