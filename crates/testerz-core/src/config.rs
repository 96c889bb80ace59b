//! Identity service configuration and startup diagnostics.
//!
//! Values are optional at build time. Missing ones fall back to placeholders so
//! the site still loads; the problem is reported through the log, and the
//! identity client refuses requests until it is fixed.

pub const PLACEHOLDER_URL: &str = "https://your-project.supabase.co";
pub const PLACEHOLDER_KEY: &str = "your-anon-key";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("identity service URL is not set")]
    MissingUrl,
    #[error("identity service URL is still the placeholder value")]
    PlaceholderUrl,
    #[error("identity service URL {0:?} is not an http(s) URL")]
    InvalidUrl(String),
    #[error("identity service access key is not set")]
    MissingKey,
    #[error("identity service access key is still the placeholder")]
    PlaceholderKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub url: String,
    pub anon_key: String,
    url_provided: bool,
    key_provided: bool,
}

impl IdentityConfig {
    /// Build from raw values; `None` or blank means "not provided".
    pub fn from_values(url: Option<&str>, anon_key: Option<&str>) -> Self {
        let url = url.map(str::trim).filter(|s| !s.is_empty());
        let anon_key = anon_key.map(str::trim).filter(|s| !s.is_empty());
        Self {
            url: url.unwrap_or(PLACEHOLDER_URL).trim_end_matches('/').to_owned(),
            anon_key: anon_key.unwrap_or(PLACEHOLDER_KEY).to_owned(),
            url_provided: url.is_some(),
            key_provided: anon_key.is_some(),
        }
    }

    /// Values baked in at build time through `TESTERZ_IDENTITY_URL` / `TESTERZ_IDENTITY_KEY`.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("TESTERZ_IDENTITY_URL"),
            option_env!("TESTERZ_IDENTITY_KEY"),
        )
    }

    pub fn diagnose(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !self.url_provided {
            issues.push(ConfigIssue::MissingUrl);
        } else if self.url == PLACEHOLDER_URL {
            issues.push(ConfigIssue::PlaceholderUrl);
        } else if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            issues.push(ConfigIssue::InvalidUrl(self.url.clone()));
        }
        if !self.key_provided {
            issues.push(ConfigIssue::MissingKey);
        } else if self.anon_key == PLACEHOLDER_KEY {
            issues.push(ConfigIssue::PlaceholderKey);
        }
        issues
    }

    pub fn is_usable(&self) -> bool {
        self.diagnose().is_empty()
    }

    /// Log every issue; returns whether the configuration is usable.
    pub fn log_diagnostics(&self) -> bool {
        let issues = self.diagnose();
        for issue in &issues {
            log::error!("[config] {issue}");
        }
        if issues.is_empty() {
            log::info!("[config] identity service at {}", self.url);
        }
        issues.is_empty()
    }
}
