use testerz_core::config::*;

#[test]
fn missing_values_fall_back_to_placeholders() {
    let config = IdentityConfig::from_values(None, Some("   "));
    assert_eq!(config.url, PLACEHOLDER_URL);
    assert_eq!(config.anon_key, PLACEHOLDER_KEY);
    assert_eq!(
        config.diagnose(),
        vec![ConfigIssue::MissingUrl, ConfigIssue::MissingKey]
    );
    assert!(!config.is_usable());
    assert!(!config.log_diagnostics());
}

#[test]
fn placeholders_passed_explicitly_are_flagged() {
    let config = IdentityConfig::from_values(Some(PLACEHOLDER_URL), Some(PLACEHOLDER_KEY));
    assert_eq!(
        config.diagnose(),
        vec![ConfigIssue::PlaceholderUrl, ConfigIssue::PlaceholderKey]
    );
}

#[test]
fn non_http_url_is_invalid() {
    let config = IdentityConfig::from_values(Some("ftp://id.example"), Some("key"));
    assert_eq!(
        config.diagnose(),
        vec![ConfigIssue::InvalidUrl("ftp://id.example".to_owned())]
    );
}

#[test]
fn real_values_are_usable_and_trimmed() {
    let config = IdentityConfig::from_values(Some(" https://id.example/ "), Some("anon"));
    assert_eq!(config.url, "https://id.example");
    assert_eq!(config.anon_key, "anon");
    assert!(config.diagnose().is_empty());
    assert!(config.log_diagnostics());
}
