//! Per-user storage key resolution
//!
//! Folder state is namespaced by the signed-in account so that several
//! accounts sharing one browser profile keep separate folders. The key is
//! derived from what the page shows, in order of preference:
//!
//! 1. the e-mail address in the account switcher's label
//! 2. the `/u/<n>/` login index in the URL path
//! 3. the bare base key

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Namespace string under which the whole folder state is persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(pub String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The page signals the key is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Accessible label of the account switcher, if rendered
    pub account_label: Option<String>,
    /// Full page URL
    pub url: Option<String>,
}

impl PageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the account label
    pub fn with_account_label(mut self, label: impl Into<String>) -> Self {
        self.account_label = Some(label.into());
        self
    }

    /// Builder method to set the page URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Resolve the storage key for the current page
pub fn resolve_storage_key(snapshot: &PageSnapshot, base: &str) -> StorageKey {
    if let Some(email) = snapshot.account_label.as_deref().and_then(extract_email) {
        return StorageKey(format!("{}:{}", base, email));
    }

    if let Some(index) = snapshot.url.as_deref().and_then(login_index) {
        return StorageKey(format!("{}:u{}", base, index));
    }

    StorageKey::new(base)
}

/// Find the first e-mail looking token in a label, lower-cased
fn extract_email(label: &str) -> Option<String> {
    label
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>' | ',' | ';'))
        .map(|token| token.trim_matches(|c: char| matches!(c, '"' | '\'' | ':' | '.')))
        .find(|token| looks_like_email(token))
        .map(str::to_lowercase)
}

fn looks_like_email(token: &str) -> bool {
    let Some((local, domain)) = token.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Parse the multi-login index from a `/u/<n>/` path prefix
fn login_index(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    let mut segments = url.path_segments()?;
    if segments.next()? != "u" {
        return None;
    }
    segments.next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "gemini_conversation_groups";

    #[test]
    fn test_email_from_account_label() {
        let snapshot = PageSnapshot::new()
            .with_account_label("Google Account: Jane Doe\n(Jane.Doe@Example.com)")
            .with_url("https://gemini.google.com/u/1/app");
        assert_eq!(
            resolve_storage_key(&snapshot, BASE).as_str(),
            "gemini_conversation_groups:jane.doe@example.com"
        );
    }

    #[test]
    fn test_login_index_from_url() {
        let snapshot = PageSnapshot::new()
            .with_account_label("Google Account")
            .with_url("https://gemini.google.com/u/2/app/abc123");
        assert_eq!(
            resolve_storage_key(&snapshot, BASE).as_str(),
            "gemini_conversation_groups:u2"
        );
    }

    #[test]
    fn test_default_key() {
        let snapshot = PageSnapshot::new().with_url("https://gemini.google.com/app/abc123");
        assert_eq!(resolve_storage_key(&snapshot, BASE).as_str(), BASE);
        assert_eq!(resolve_storage_key(&PageSnapshot::new(), BASE).as_str(), BASE);
    }

    #[test]
    fn test_unparseable_url_falls_back() {
        let snapshot = PageSnapshot::new().with_url("not a url");
        assert_eq!(resolve_storage_key(&snapshot, BASE).as_str(), BASE);

        let snapshot = PageSnapshot::new().with_url("https://gemini.google.com/u/x/app");
        assert_eq!(resolve_storage_key(&snapshot, BASE).as_str(), BASE);
    }

    #[test]
    fn test_extract_email_rejects_lookalikes() {
        assert_eq!(extract_email("@handle"), None);
        assert_eq!(extract_email("user@localhost"), None);
        assert_eq!(extract_email("Signed in as a@b.co."), Some("a@b.co".to_string()));
    }

    #[test]
    fn test_deterministic() {
        let snapshot = PageSnapshot::new().with_account_label("x <me@mail.org>");
        assert_eq!(
            resolve_storage_key(&snapshot, BASE),
            resolve_storage_key(&snapshot, BASE)
        );
    }
}
