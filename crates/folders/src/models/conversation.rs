//! Conversation identity as parsed from the host's conversation links

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a conversation, taken from its link path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the id out of a conversation link
    ///
    /// The id is the path segment following `marker` (e.g. `/app/`), ending
    /// at the next `/`, `?` or `#`. Returns `None` when the marker is absent
    /// or nothing follows it.
    ///
    /// ```
    /// use folders::ConversationId;
    ///
    /// let id = ConversationId::from_href("/app/3f2a9c?hl=en", "/app/");
    /// assert_eq!(id, Some(ConversationId::new("3f2a9c")));
    /// assert_eq!(ConversationId::from_href("/settings", "/app/"), None);
    /// ```
    pub fn from_href(href: &str, marker: &str) -> Option<Self> {
        if marker.is_empty() {
            return None;
        }
        let (_, rest) = href.split_once(marker)?;
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let id = rest[..end].trim();
        if id.is_empty() {
            None
        } else {
            Some(Self::new(id))
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
