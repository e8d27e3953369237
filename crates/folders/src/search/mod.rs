//! Search-to-add over loaded conversation titles
//!
//! Matching is a substring test on normalized titles. Only conversations
//! the host has already rendered can be found; older ones appear once the
//! user scrolls the list far enough for the host to load them.

mod normalize;

pub use normalize::normalize;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::host::HostList;
use crate::models::{ConversationId, FolderState};

/// Help text shown beneath each folder's search box
pub const SEARCH_HELP: &str = "Only conversations already loaded in the sidebar can be found. \
Scroll the conversation list to load older ones.";

/// A conversation matching a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ConversationId,
    pub title: String,
}

/// Find loaded conversations whose title contains `query`
///
/// Conversations already in `target` are left out, as are entries without
/// a parseable id. Each conversation is listed once, in page order. A
/// blank query matches nothing.
pub fn search_loaded<H: HostList>(
    host: &H,
    state: &FolderState,
    target: &str,
    query: &str,
    marker: &str,
) -> Vec<SearchHit> {
    let needle = normalize(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    host.all_entries()
        .iter()
        .filter_map(|entry| {
            let href = host.link_href(entry)?;
            let id = ConversationId::from_href(&href, marker)?;
            Some((id, entry))
        })
        .filter(|(id, _)| state.folder_of(id) != Some(target))
        .filter_map(|(id, entry)| {
            let title = host.title(entry);
            if normalize(&title).contains(&needle) && seen.insert(id.clone()) {
                Some(SearchHit { id, title })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHostList;

    const MARKER: &str = "/app/";

    #[test]
    fn test_matches_case_insensitive() {
        let host = InMemoryHostList::new();
        host.push_conversations(&[("b1", "Budget Plan"), ("o1", "Other")]);
        let mut state = FolderState::new();
        state.create_folder("Finance").unwrap();

        let hits = search_loaded(&host, &state, "Finance", "budget", MARKER);
        assert_eq!(
            hits,
            vec![SearchHit {
                id: ConversationId::new("b1"),
                title: "Budget Plan".to_string()
            }]
        );
    }

    #[test]
    fn test_matches_across_diacritics() {
        let host = InMemoryHostList::new();
        host.push_conversation("r1", "Résumé review");
        let state = FolderState::new();

        assert_eq!(search_loaded(&host, &state, "Jobs", "RESUME", MARKER).len(), 1);
        assert_eq!(search_loaded(&host, &state, "Jobs", "résumé", MARKER).len(), 1);
    }

    #[test]
    fn test_excludes_target_folder_members() {
        let host = InMemoryHostList::new();
        host.push_conversations(&[("b1", "Budget Plan"), ("b2", "Budget Q3")]);
        let mut state = FolderState::new();
        state.create_folder("Finance").unwrap();
        state.create_folder("Archive").unwrap();
        state.move_item(&ConversationId::new("b1"), "Finance").unwrap();
        state.move_item(&ConversationId::new("b2"), "Archive").unwrap();

        let hits = search_loaded(&host, &state, "Finance", "budget", MARKER);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "b2");
    }

    #[test]
    fn test_blank_query_and_unparseable_entries() {
        let host = InMemoryHostList::new();
        host.push_entry(Some("/gems/xyz"), "Budget gem");
        host.push_entry(None, "Budget draft");
        let state = FolderState::new();

        assert!(search_loaded(&host, &state, "F", "   ", MARKER).is_empty());
        assert!(search_loaded(&host, &state, "F", "budget", MARKER).is_empty());
    }

    #[test]
    fn test_duplicate_entries_listed_once() {
        let host = InMemoryHostList::new();
        host.push_conversation("b1", "Budget Plan");
        host.push_conversation("b1", "Budget Plan");
        let state = FolderState::new();

        assert_eq!(search_loaded(&host, &state, "F", "plan", MARKER).len(), 1);
    }
}
