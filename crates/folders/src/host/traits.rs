//! Host page trait definitions

use crate::models::{ConversationId, FolderRecord};
use crate::search::SearchHit;

/// What a folder container should display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderView<'a> {
    pub name: &'a str,
    pub collapsed: bool,
}

impl<'a> FolderView<'a> {
    pub fn new(name: &'a str, record: &FolderRecord) -> Self {
        Self {
            name,
            collapsed: record.collapsed,
        }
    }
}

/// The host page's conversation list plus the folder containers injected
/// into it
///
/// Entries are handles to rendered conversation items; moving an entry
/// moves the rendered node. Every method must quietly do nothing when the
/// list container is not on the page.
pub trait HostList: Clone {
    /// Handle to a rendered conversation entry
    type Entry: Clone;
    /// Keeps an insertion subscription alive
    type Subscription;

    /// Whether the list container is currently on the page
    fn is_ready(&self) -> bool;

    /// Entries sitting directly in the list, outside any folder, in page order
    fn unfiled_entries(&self) -> Vec<Self::Entry>;

    /// Entries inside `folder`'s content container, in display order
    fn folder_entries(&self, folder: &str) -> Vec<Self::Entry>;

    /// Every rendered entry, filed or not
    fn all_entries(&self) -> Vec<Self::Entry>;

    /// `href` of the entry's first link
    fn link_href(&self, entry: &Self::Entry) -> Option<String>;

    /// Title text of the entry
    fn title(&self, entry: &Self::Entry) -> String;

    /// Make the entry draggable with `id` as its payload. Idempotent.
    fn make_draggable(&self, entry: &Self::Entry, id: &ConversationId);

    /// Move the entry into `folder`'s content container, before `before` or
    /// at the end. Returns false if the folder container does not exist.
    fn move_into_folder(&self, entry: &Self::Entry, folder: &str, before: Option<&Self::Entry>)
    -> bool;

    /// Move the entry back into the list, after the existing entries
    fn move_to_unfiled(&self, entry: &Self::Entry);

    /// Inject the control bar if missing. Returns whether it is present.
    fn ensure_controls(&self) -> bool;

    /// Names of the folder containers currently rendered, in display order
    fn rendered_folders(&self) -> Vec<String>;

    /// Create the container for a folder, after the existing folders, or
    /// update it if present
    fn render_folder(&self, view: FolderView<'_>);

    /// Remove a folder container. Entries still inside it are dropped from
    /// the page, so callers unfile them first.
    fn remove_folder(&self, name: &str);

    fn set_folder_collapsed(&self, name: &str, collapsed: bool);

    /// Replace the search result list under a folder
    fn show_search_results(&self, folder: &str, hits: &[SearchHit]);

    /// Call `on_insert` with the number of added nodes for each batch of
    /// child insertions into the list container. Returns `None` when the
    /// container is not on the page.
    fn subscribe_insertions(&self, on_insert: Box<dyn FnMut(usize)>)
    -> Option<Self::Subscription>;
}
