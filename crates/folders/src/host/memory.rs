//! In-memory host page implementation
//!
//! Models just enough of the conversation list to exercise placement,
//! folder rendering and insertion notifications without a browser. Clones
//! are handles onto the same page, like DOM node references.
//!
//! Insertion notifications are queued and only delivered by
//! [`InMemoryHostList::deliver_mutations`], mirroring how a mutation
//! observer runs after the current task rather than inside it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{FolderView, HostList};
use crate::models::ConversationId;
use crate::search::SearchHit;

/// Handle to an entry on the in-memory page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

/// Identifies an insertion subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

struct EntryNode {
    href: Option<String>,
    title: String,
    drag_id: Option<ConversationId>,
}

struct FolderNode {
    name: String,
    collapsed: bool,
    entries: Vec<EntryHandle>,
    search_results: Vec<SearchHit>,
}

struct Page {
    ready: bool,
    controls: bool,
    folders: Vec<FolderNode>,
    unfiled: Vec<EntryHandle>,
    nodes: HashMap<EntryHandle, EntryNode>,
    next_handle: u64,
    moves: usize,
    /// Added-node counts of batches not yet delivered
    pending: Vec<usize>,
}

impl Page {
    fn folder(&self, name: &str) -> Option<&FolderNode> {
        self.folders.iter().find(|f| f.name == name)
    }

    fn folder_mut(&mut self, name: &str) -> Option<&mut FolderNode> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    fn detach(&mut self, entry: EntryHandle) {
        self.unfiled.retain(|e| *e != entry);
        for folder in &mut self.folders {
            folder.entries.retain(|e| *e != entry);
        }
    }
}

type InsertCallback = Box<dyn FnMut(usize)>;

/// In-memory implementation of HostList
#[derive(Clone)]
pub struct InMemoryHostList {
    page: Rc<RefCell<Page>>,
    subscribers: Rc<RefCell<Vec<InsertCallback>>>,
}

impl InMemoryHostList {
    /// Create a page whose list container is present
    pub fn new() -> Self {
        Self::with_ready(true)
    }

    /// Create a page whose list container has not rendered yet
    pub fn detached() -> Self {
        Self::with_ready(false)
    }

    fn with_ready(ready: bool) -> Self {
        Self {
            page: Rc::new(RefCell::new(Page {
                ready,
                controls: false,
                folders: Vec::new(),
                unfiled: Vec::new(),
                nodes: HashMap::new(),
                next_handle: 0,
                moves: 0,
                pending: Vec::new(),
            })),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Simulate the list container appearing or disappearing
    pub fn set_ready(&self, ready: bool) {
        self.page.borrow_mut().ready = ready;
    }

    /// Append an entry to the list as the host would render it
    pub fn push_entry(&self, href: Option<&str>, title: &str) -> EntryHandle {
        let mut page = self.page.borrow_mut();
        let handle = Self::create_node(&mut page, href, title);
        page.unfiled.push(handle);
        page.pending.push(1);
        handle
    }

    /// Append a conversation linked at `/app/<id>`
    pub fn push_conversation(&self, id: &str, title: &str) -> EntryHandle {
        self.push_entry(Some(&format!("/app/{}", id)), title)
    }

    /// Append several conversations as one insertion batch
    pub fn push_conversations(&self, conversations: &[(&str, &str)]) -> Vec<EntryHandle> {
        let mut page = self.page.borrow_mut();
        let handles: Vec<EntryHandle> = conversations
            .iter()
            .map(|(id, title)| {
                let handle = Self::create_node(&mut page, Some(&format!("/app/{}", id)), title);
                page.unfiled.push(handle);
                handle
            })
            .collect();
        page.pending.push(handles.len());
        handles
    }

    fn create_node(page: &mut Page, href: Option<&str>, title: &str) -> EntryHandle {
        let handle = EntryHandle(page.next_handle);
        page.next_handle += 1;
        page.nodes.insert(
            handle,
            EntryNode {
                href: href.map(str::to_string),
                title: title.to_string(),
                drag_id: None,
            },
        );
        handle
    }

    /// Remove an entry as the host would when re-rendering its list
    pub fn remove_entry(&self, entry: EntryHandle) {
        let mut page = self.page.borrow_mut();
        page.detach(entry);
        page.nodes.remove(&entry);
        page.pending.push(0);
    }

    /// Deliver queued insertion batches to subscribers as one notification
    ///
    /// Returns the number of batches delivered.
    pub fn deliver_mutations(&self) -> usize {
        let batches = std::mem::take(&mut self.page.borrow_mut().pending);
        if batches.is_empty() {
            return 0;
        }
        let added: usize = batches.iter().sum();

        let mut subscribers = std::mem::take(&mut *self.subscribers.borrow_mut());
        for subscriber in subscribers.iter_mut() {
            subscriber(added);
        }

        let mut slot = self.subscribers.borrow_mut();
        let late = std::mem::take(&mut *slot);
        *slot = subscribers;
        slot.extend(late);
        batches.len()
    }

    /// Number of entry moves performed through the HostList interface
    pub fn move_count(&self) -> usize {
        self.page.borrow().moves
    }

    pub fn has_controls(&self) -> bool {
        self.page.borrow().controls
    }

    /// Collapsed flag of a rendered folder container
    pub fn is_collapsed(&self, folder: &str) -> Option<bool> {
        self.page.borrow().folder(folder).map(|f| f.collapsed)
    }

    /// Titles of unfiled entries in page order
    pub fn unfiled_titles(&self) -> Vec<String> {
        let page = self.page.borrow();
        page.unfiled
            .iter()
            .filter_map(|e| page.nodes.get(e))
            .map(|n| n.title.clone())
            .collect()
    }

    /// Titles of the entries inside a folder container
    pub fn folder_titles(&self, folder: &str) -> Vec<String> {
        let page = self.page.borrow();
        page.folder(folder)
            .map(|f| {
                f.entries
                    .iter()
                    .filter_map(|e| page.nodes.get(e))
                    .map(|n| n.title.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drag payload assigned to an entry, if it was made draggable
    pub fn drag_id(&self, entry: EntryHandle) -> Option<ConversationId> {
        self.page
            .borrow()
            .nodes
            .get(&entry)
            .and_then(|n| n.drag_id.clone())
    }

    /// Search hits currently listed under a folder
    pub fn search_results(&self, folder: &str) -> Vec<SearchHit> {
        self.page
            .borrow()
            .folder(folder)
            .map(|f| f.search_results.clone())
            .unwrap_or_default()
    }

    pub fn entry_count(&self) -> usize {
        self.page.borrow().nodes.len()
    }
}

impl Default for InMemoryHostList {
    fn default() -> Self {
        Self::new()
    }
}

impl HostList for InMemoryHostList {
    type Entry = EntryHandle;
    type Subscription = SubscriptionId;

    fn is_ready(&self) -> bool {
        self.page.borrow().ready
    }

    fn unfiled_entries(&self) -> Vec<EntryHandle> {
        let page = self.page.borrow();
        if !page.ready {
            return Vec::new();
        }
        page.unfiled.clone()
    }

    fn folder_entries(&self, folder: &str) -> Vec<EntryHandle> {
        let page = self.page.borrow();
        if !page.ready {
            return Vec::new();
        }
        page.folder(folder)
            .map(|f| f.entries.clone())
            .unwrap_or_default()
    }

    fn all_entries(&self) -> Vec<EntryHandle> {
        let page = self.page.borrow();
        if !page.ready {
            return Vec::new();
        }
        page.folders
            .iter()
            .flat_map(|f| f.entries.iter().copied())
            .chain(page.unfiled.iter().copied())
            .collect()
    }

    fn link_href(&self, entry: &EntryHandle) -> Option<String> {
        self.page
            .borrow()
            .nodes
            .get(entry)
            .and_then(|n| n.href.clone())
    }

    fn title(&self, entry: &EntryHandle) -> String {
        self.page
            .borrow()
            .nodes
            .get(entry)
            .map(|n| n.title.clone())
            .unwrap_or_default()
    }

    fn make_draggable(&self, entry: &EntryHandle, id: &ConversationId) {
        if let Some(node) = self.page.borrow_mut().nodes.get_mut(entry) {
            node.drag_id = Some(id.clone());
        }
    }

    fn move_into_folder(
        &self,
        entry: &EntryHandle,
        folder: &str,
        before: Option<&EntryHandle>,
    ) -> bool {
        let mut page = self.page.borrow_mut();
        if !page.ready || page.folder(folder).is_none() || !page.nodes.contains_key(entry) {
            return false;
        }

        page.detach(*entry);
        if let Some(target) = page.folder_mut(folder) {
            let index = before
                .and_then(|b| target.entries.iter().position(|e| e == b))
                .unwrap_or(target.entries.len());
            target.entries.insert(index, *entry);
        }
        page.moves += 1;
        true
    }

    fn move_to_unfiled(&self, entry: &EntryHandle) {
        let mut page = self.page.borrow_mut();
        if !page.ready || !page.nodes.contains_key(entry) {
            return;
        }
        page.detach(*entry);
        page.unfiled.push(*entry);
        page.moves += 1;
        page.pending.push(1);
    }

    fn ensure_controls(&self) -> bool {
        let mut page = self.page.borrow_mut();
        if !page.ready {
            return false;
        }
        if !page.controls {
            page.controls = true;
            page.pending.push(1);
        }
        true
    }

    fn rendered_folders(&self) -> Vec<String> {
        let page = self.page.borrow();
        if !page.ready {
            return Vec::new();
        }
        page.folders.iter().map(|f| f.name.clone()).collect()
    }

    fn render_folder(&self, view: FolderView<'_>) {
        let mut page = self.page.borrow_mut();
        if !page.ready {
            return;
        }
        if let Some(folder) = page.folder_mut(view.name) {
            folder.collapsed = view.collapsed;
            return;
        }
        page.folders.push(FolderNode {
            name: view.name.to_string(),
            collapsed: view.collapsed,
            entries: Vec::new(),
            search_results: Vec::new(),
        });
        page.pending.push(1);
    }

    fn remove_folder(&self, name: &str) {
        let mut page = self.page.borrow_mut();
        let Some(index) = page.folders.iter().position(|f| f.name == name) else {
            return;
        };
        let folder = page.folders.remove(index);
        for entry in folder.entries {
            page.nodes.remove(&entry);
        }
        page.pending.push(0);
    }

    fn set_folder_collapsed(&self, name: &str, collapsed: bool) {
        if let Some(folder) = self.page.borrow_mut().folder_mut(name) {
            folder.collapsed = collapsed;
        }
    }

    fn show_search_results(&self, folder: &str, hits: &[SearchHit]) {
        if let Some(folder) = self.page.borrow_mut().folder_mut(folder) {
            folder.search_results = hits.to_vec();
        }
    }

    fn subscribe_insertions(&self, on_insert: Box<dyn FnMut(usize)>) -> Option<SubscriptionId> {
        if !self.is_ready() {
            return None;
        }
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.push(on_insert);
        Some(SubscriptionId(subscribers.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_into_folder_order() {
        let host = InMemoryHostList::new();
        host.render_folder(FolderView {
            name: "A",
            collapsed: false,
        });
        let a = host.push_conversation("a", "Alpha");
        let b = host.push_conversation("b", "Beta");

        assert!(host.move_into_folder(&b, "A", None));
        assert!(host.move_into_folder(&a, "A", Some(&b)));
        assert_eq!(host.folder_titles("A"), vec!["Alpha", "Beta"]);
        assert!(host.unfiled_titles().is_empty());
        assert_eq!(host.move_count(), 2);
    }

    #[test]
    fn test_move_into_missing_folder() {
        let host = InMemoryHostList::new();
        let a = host.push_conversation("a", "Alpha");
        assert!(!host.move_into_folder(&a, "Nope", None));
        assert_eq!(host.unfiled_titles(), vec!["Alpha"]);
    }

    #[test]
    fn test_detached_page_is_inert() {
        let host = InMemoryHostList::detached();
        assert!(!host.ensure_controls());
        host.render_folder(FolderView {
            name: "A",
            collapsed: false,
        });
        assert!(host.rendered_folders().is_empty());
        assert!(host.subscribe_insertions(Box::new(|_| {})).is_none());
    }

    #[test]
    fn test_deliver_mutations_batches() {
        let host = InMemoryHostList::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        host.subscribe_insertions(Box::new(move |added| sink.borrow_mut().push(added)))
            .unwrap();

        host.push_conversations(&[("a", "Alpha"), ("b", "Beta")]);
        host.push_conversation("c", "Gamma");
        assert_eq!(host.deliver_mutations(), 2);
        assert_eq!(host.deliver_mutations(), 0);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_remove_folder_drops_contents() {
        let host = InMemoryHostList::new();
        host.render_folder(FolderView {
            name: "A",
            collapsed: true,
        });
        assert_eq!(host.is_collapsed("A"), Some(true));
        let a = host.push_conversation("a", "Alpha");
        host.move_into_folder(&a, "A", None);

        host.remove_folder("A");
        assert!(host.rendered_folders().is_empty());
        assert_eq!(host.entry_count(), 0);
    }
}
