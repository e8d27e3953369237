//! Folder controller
//!
//! Owns the folder store, the host page handle and the dialogs for one
//! content script instance, and turns user actions into state mutations
//! followed by persistence and a page update.

use anyhow::Result;
use log::{debug, info, warn};

use crate::dialogs::Dialogs;
use crate::host::{FolderView, HostList};
use crate::identity::{PageSnapshot, StorageKey, resolve_storage_key};
use crate::models::{ConversationId, FolderState};
use crate::search::{SearchHit, search_loaded};
use crate::settings::FolderSettings;
use crate::storage::StateStorage;
use crate::store::FolderStore;
use crate::sync::{self, PlacementReport};
use crate::transfer::{ExportFile, export_json, import_json};

/// Alert shown when an imported file cannot be used
pub const INVALID_IMPORT_MESSAGE: &str = "Invalid JSON file.";

/// Prompt shown when creating a folder
pub const NEW_FOLDER_PROMPT: &str = "Folder Name:";

/// Coordinates folder state with the host page
pub struct FolderController<H, S, D> {
    host: H,
    store: FolderStore<S>,
    dialogs: D,
    settings: FolderSettings,
}

impl<H, S, D> FolderController<H, S, D>
where
    H: HostList,
    S: StateStorage,
    D: Dialogs,
{
    /// Resolve the user's key, load their folders and mount them on the page
    pub async fn start(
        host: H,
        storage: S,
        dialogs: D,
        settings: FolderSettings,
        snapshot: &PageSnapshot,
    ) -> Result<Self> {
        let key = resolve_storage_key(snapshot, &settings.storage_key_base);
        info!("Using storage key {}", key);

        // Folders saved before per-account keys sit under the base key
        let base = StorageKey::new(settings.storage_key_base.as_str());
        let store = FolderStore::load_with_fallback(storage, key, Some(&base)).await?;
        let controller = Self::with_store(host, store, dialogs, settings);
        controller.mount();
        Ok(controller)
    }

    /// Wrap an already loaded store without touching the page
    pub fn with_store(
        host: H,
        store: FolderStore<S>,
        dialogs: D,
        settings: FolderSettings,
    ) -> Self {
        Self {
            host,
            store,
            dialogs,
            settings,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> &FolderState {
        self.store.state()
    }

    pub fn storage_key(&self) -> &StorageKey {
        self.store.key()
    }

    pub fn settings(&self) -> &FolderSettings {
        &self.settings
    }

    fn marker(&self) -> &str {
        &self.settings.id_path_marker
    }

    /// Inject the controls, render every folder and place the loaded entries
    ///
    /// Does nothing when the conversation list is not on the page.
    pub fn mount(&self) -> PlacementReport {
        if !self.host.ensure_controls() {
            debug!("Conversation list not found; folders not mounted");
            return PlacementReport::default();
        }
        for (name, record) in self.store.state().folders() {
            self.host.render_folder(FolderView::new(name, record));
        }
        self.place_all()
    }

    /// Unfile every rendered entry, drop all folder containers and mount
    /// the current state from scratch
    pub fn rerender(&self) -> PlacementReport {
        for name in self.host.rendered_folders() {
            for entry in self.host.folder_entries(&name) {
                self.host.move_to_unfiled(&entry);
            }
            self.host.remove_folder(&name);
        }
        self.mount()
    }

    /// Move every unfiled entry that belongs to a folder into it
    pub fn place_all(&self) -> PlacementReport {
        sync::place_all(&self.host, self.store.state(), self.marker())
    }

    /// Create a folder, alerting the user if the name is rejected
    pub fn create_folder(&mut self, name: &str) -> bool {
        match self.store.create_folder(name) {
            Ok(name) => {
                self.host.render_folder(FolderView {
                    name: &name,
                    collapsed: false,
                });
                true
            }
            Err(e) => {
                self.dialogs.alert(&e.to_string());
                false
            }
        }
    }

    /// Ask for a name and create the folder; cancelling does nothing
    pub fn prompt_create_folder(&mut self) -> bool {
        match self.dialogs.prompt(NEW_FOLDER_PROMPT) {
            Some(name) => self.create_folder(&name),
            None => false,
        }
    }

    /// Delete a folder after the user confirms
    pub fn request_delete_folder(&mut self, name: &str) -> bool {
        if !self.store.state().contains_folder(name) {
            return false;
        }
        let message = format!(
            "Delete folder \"{}\"? Its conversations go back to the main list.",
            name
        );
        if !self.dialogs.confirm(&message) {
            return false;
        }
        self.delete_folder(name)
    }

    /// Delete a folder, returning its rendered entries to the unfiled list
    pub fn delete_folder(&mut self, name: &str) -> bool {
        if let Err(e) = self.store.delete_folder(name) {
            warn!("Cannot delete folder: {}", e);
            return false;
        }
        for entry in self.host.folder_entries(name) {
            self.host.move_to_unfiled(&entry);
        }
        self.host.remove_folder(name);
        true
    }

    /// Flip a folder's collapsed flag; returns the new flag
    pub fn toggle_collapsed(&mut self, name: &str) -> Option<bool> {
        let collapsed = !self.store.state().get(name)?.collapsed;
        self.set_collapsed(name, collapsed).then_some(collapsed)
    }

    /// Set a folder's collapsed flag and reflect it on the page
    pub fn set_collapsed(&mut self, name: &str, collapsed: bool) -> bool {
        match self.store.set_collapsed(name, collapsed) {
            Ok(_) => {
                self.host.set_folder_collapsed(name, collapsed);
                true
            }
            Err(e) => {
                warn!("Cannot change folder: {}", e);
                false
            }
        }
    }

    /// Dragging over a collapsed folder opens it
    pub fn drag_over(&mut self, name: &str) {
        if self.store.state().get(name).is_some_and(|f| f.collapsed) {
            self.set_collapsed(name, false);
        }
    }

    /// Drag payload for an entry; `None` if it has no conversation id
    pub fn begin_drag(&self, entry: &H::Entry) -> Option<ConversationId> {
        sync::entry_id(&self.host, entry, self.marker())
    }

    /// Handle a drop whose payload is the raw drag data
    pub fn drop_payload(&mut self, payload: &str, folder: &str) -> bool {
        let payload = payload.trim();
        if payload.is_empty() {
            return false;
        }
        self.drop_on_folder(&ConversationId::new(payload), folder)
    }

    /// File a conversation under `folder`, opening the folder and moving the
    /// rendered entry into it
    pub fn drop_on_folder(&mut self, id: &ConversationId, folder: &str) -> bool {
        if let Err(e) = self.store.move_item(id, folder) {
            warn!("Cannot file {}: {}", id, e);
            return false;
        }
        self.drag_over(folder);

        match sync::find_entry(&self.host, id, self.marker()) {
            Some(entry) => {
                sync::place_entry(
                    &self.host,
                    self.store.state(),
                    &entry,
                    id,
                    folder,
                    self.marker(),
                );
            }
            None => debug!("{} is not rendered; it will be placed when it loads", id),
        }
        true
    }

    /// List loaded conversations matching `query` under a folder
    pub fn search(&self, folder: &str, query: &str) -> Vec<SearchHit> {
        if !self.store.state().contains_folder(folder) {
            return Vec::new();
        }
        let hits = search_loaded(&self.host, self.store.state(), folder, query, self.marker());
        self.host.show_search_results(folder, &hits);
        hits
    }

    /// File a search hit under `folder` and clear the folder's results
    pub fn add_from_search(&mut self, id: &ConversationId, folder: &str) -> bool {
        let filed = self.drop_on_folder(id, folder);
        if filed {
            self.host.show_search_results(folder, &[]);
        }
        filed
    }

    /// Serialize the state for download
    pub fn export(&self) -> Option<ExportFile> {
        match export_json(self.store.state()) {
            Ok(contents) => Some(ExportFile {
                filename: self.settings.export_filename.clone(),
                contents,
            }),
            Err(e) => {
                warn!("Export failed: {}", e);
                self.dialogs.alert(&format!("Export failed: {}", e));
                None
            }
        }
    }

    /// Replace the state with an imported document and re-apply it
    ///
    /// A document that does not parse leaves the state untouched.
    pub fn import(&mut self, text: &str) -> bool {
        match import_json(text) {
            Ok(state) => {
                info!(
                    "Imported {} folders ({} conversations)",
                    state.len(),
                    state.item_count()
                );
                self.store.replace(state);
                self.rerender();
                true
            }
            Err(e) => {
                warn!("Rejected import: {}", e);
                self.dialogs.alert(INVALID_IMPORT_MESSAGE);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::ScriptedDialogs;
    use crate::host::InMemoryHostList;
    use crate::storage::InMemoryStateStorage;
    use serde_json::json;

    type TestController = FolderController<InMemoryHostList, InMemoryStateStorage, ScriptedDialogs>;

    struct Harness {
        host: InMemoryHostList,
        storage: InMemoryStateStorage,
        dialogs: ScriptedDialogs,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                host: InMemoryHostList::new(),
                storage: InMemoryStateStorage::new(),
                dialogs: ScriptedDialogs::new(),
            }
        }

        fn start(&self) -> TestController {
            tokio_test::block_on(FolderController::start(
                self.host.clone(),
                self.storage.clone(),
                self.dialogs.clone(),
                FolderSettings::default(),
                &PageSnapshot::new(),
            ))
            .unwrap()
        }

        fn stored(&self) -> serde_json::Value {
            self.storage.get("gemini_conversation_groups").unwrap()
        }
    }

    #[test]
    fn test_start_mounts_stored_folders() {
        let harness = Harness::new();
        harness.storage.insert(
            "gemini_conversation_groups",
            json!({"folders": {"Work": {"items": ["b"], "collapsed": true}}}),
        );
        harness.host.push_conversations(&[("a", "Alpha"), ("b", "Beta")]);

        let controller = harness.start();
        assert!(harness.host.has_controls());
        assert_eq!(harness.host.rendered_folders(), vec!["Work"]);
        assert_eq!(harness.host.is_collapsed("Work"), Some(true));
        assert_eq!(harness.host.folder_titles("Work"), vec!["Beta"]);
        assert_eq!(harness.host.unfiled_titles(), vec!["Alpha"]);
        assert_eq!(controller.storage_key().as_str(), "gemini_conversation_groups");
    }

    #[test]
    fn test_start_without_container() {
        let harness = Harness {
            host: InMemoryHostList::detached(),
            ..Harness::new()
        };
        let controller = harness.start();
        assert!(!harness.host.has_controls());
        assert_eq!(controller.place_all(), PlacementReport::default());
    }

    #[test]
    fn test_start_with_unreadable_state_still_mounts() {
        let harness = Harness::new();
        harness.storage.insert(
            "gemini_conversation_groups",
            json!({"folders": {"A": ["x"]}, "collapsed": {"A": 1}}),
        );
        harness.host.push_conversation("x", "X");

        let mut controller = harness.start();
        assert!(harness.host.has_controls());
        assert!(controller.state().is_empty());
        assert_eq!(harness.host.unfiled_titles(), vec!["X"]);

        // Importing a good file recovers
        assert!(controller.import(r#"{"folders": {"A": ["x"]}}"#));
        assert_eq!(harness.host.folder_titles("A"), vec!["X"]);
        assert_eq!(harness.stored()["folders"]["A"]["items"], json!(["x"]));
    }

    #[test]
    fn test_create_folder_alerts_on_duplicate() {
        let harness = Harness::new();
        let mut controller = harness.start();

        assert!(controller.create_folder("Work"));
        assert!(!controller.create_folder("Work"));
        assert!(!controller.create_folder("  "));
        assert_eq!(harness.dialogs.alerts().len(), 2);
        assert_eq!(harness.host.rendered_folders(), vec!["Work"]);
    }

    #[test]
    fn test_prompt_create_folder() {
        let harness = Harness::new();
        let mut controller = harness.start();

        harness.dialogs.answer_prompt(None);
        assert!(!controller.prompt_create_folder());
        assert!(harness.dialogs.alerts().is_empty());

        harness.dialogs.answer_prompt(Some(" Ideas "));
        assert!(controller.prompt_create_folder());
        assert!(controller.state().contains_folder("Ideas"));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let harness = Harness::new();
        harness.host.push_conversations(&[("x", "X"), ("y", "Y")]);
        let mut controller = harness.start();
        controller.create_folder("Work");
        controller.drop_on_folder(&ConversationId::new("x"), "Work");

        harness.dialogs.answer_confirm(false);
        assert!(!controller.request_delete_folder("Work"));
        assert!(controller.state().contains_folder("Work"));

        harness.dialogs.answer_confirm(true);
        assert!(controller.request_delete_folder("Work"));
        assert!(!controller.state().contains_folder("Work"));
        assert_eq!(harness.host.unfiled_titles(), vec!["Y", "X"]);
        assert!(harness.host.rendered_folders().is_empty());
    }

    #[test]
    fn test_toggle_and_drag_over() {
        let harness = Harness::new();
        let mut controller = harness.start();
        controller.create_folder("Work");

        assert_eq!(controller.toggle_collapsed("Work"), Some(true));
        assert_eq!(harness.host.is_collapsed("Work"), Some(true));
        assert_eq!(harness.stored()["folders"]["Work"]["collapsed"], json!(true));

        controller.drag_over("Work");
        assert_eq!(harness.host.is_collapsed("Work"), Some(false));
        assert_eq!(harness.stored()["folders"]["Work"]["collapsed"], json!(false));

        assert_eq!(controller.toggle_collapsed("Missing"), None);
    }

    #[test]
    fn test_drop_expands_and_moves() {
        let harness = Harness::new();
        let handles = harness.host.push_conversations(&[("a", "Alpha"), ("b", "Beta")]);
        let mut controller = harness.start();
        controller.create_folder("Work");
        controller.set_collapsed("Work", true);

        let payload = controller.begin_drag(&handles[1]).unwrap();
        assert!(controller.drop_payload(payload.as_str(), "Work"));
        assert_eq!(harness.host.is_collapsed("Work"), Some(false));
        assert_eq!(harness.host.folder_titles("Work"), vec!["Beta"]);
        assert_eq!(harness.stored()["folders"]["Work"]["items"], json!(["b"]));

        assert!(!controller.drop_payload("  ", "Work"));
        assert!(!controller.drop_payload("a", "Missing"));
    }

    #[test]
    fn test_drop_unrendered_conversation() {
        let harness = Harness::new();
        let mut controller = harness.start();
        controller.create_folder("Work");

        assert!(controller.drop_on_folder(&ConversationId::new("later"), "Work"));
        harness.host.push_conversation("later", "Later");
        controller.place_all();
        assert_eq!(harness.host.folder_titles("Work"), vec!["Later"]);
    }

    #[test]
    fn test_search_and_add() {
        let harness = Harness::new();
        harness.host.push_conversations(&[("b", "Budget Plan"), ("o", "Other")]);
        let mut controller = harness.start();
        controller.create_folder("Old");
        controller.create_folder("Finance");
        controller.drop_on_folder(&ConversationId::new("b"), "Old");

        let hits = controller.search("Finance", "budget");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Budget Plan");
        assert_eq!(harness.host.search_results("Finance"), hits);

        assert!(controller.add_from_search(&hits[0].id, "Finance"));
        assert_eq!(controller.state().folder_of(&hits[0].id), Some("Finance"));
        assert!(controller.state().get("Old").unwrap().items.is_empty());
        assert_eq!(harness.host.folder_titles("Finance"), vec!["Budget Plan"]);
        assert!(harness.host.search_results("Finance").is_empty());
    }

    #[test]
    fn test_export_and_import() {
        let harness = Harness::new();
        harness.host.push_conversations(&[("x", "X"), ("y", "Y"), ("z", "Z")]);
        let mut controller = harness.start();
        controller.create_folder("Work");
        controller.drop_on_folder(&ConversationId::new("x"), "Work");

        let file = controller.export().unwrap();
        assert_eq!(file.filename, "gemini_conversation_groups.json");

        let imported = r#"{"folders": {"Home": {"items": ["y", "z"], "collapsed": false}}}"#;
        assert!(controller.import(imported));
        assert_eq!(harness.host.rendered_folders(), vec!["Home"]);
        assert_eq!(harness.host.folder_titles("Home"), vec!["Y", "Z"]);
        assert_eq!(harness.host.unfiled_titles(), vec!["X"]);
        assert_eq!(harness.stored(), serde_json::from_str::<serde_json::Value>(imported).unwrap());

        assert!(controller.import(&file.contents));
        assert_eq!(harness.host.folder_titles("Work"), vec!["X"]);
    }

    #[test]
    fn test_import_rejects_invalid_file() {
        let harness = Harness::new();
        let mut controller = harness.start();
        controller.create_folder("Work");
        let before = controller.state().clone();

        assert!(!controller.import("{ not json"));
        assert_eq!(controller.state(), &before);
        assert_eq!(harness.dialogs.alerts(), vec![INVALID_IMPORT_MESSAGE.to_string()]);
    }
}
