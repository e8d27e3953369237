//! The host page's conversation list, seen through the DOM
//!
//! The container is looked up on every call because the host may replace
//! it while navigating. Folder containers are found by comparing their
//! `data-folder` attribute rather than by building selectors from user
//! supplied names.

use std::rc::Rc;

use folders::{ConversationId, FolderSettings, FolderView, HostList, SEARCH_HELP, SearchHit};
use js_sys::Array;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord, Node};

pub const CONTROLS_ID: &str = "cg-controls";
pub const ADD_FOLDER_ID: &str = "cg-add-folder";
pub const EXPORT_ID: &str = "cg-export";
pub const IMPORT_BUTTON_ID: &str = "cg-import-btn";
pub const IMPORT_FILE_ID: &str = "cg-import-file";

pub const FOLDER_CLASS: &str = "cg-folder";
pub const FOLDER_HEADER_CLASS: &str = "cg-folder-header";
pub const TOGGLE_CLASS: &str = "cg-toggle-btn";
pub const DELETE_CLASS: &str = "cg-del-folder";
pub const SEARCH_INPUT_CLASS: &str = "cg-search-input";
pub const SEARCH_HIT_CLASS: &str = "cg-search-hit";
pub const CONTENT_CLASS: &str = "cg-folder-content";
pub const COLLAPSED_CLASS: &str = "collapsed";
pub const DRAG_OVER_CLASS: &str = "drag-over";

pub const FOLDER_ATTR: &str = "data-folder";
pub const HIT_ID_ATTR: &str = "data-id";

struct Selectors {
    container: String,
    item: String,
    title: String,
}

/// Conversation list of the current document
#[derive(Clone)]
pub struct DomHostList {
    document: Document,
    selectors: Rc<Selectors>,
}

/// Live insertion observer; disconnects when dropped
pub struct ListSubscription {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl Drop for ListSubscription {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

impl DomHostList {
    pub fn new(document: Document, settings: &FolderSettings) -> Self {
        Self {
            document,
            selectors: Rc::new(Selectors {
                container: settings.container_selector.clone(),
                item: settings.item_selector.clone(),
                title: settings.title_selector.clone(),
            }),
        }
    }

    pub fn item_selector(&self) -> &str {
        &self.selectors.item
    }

    fn container(&self) -> Option<Element> {
        self.document
            .query_selector(&self.selectors.container)
            .ok()
            .flatten()
    }

    fn is_entry(&self, element: &Element) -> bool {
        element.matches(&self.selectors.item).unwrap_or(false)
    }

    fn folder(&self, name: &str) -> Option<Element> {
        let container = self.container()?;
        child_elements(&container).find(|child| is_folder_named(child, name))
    }

    fn folder_content(&self, name: &str) -> Option<Element> {
        self.folder(name)?
            .query_selector(&format!(".{}", CONTENT_CLASS))
            .ok()
            .flatten()
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element, JsValue> {
        let element = self.document.create_element(tag)?;
        if !class.is_empty() {
            element.set_class_name(class);
        }
        Ok(element)
    }

    fn create_button(&self, id: &str, class: &str, label: &str) -> Result<Element, JsValue> {
        let button = self.create("button", class)?;
        button.set_attribute("type", "button")?;
        if !id.is_empty() {
            button.set_id(id);
        }
        button.set_text_content(Some(label));
        Ok(button)
    }

    fn build_controls(&self) -> Result<Element, JsValue> {
        let controls = self.create("div", "")?;
        controls.set_id(CONTROLS_ID);
        controls.append_child(&self.create_button(ADD_FOLDER_ID, "", "➕ New Folder")?)?;
        controls.append_child(&self.create_button(EXPORT_ID, "", "💾 Export")?)?;
        controls.append_child(&self.create_button(IMPORT_BUTTON_ID, "", "📂 Import")?)?;

        let file = self.create("input", "")?;
        file.set_id(IMPORT_FILE_ID);
        file.set_attribute("type", "file")?;
        file.set_attribute("accept", ".json,application/json")?;
        file.set_attribute("hidden", "")?;
        controls.append_child(&file)?;
        Ok(controls)
    }

    fn build_folder(&self, view: FolderView<'_>) -> Result<Element, JsValue> {
        let folder = self.create("div", FOLDER_CLASS)?;
        folder.set_attribute(FOLDER_ATTR, view.name)?;
        if view.collapsed {
            folder.class_list().add_1(COLLAPSED_CLASS)?;
        }

        let header = self.create("div", FOLDER_HEADER_CLASS)?;
        header.append_child(&self.create_button("", TOGGLE_CLASS, "▼")?)?;
        let title = self.create("span", "cg-folder-title")?;
        title.set_text_content(Some(&format!("📁 {}", view.name)));
        header.append_child(&title)?;
        header.append_child(&self.create_button("", DELETE_CLASS, "X")?)?;
        folder.append_child(&header)?;

        let search = self.create("div", "cg-folder-search")?;
        let input = self.create("input", SEARCH_INPUT_CLASS)?;
        input.set_attribute("type", "search")?;
        input.set_attribute("placeholder", "Search loaded conversations to add")?;
        search.append_child(&input)?;
        search.append_child(&self.create("div", "cg-search-results")?)?;
        let help = self.create("div", "cg-search-help")?;
        help.set_text_content(Some(SEARCH_HELP));
        search.append_child(&help)?;
        folder.append_child(&search)?;

        folder.append_child(&self.create("div", CONTENT_CLASS)?)?;
        Ok(folder)
    }

    fn build_hit(&self, hit: &SearchHit) -> Result<Element, JsValue> {
        let row = self.create("div", SEARCH_HIT_CLASS)?;
        row.set_attribute(HIT_ID_ATTR, hit.id.as_str())?;
        row.set_text_content(Some(&hit.title));
        Ok(row)
    }
}

impl HostList for DomHostList {
    type Entry = Element;
    type Subscription = ListSubscription;

    fn is_ready(&self) -> bool {
        self.container().is_some()
    }

    fn unfiled_entries(&self) -> Vec<Element> {
        let Some(container) = self.container() else {
            return Vec::new();
        };
        child_elements(&container)
            .filter(|child| self.is_entry(child))
            .collect()
    }

    fn folder_entries(&self, folder: &str) -> Vec<Element> {
        let Some(content) = self.folder_content(folder) else {
            return Vec::new();
        };
        child_elements(&content)
            .filter(|child| self.is_entry(child))
            .collect()
    }

    fn all_entries(&self) -> Vec<Element> {
        let Some(list) = self
            .container()
            .and_then(|container| container.query_selector_all(&self.selectors.item).ok())
        else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn link_href(&self, entry: &Element) -> Option<String> {
        entry
            .query_selector("a[href]")
            .ok()
            .flatten()
            .and_then(|link| link.get_attribute("href"))
    }

    fn title(&self, entry: &Element) -> String {
        entry
            .query_selector(&self.selectors.title)
            .ok()
            .flatten()
            .and_then(|title| title.text_content())
            .or_else(|| entry.text_content())
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }

    fn make_draggable(&self, entry: &Element, id: &ConversationId) {
        if entry.get_attribute("draggable").as_deref() == Some("true") {
            return;
        }
        if let Err(e) = entry.set_attribute("draggable", "true") {
            warn!("Cannot make {} draggable: {:?}", id, e);
        }
    }

    fn move_into_folder(&self, entry: &Element, folder: &str, before: Option<&Element>) -> bool {
        let Some(content) = self.folder_content(folder) else {
            return false;
        };
        let before: Option<&Node> = before.map(|element| element.as_ref());
        content.insert_before(entry, before).is_ok()
    }

    fn move_to_unfiled(&self, entry: &Element) {
        if let Some(container) = self.container() {
            if let Err(e) = container.append_child(entry) {
                warn!("Cannot return conversation to the list: {:?}", e);
            }
        }
    }

    fn ensure_controls(&self) -> bool {
        let Some(container) = self.container() else {
            return false;
        };
        if self.document.get_element_by_id(CONTROLS_ID).is_some() {
            return true;
        }
        match self
            .build_controls()
            .and_then(|controls| container.prepend_with_node_1(&controls))
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot inject folder controls: {:?}", e);
                false
            }
        }
    }

    fn rendered_folders(&self) -> Vec<String> {
        let Some(container) = self.container() else {
            return Vec::new();
        };
        child_elements(&container)
            .filter(|child| child.class_list().contains(FOLDER_CLASS))
            .filter_map(|child| child.get_attribute(FOLDER_ATTR))
            .collect()
    }

    fn render_folder(&self, view: FolderView<'_>) {
        let Some(container) = self.container() else {
            return;
        };
        if self.folder(view.name).is_some() {
            self.set_folder_collapsed(view.name, view.collapsed);
            return;
        }

        // After the last folder, or right after the control bar
        let anchor = child_elements(&container)
            .filter(|child| child.class_list().contains(FOLDER_CLASS))
            .last()
            .or_else(|| self.document.get_element_by_id(CONTROLS_ID));
        let reference = match anchor {
            Some(anchor) => anchor.next_element_sibling(),
            None => container.first_element_child(),
        };

        let result = self.build_folder(view).and_then(|folder| {
            let reference: Option<&Node> = reference.as_ref().map(|element| element.as_ref());
            container.insert_before(&folder, reference).map(|_| ())
        });
        if let Err(e) = result {
            warn!("Cannot render folder {}: {:?}", view.name, e);
        }
    }

    fn remove_folder(&self, name: &str) {
        if let Some(folder) = self.folder(name) {
            folder.remove();
        }
    }

    fn set_folder_collapsed(&self, name: &str, collapsed: bool) {
        if let Some(folder) = self.folder(name) {
            if let Err(e) = folder.class_list().toggle_with_force(COLLAPSED_CLASS, collapsed) {
                warn!("Cannot update folder {}: {:?}", name, e);
            }
        }
    }

    fn show_search_results(&self, folder: &str, hits: &[SearchHit]) {
        let Some(results) = self
            .folder(folder)
            .and_then(|folder| folder.query_selector(".cg-search-results").ok().flatten())
        else {
            return;
        };
        results.set_text_content(None);
        for hit in hits {
            if let Err(e) = self.build_hit(hit).and_then(|row| results.append_child(&row)) {
                warn!("Cannot show search result {}: {:?}", hit.id, e);
            }
        }
    }

    fn subscribe_insertions(
        &self,
        mut on_insert: Box<dyn FnMut(usize)>,
    ) -> Option<ListSubscription> {
        let container = self.container()?;

        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let added: u32 = records
                    .iter()
                    .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                    .map(|record| record.added_nodes().length())
                    .sum();
                on_insert(added as usize);
            },
        );

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                warn!("Cannot create mutation observer: {:?}", e);
                return None;
            }
        };
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        if let Err(e) = observer.observe_with_options(&container, &options) {
            warn!("Cannot observe the conversation list: {:?}", e);
            return None;
        }

        Some(ListSubscription {
            observer,
            _callback: callback,
        })
    }
}

fn child_elements(parent: &Element) -> impl Iterator<Item = Element> {
    let children = parent.children();
    (0..children.length()).filter_map(move |i| children.item(i))
}

fn is_folder_named(element: &Element, name: &str) -> bool {
    element.class_list().contains(FOLDER_CLASS)
        && element.get_attribute(FOLDER_ATTR).as_deref() == Some(name)
}

/// Name of the folder containing `element`, if any
pub fn enclosing_folder(element: &Element) -> Option<(Element, String)> {
    let folder = element.closest(&format!(".{}", FOLDER_CLASS)).ok().flatten()?;
    let name = folder.get_attribute(FOLDER_ATTR)?;
    Some((folder, name))
}
