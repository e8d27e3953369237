//! Page event wiring
//!
//! Listeners are delegated from the document so they survive the host
//! re-rendering its list and our own folder containers being rebuilt.

use std::cell::RefCell;
use std::rc::Rc;

use folders::{ConversationId, FolderController};
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, DragEvent, Element, Event, HtmlElement, HtmlInputElement};

use crate::chrome_storage::ChromeStorage;
use crate::dialogs::BrowserDialogs;
use crate::dom::{self, DomHostList, enclosing_folder};
use crate::download;

pub type Controller = FolderController<DomHostList, ChromeStorage, BrowserDialogs>;
type Shared = Rc<RefCell<Controller>>;

const DRAG_FORMAT: &str = "text/plain";

/// Attach every listener the folders need to the document
pub fn bind(document: &Document, controller: &Shared) {
    listen(document, "click", controller, on_click);
    listen(document, "input", controller, on_input);
    listen(document, "change", controller, on_change);
    listen(document, "dragstart", controller, on_drag_start);
    listen(document, "dragover", controller, on_drag_over);
    listen(document, "dragleave", controller, on_drag_leave);
    listen(document, "drop", controller, on_drop);
}

fn listen(
    document: &Document,
    kind: &str,
    controller: &Shared,
    handler: fn(&Shared, &Event, Element),
) {
    let controller = controller.clone();
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
            handler(&controller, &event, target);
        }
    });
    if let Err(e) =
        document.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
    {
        warn!("Cannot listen for {} events: {:?}", kind, e);
    }
    callback.forget();
}

fn closest(target: &Element, selector: &str) -> Option<Element> {
    target.closest(selector).ok().flatten()
}

/// Mark a folder as the current drop target
fn highlight(folder: &Element, on: bool) {
    if let Err(e) = folder.class_list().toggle_with_force(dom::DRAG_OVER_CLASS, on) {
        warn!("Cannot highlight folder: {:?}", e);
    }
}

fn by_id(id: &str) -> String {
    format!("#{}", id)
}

fn by_class(class: &str) -> String {
    format!(".{}", class)
}

fn on_click(controller: &Shared, event: &Event, target: Element) {
    if closest(&target, &by_id(dom::ADD_FOLDER_ID)).is_some() {
        controller.borrow_mut().prompt_create_folder();
        return;
    }

    if closest(&target, &by_id(dom::EXPORT_ID)).is_some() {
        let Some(file) = controller.borrow().export() else {
            return;
        };
        if let Some(document) = target.owner_document() {
            match download::offer(&document, &file) {
                Ok(()) => info!("Exported folders to {}", file.filename),
                Err(e) => warn!("Export download failed: {:#}", e),
            }
        }
        return;
    }

    if closest(&target, &by_id(dom::IMPORT_BUTTON_ID)).is_some() {
        if let Some(input) = target
            .owner_document()
            .and_then(|document| document.get_element_by_id(dom::IMPORT_FILE_ID))
            .and_then(|input| input.dyn_into::<HtmlElement>().ok())
        {
            input.click();
        }
        return;
    }

    let Some((_, folder)) = enclosing_folder(&target) else {
        return;
    };

    if closest(&target, &by_class(dom::DELETE_CLASS)).is_some() {
        event.stop_propagation();
        controller.borrow_mut().request_delete_folder(&folder);
    } else if let Some(hit) = closest(&target, &by_class(dom::SEARCH_HIT_CLASS)) {
        if let Some(id) = hit.get_attribute(dom::HIT_ID_ATTR) {
            controller
                .borrow_mut()
                .add_from_search(&ConversationId::new(id), &folder);
        }
    } else if closest(&target, &by_class(dom::TOGGLE_CLASS)).is_some()
        || closest(&target, &by_class(dom::FOLDER_HEADER_CLASS)).is_some()
    {
        controller.borrow_mut().toggle_collapsed(&folder);
    }
}

fn on_input(controller: &Shared, _event: &Event, target: Element) {
    if !target.class_list().contains(dom::SEARCH_INPUT_CLASS) {
        return;
    }
    let (Some((_, folder)), Ok(input)) = (
        enclosing_folder(&target),
        target.dyn_into::<HtmlInputElement>(),
    ) else {
        return;
    };
    controller.borrow().search(&folder, &input.value());
}

fn on_change(controller: &Shared, _event: &Event, target: Element) {
    if target.id() != dom::IMPORT_FILE_ID {
        return;
    }
    let Ok(input) = target.dyn_into::<HtmlInputElement>() else {
        return;
    };
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return;
    };
    // Let the same file be picked again
    input.set_value("");

    let controller = controller.clone();
    spawn_local(async move {
        let text = match JsFuture::from(file.text()).await {
            Ok(text) => text.as_string().unwrap_or_default(),
            Err(e) => {
                warn!("Cannot read {}: {:?}", file.name(), e);
                return;
            }
        };
        let imported = controller.borrow_mut().import(&text);
        if imported {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().reload() {
                    warn!("Reload after import failed: {:?}", e);
                }
            }
        }
    });
}

fn on_drag_start(controller: &Shared, event: &Event, target: Element) {
    let controller = controller.borrow();
    let Some(entry) = closest(&target, controller.host().item_selector()) else {
        return;
    };
    let Some(id) = controller.begin_drag(&entry) else {
        debug!("Dragged entry has no conversation id");
        return;
    };
    if let Some(transfer) = event.dyn_ref::<DragEvent>().and_then(DragEvent::data_transfer) {
        if let Err(e) = transfer.set_data(DRAG_FORMAT, id.as_str()) {
            warn!("Cannot start dragging {}: {:?}", id, e);
        }
    }
}

fn on_drag_over(controller: &Shared, event: &Event, target: Element) {
    let Some((folder, name)) = enclosing_folder(&target) else {
        return;
    };
    event.prevent_default();
    highlight(&folder, true);
    controller.borrow_mut().drag_over(&name);
}

fn on_drag_leave(_controller: &Shared, _event: &Event, target: Element) {
    if let Some((folder, _)) = enclosing_folder(&target) {
        highlight(&folder, false);
    }
}

fn on_drop(controller: &Shared, event: &Event, target: Element) {
    let Some((folder, name)) = enclosing_folder(&target) else {
        return;
    };
    event.prevent_default();
    highlight(&folder, false);

    let payload = event
        .dyn_ref::<DragEvent>()
        .and_then(DragEvent::data_transfer)
        .and_then(|transfer| transfer.get_data(DRAG_FORMAT).ok())
        .unwrap_or_default();
    controller.borrow_mut().drop_payload(&payload, &name);
}
