//! Conversation folders content script
//!
//! Browser entry point: loads settings, resolves the signed-in account,
//! mounts the folders onto the conversation list and wires page events to
//! the folder controller.

#[cfg(target_arch = "wasm32")]
mod chrome_storage;
#[cfg(target_arch = "wasm32")]
mod dialogs;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod download;
#[cfg(target_arch = "wasm32")]
mod events;

#[cfg(target_arch = "wasm32")]
pub use app::start;

#[cfg(target_arch = "wasm32")]
mod app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Context, Result, anyhow};
    use folders::{
        FolderController, FolderSettings, PageSnapshot, SETTINGS_STORAGE_KEY, attach_observer,
    };
    use gloo_timers::future::TimeoutFuture;
    use log::{error, info};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::Document;

    use crate::chrome_storage::ChromeStorage;
    use crate::dialogs::BrowserDialogs;
    use crate::dom::DomHostList;
    use crate::events;

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        spawn_local(async {
            if let Err(e) = run().await {
                error!("Conversation folders failed to start: {:#}", e);
            }
        });
    }

    async fn run() -> Result<()> {
        let storage = ChromeStorage::new();
        let settings = load_settings(&storage).await;
        wasm_logger::init(wasm_logger::Config::new(settings.log_level()));

        // Let the host paint its list before the first pass
        TimeoutFuture::new(settings.startup_delay_ms).await;

        let window = web_sys::window().ok_or_else(|| anyhow!("No window"))?;
        let document = window.document().ok_or_else(|| anyhow!("No document"))?;
        let snapshot = page_snapshot(&window, &document, &settings);

        let host = DomHostList::new(document.clone(), &settings);
        let controller =
            FolderController::start(host, storage, BrowserDialogs::new(window), settings, &snapshot)
                .await
                .context("Failed to load folders")?;
        let controller = Rc::new(RefCell::new(controller));

        events::bind(&document, &controller);
        match attach_observer(&controller) {
            Some(subscription) => std::mem::forget(subscription),
            None => info!("Conversation list not found; new conversations will not be placed"),
        }

        info!("Conversation folders ready");
        Ok(())
    }

    /// Defaults overlaid with embedded settings and any stored overrides
    async fn load_settings(storage: &ChromeStorage) -> FolderSettings {
        let overrides = match storage.load_raw(SETTINGS_STORAGE_KEY).await {
            Ok(value) => value.map(|v| v.to_string()),
            Err(e) => {
                web_sys::console::warn_1(&format!("Cannot read settings: {:#}", e).into());
                None
            }
        };
        FolderSettings::load(overrides.as_deref()).unwrap_or_else(|e| {
            web_sys::console::warn_1(&format!("Ignoring invalid settings: {:#}", e).into());
            FolderSettings::default()
        })
    }

    fn page_snapshot(
        window: &web_sys::Window,
        document: &Document,
        settings: &FolderSettings,
    ) -> PageSnapshot {
        let mut snapshot = PageSnapshot::new();
        if let Some(label) = document
            .query_selector(&settings.account_selector)
            .ok()
            .flatten()
            .and_then(|account| account.get_attribute("aria-label"))
        {
            snapshot = snapshot.with_account_label(label);
        }
        if let Ok(href) = window.location().href() {
            snapshot = snapshot.with_url(href);
        }
        snapshot
    }
}

/// Convert a thrown JavaScript value into an error
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error(value: wasm_bindgen::JsValue) -> anyhow::Error {
    match value.as_string() {
        Some(message) => anyhow::anyhow!(message),
        None => anyhow::anyhow!("{:?}", value),
    }
}
