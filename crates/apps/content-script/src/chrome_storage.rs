//! `chrome.storage.local` backed state storage

use anyhow::{Context, Result};
use folders::{StateStorage, StorageKey};
use js_sys::{Object, Promise, Reflect};
use log::warn;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::js_error;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_set(items: &JsValue) -> Result<Promise, JsValue>;
}

/// Extension-local storage, shared by every tab of the extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

impl ChromeStorage {
    pub fn new() -> Self {
        Self
    }

    /// Read one key as JSON; `None` when absent
    pub async fn load_raw(&self, key: &str) -> Result<Option<Value>> {
        let key = JsValue::from_str(key);
        let promise = storage_get(&key).map_err(js_error)?;
        let items = JsFuture::from(promise).await.map_err(js_error)?;
        let value = Reflect::get(&items, &key).map_err(js_error)?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        let value = serde_wasm_bindgen::from_value(value)
            .context("Stored value is not representable as JSON")?;
        Ok(Some(value))
    }
}

impl StateStorage for ChromeStorage {
    async fn load(&self, key: &StorageKey) -> Result<Option<Value>> {
        self.load_raw(key.as_str()).await
    }

    fn persist(&self, key: &StorageKey, value: Value) -> Result<()> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = value
            .serialize(&serializer)
            .context("Failed to convert folder state")?;

        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key.as_str()), &value).map_err(js_error)?;
        let promise = storage_set(&items).map_err(js_error)?;

        let key = key.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!("Failed to persist {}: {:?}", key, e);
            }
        });
        Ok(())
    }
}
