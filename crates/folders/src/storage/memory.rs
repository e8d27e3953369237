//! In-memory storage implementation
//!
//! Used for testing and for running the controller outside a browser.
//! Clones share the same underlying map, the way every tab of a browser
//! profile sees the same extension storage.

use anyhow::{Result, bail};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::StateStorage;
use crate::identity::StorageKey;

#[derive(Default)]
struct Inner {
    values: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

/// In-memory implementation of StateStorage
#[derive(Clone, Default)]
pub struct InMemoryStateStorage {
    inner: Rc<Inner>,
}

impl InMemoryStateStorage {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, as if written by an earlier session
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.inner.values.borrow_mut().insert(key.into(), value);
    }

    /// Current value under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.values.borrow().get(key).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.inner.writes.get()
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl StateStorage for InMemoryStateStorage {
    async fn load(&self, key: &StorageKey) -> Result<Option<Value>> {
        Ok(self.get(key.as_str()))
    }

    fn persist(&self, key: &StorageKey, value: Value) -> Result<()> {
        if self.inner.fail_writes.get() {
            bail!("storage quota exceeded writing {}", key);
        }
        self.inner
            .values
            .borrow_mut()
            .insert(key.as_str().to_string(), value);
        self.inner.writes.set(self.inner.writes.get() + 1);
        Ok(())
    }
}
