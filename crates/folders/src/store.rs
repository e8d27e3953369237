//! Folder state store
//!
//! Owns the in-memory [`FolderState`] for one storage key and mirrors it to
//! a [`StateStorage`] after every mutation.

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;

use crate::error::FolderError;
use crate::identity::StorageKey;
use crate::migration::migrate;
use crate::models::{ConversationId, FolderRecord, FolderState};
use crate::storage::StateStorage;

/// In-memory folder state bound to its storage key
pub struct FolderStore<S> {
    storage: S,
    key: StorageKey,
    state: FolderState,
}

impl<S: StateStorage> FolderStore<S> {
    /// Create a store with an empty state
    pub fn new(storage: S, key: StorageKey) -> Self {
        Self {
            storage,
            key,
            state: FolderState::new(),
        }
    }

    /// Load the state persisted under `key`, migrating older shapes
    ///
    /// A missing value yields an empty state. A legacy value is rewritten
    /// and persisted once. A value that cannot be migrated is logged and
    /// replaced by an empty state; it stays in storage until the first
    /// mutation overwrites it.
    pub async fn load(storage: S, key: StorageKey) -> Result<Self> {
        Self::load_with_fallback(storage, key, None).await
    }

    /// Like [`FolderStore::load`], but adopt the value stored under
    /// `fallback` when `key` holds nothing
    ///
    /// Folders saved before per-account keys live under the base key. An
    /// adopted value is persisted under `key`; `fallback` is left as is.
    pub async fn load_with_fallback(
        storage: S,
        key: StorageKey,
        fallback: Option<&StorageKey>,
    ) -> Result<Self> {
        let mut value = read(&storage, &key).await?;
        let mut adopted = false;
        if value.is_none() {
            if let Some(fallback) = fallback.filter(|fallback| **fallback != key) {
                value = read(&storage, fallback).await?;
                if value.is_some() {
                    info!("Adopting folder state from {} for {}", fallback, key);
                    adopted = true;
                }
            }
        }

        let Some(value) = value else {
            info!("No folder state stored under {}", key);
            return Ok(Self::new(storage, key));
        };

        let migrated = match migrate(value) {
            Ok(migrated) => migrated,
            Err(e) => {
                warn!("Ignoring unreadable folder state for {}: {}", key, e);
                return Ok(Self::new(storage, key));
            }
        };

        let store = Self {
            storage,
            key,
            state: migrated.state,
        };
        if migrated.upgraded || adopted {
            info!("Saving upgraded folder state under {}", store.key);
            store.save();
        }
        info!("Loaded {} folders from {}", store.state.len(), store.key);
        Ok(store)
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn state(&self) -> &FolderState {
        &self.state
    }

    /// Persist the current state
    ///
    /// Fire-and-forget: failures are logged, never retried.
    pub fn save(&self) {
        let value = match serde_json::to_value(&self.state) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize folder state: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.persist(&self.key, value) {
            warn!("Failed to persist folder state under {}: {:#}", self.key, e);
        }
    }

    /// Replace the whole state, as an import does
    pub fn replace(&mut self, state: FolderState) {
        self.state = state;
        self.save();
    }

    pub fn create_folder(&mut self, name: &str) -> Result<String, FolderError> {
        let name = self.state.create_folder(name)?;
        info!("Created folder {}", name);
        self.save();
        Ok(name)
    }

    /// Remove a folder; its items become unfiled
    pub fn delete_folder(&mut self, name: &str) -> Result<FolderRecord, FolderError> {
        let record = self.state.delete_folder(name)?;
        info!("Deleted folder {} ({} conversations unfiled)", name, record.items.len());
        self.save();
        Ok(record)
    }

    /// File `id` under `target`, unfiling it from wherever it was
    pub fn move_item(&mut self, id: &ConversationId, target: &str) -> Result<(), FolderError> {
        let previous = self.state.move_item(id, target)?;
        match previous {
            Some(from) if from != target => info!("Moved {} from {} to {}", id, from, target),
            Some(_) => {}
            None => info!("Filed {} under {}", id, target),
        }
        self.save();
        Ok(())
    }

    /// Set the collapsed flag, persisting only when it changed
    pub fn set_collapsed(&mut self, name: &str, collapsed: bool) -> Result<bool, FolderError> {
        let changed = self.state.set_collapsed(name, collapsed)?;
        if changed {
            self.save();
        }
        Ok(changed)
    }
}

async fn read<S: StateStorage>(storage: &S, key: &StorageKey) -> Result<Option<Value>> {
    storage
        .load(key)
        .await
        .with_context(|| format!("Failed to read folder state for {}", key))
}
