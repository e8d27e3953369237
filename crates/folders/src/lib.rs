//! Folders crate - Business logic for grouping chat conversations
//!
//! This crate provides platform-independent folder functionality including:
//! - Domain models (FolderState, FolderRecord, ConversationId)
//! - Per-user storage key resolution
//! - Storage trait abstraction with migration of older persisted shapes
//! - Idempotent placement of rendered conversations into folders
//! - Change observation driving re-placement
//! - Search-to-add over loaded conversation titles
//! - JSON import/export
//! - A controller tying user actions to state, persistence and the page
//!
//! This crate has zero browser dependencies; the content script implements
//! the [`HostList`], [`StateStorage`] and [`Dialogs`] traits over the DOM.

pub mod controller;
pub mod dialogs;
pub mod error;
pub mod host;
pub mod identity;
pub mod migration;
pub mod models;
pub mod observer;
pub mod search;
pub mod settings;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transfer;

pub use controller::{FolderController, INVALID_IMPORT_MESSAGE, NEW_FOLDER_PROMPT};
pub use dialogs::{Dialogs, ScriptedDialogs};
pub use error::FolderError;
pub use host::{EntryHandle, FolderView, HostList, InMemoryHostList};
pub use identity::{PageSnapshot, StorageKey, resolve_storage_key};
pub use migration::{Migrated, migrate};
pub use models::{ConversationId, FolderRecord, FolderState};
pub use observer::attach_observer;
pub use search::{SEARCH_HELP, SearchHit, normalize, search_loaded};
pub use settings::{FolderSettings, SETTINGS_STORAGE_KEY};
pub use storage::{InMemoryStateStorage, StateStorage};
pub use store::FolderStore;
pub use sync::{PlacementReport, entry_id, find_entry, place_all, place_entry};
pub use transfer::{ExportFile, export_json, import_json};
