//! Folder model: user-named groups of conversations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ConversationId;
use crate::error::FolderError;

/// A single folder's contents and display flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderRecord {
    /// Conversation ids in display order
    pub items: Vec<ConversationId>,
    /// Whether the folder is rendered collapsed
    pub collapsed: bool,
}

impl FolderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the items
    pub fn with_items<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ConversationId>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the collapsed flag
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.items.contains(id)
    }

    /// Position of `id` within the folder
    pub fn position(&self, id: &ConversationId) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }
}

/// The complete folder state for one user
///
/// Folders keep their creation order, which is also their display order.
/// A conversation id is listed in at most one folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderState {
    #[serde(default)]
    folders: IndexMap<String, FolderRecord>,
}

impl FolderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from records, dropping any id already claimed by an
    /// earlier folder
    pub fn from_folders(folders: IndexMap<String, FolderRecord>) -> Self {
        let mut state = Self { folders };
        state.enforce_exclusive();
        state
    }

    pub fn folders(&self) -> &IndexMap<String, FolderRecord> {
        &self.folders
    }

    pub fn get(&self, name: &str) -> Option<&FolderRecord> {
        self.folders.get(name)
    }

    pub fn contains_folder(&self, name: &str) -> bool {
        self.folders.contains_key(name)
    }

    /// Folder names in display order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.folders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Total number of filed conversations
    pub fn item_count(&self) -> usize {
        self.folders.values().map(|f| f.items.len()).sum()
    }

    /// Name of the folder holding `id`, if any
    pub fn folder_of(&self, id: &ConversationId) -> Option<&str> {
        self.folders
            .iter()
            .find(|(_, record)| record.contains(id))
            .map(|(name, _)| name.as_str())
    }

    /// Create an empty folder
    ///
    /// Surrounding whitespace is trimmed from the name. Returns the name the
    /// folder was stored under.
    pub fn create_folder(&mut self, name: &str) -> Result<String, FolderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FolderError::EmptyName);
        }
        if self.folders.contains_key(name) {
            return Err(FolderError::DuplicateName(name.to_string()));
        }
        self.folders.insert(name.to_string(), FolderRecord::new());
        Ok(name.to_string())
    }

    /// Remove a folder, handing back its record
    pub fn delete_folder(&mut self, name: &str) -> Result<FolderRecord, FolderError> {
        self.folders
            .shift_remove(name)
            .ok_or_else(|| FolderError::UnknownFolder(name.to_string()))
    }

    /// Move a conversation into `target`, removing it from every folder first
    ///
    /// Returns the folder it was previously filed under. Moving an id into
    /// the folder that already holds it sends it to the end of that folder.
    pub fn move_item(
        &mut self,
        id: &ConversationId,
        target: &str,
    ) -> Result<Option<String>, FolderError> {
        if !self.folders.contains_key(target) {
            return Err(FolderError::UnknownFolder(target.to_string()));
        }

        let previous = self.remove_item(id);
        if let Some(record) = self.folders.get_mut(target) {
            record.items.push(id.clone());
        }
        Ok(previous)
    }

    /// Unfile a conversation; returns the folder it was removed from
    pub fn remove_item(&mut self, id: &ConversationId) -> Option<String> {
        let mut previous = None;
        for (name, record) in self.folders.iter_mut() {
            let before = record.items.len();
            record.items.retain(|item| item != id);
            if record.items.len() != before && previous.is_none() {
                previous = Some(name.clone());
            }
        }
        previous
    }

    /// Set a folder's collapsed flag; returns whether the flag changed
    pub fn set_collapsed(&mut self, name: &str, collapsed: bool) -> Result<bool, FolderError> {
        let record = self
            .folders
            .get_mut(name)
            .ok_or_else(|| FolderError::UnknownFolder(name.to_string()))?;
        let changed = record.collapsed != collapsed;
        record.collapsed = collapsed;
        Ok(changed)
    }

    /// Drop repeated ids so each conversation is filed at most once
    ///
    /// The first occurrence in folder order wins. Returns how many entries
    /// were dropped.
    pub fn enforce_exclusive(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for record in self.folders.values_mut() {
            let before = record.items.len();
            record.items.retain(|item| seen.insert(item.clone()));
            dropped += before - record.items.len();
        }
        dropped
    }
}
