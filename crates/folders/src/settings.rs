//! Settings for the folders content script
//!
//! Loaded from (in order of increasing priority):
//! 1. Built-in defaults matching the host page's current markup
//! 2. Compile-time embedded JSON (`CONVERSATION_FOLDERS_SETTINGS`)
//! 3. Runtime overrides (the shell reads them from extension storage)

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Extension storage key holding runtime setting overrides
pub const SETTINGS_STORAGE_KEY: &str = "conversation_folders_settings";

/// Selectors, storage naming and startup behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderSettings {
    /// Host element holding the conversation entries
    pub container_selector: String,
    /// A single conversation entry (direct child of the container)
    pub item_selector: String,
    /// Title element inside an entry; the link text is used when absent
    pub title_selector: String,
    /// Element whose `aria-label` names the signed-in account
    pub account_selector: String,
    /// Path marker preceding the conversation id in entry links
    pub id_path_marker: String,
    /// Storage key prefix; the resolved per-user key extends it
    pub storage_key_base: String,
    /// Filename offered for exports
    pub export_filename: String,
    /// Delay before the first pass so the host can paint its list
    pub startup_delay_ms: u32,
    /// Maximum log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for FolderSettings {
    fn default() -> Self {
        Self {
            container_selector: ".conversations-container".to_string(),
            item_selector: ".conversation-items-container".to_string(),
            title_selector: ".conversation-title".to_string(),
            account_selector: "a[aria-label*=\"@\"]".to_string(),
            id_path_marker: "/app/".to_string(),
            storage_key_base: "gemini_conversation_groups".to_string(),
            export_filename: "gemini_conversation_groups.json".to_string(),
            startup_delay_ms: 1000,
            log_level: "info".to_string(),
        }
    }
}

impl FolderSettings {
    /// Load settings, applying embedded and runtime overrides to the defaults
    pub fn load(runtime_overrides: Option<&str>) -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(embedded) = Self::from_compile_time() {
            layers.push(("compile-time settings", embedded));
        }
        if let Some(overrides) = runtime_overrides {
            layers.push(("extension storage", overrides));
        }
        config::load_layered(&layers)
    }

    /// Settings JSON embedded at build time.
    /// Build with: CONVERSATION_FOLDERS_SETTINGS='{"startup_delay_ms": 0}' cargo build
    pub fn from_compile_time() -> Option<&'static str> {
        option_env!("CONVERSATION_FOLDERS_SETTINGS").filter(|s| !s.trim().is_empty())
    }

    /// Parsed log level, falling back to `Info`
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
