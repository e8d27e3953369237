//! JSON import and export of folder state

use serde_json::Value;

use crate::error::FolderError;
use crate::migration::migrate;
use crate::models::FolderState;

/// A file ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

impl ExportFile {
    pub const MIME_TYPE: &'static str = "application/json";
}

/// Serialize the state as pretty-printed JSON
pub fn export_json(state: &FolderState) -> Result<String, FolderError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse an exported (or legacy) document into a state
pub fn import_json(text: &str) -> Result<FolderState, FolderError> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_null() {
        return Err(FolderError::UnrecognizedShape("document is null".to_string()));
    }
    Ok(migrate(value)?.state)
}
