//! Error types for folder operations

/// Rejections surfaced to the user
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    #[error("Folder name cannot be empty")]
    EmptyName,

    #[error("A folder named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("No folder named \"{0}\"")]
    UnknownFolder(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unrecognized folder state: {0}")]
    UnrecognizedShape(String),
}
