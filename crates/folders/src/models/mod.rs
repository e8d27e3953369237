//! Domain models for folders and conversations

mod conversation;
mod folder;

pub use conversation::ConversationId;
pub use folder::{FolderRecord, FolderState};
