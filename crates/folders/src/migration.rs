//! Upgrading persisted folder state to the current shape
//!
//! Two shapes are understood:
//!
//! ```text
//! current: {"folders": {"Work": {"items": ["a", "b"], "collapsed": true}}}
//! legacy:  {"folders": {"Work": ["a", "b"]}, "collapsed": {"Work": true}}
//! ```
//!
//! Mixed documents (some folders already records, some plain arrays) are
//! accepted too. The legacy `collapsed` map only applies to array entries;
//! record entries keep their own flag.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::FolderError;
use crate::models::{ConversationId, FolderRecord, FolderState};

/// Result of migrating a persisted document
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub state: FolderState,
    /// True when the document had to be rewritten and should be persisted
    pub upgraded: bool,
}

#[derive(Deserialize)]
struct PersistedState {
    #[serde(default)]
    folders: Option<IndexMap<String, PersistedFolder>>,
    #[serde(default)]
    collapsed: Option<IndexMap<String, Option<bool>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedFolder {
    Legacy(Vec<ConversationId>),
    Record(FolderRecord),
}

/// Migrate a persisted or imported JSON value into a [`FolderState`]
///
/// `null` yields an empty state. Anything that is neither the current nor
/// the legacy shape is rejected with [`FolderError::UnrecognizedShape`].
pub fn migrate(value: Value) -> Result<Migrated, FolderError> {
    if value.is_null() {
        return Ok(Migrated {
            state: FolderState::new(),
            upgraded: false,
        });
    }
    if !value.is_object() {
        return Err(FolderError::UnrecognizedShape(format!(
            "expected an object, found {}",
            json_kind(&value)
        )));
    }

    let persisted: PersistedState = serde_json::from_value(value)
        .map_err(|e| FolderError::UnrecognizedShape(e.to_string()))?;

    let legacy_collapsed = persisted.collapsed.unwrap_or_default();
    let mut upgraded = !legacy_collapsed.is_empty();

    let mut folders = IndexMap::new();
    for (name, folder) in persisted.folders.unwrap_or_default() {
        let record = match folder {
            PersistedFolder::Record(record) => record,
            PersistedFolder::Legacy(items) => {
                upgraded = true;
                let collapsed = legacy_collapsed.get(&name).copied().flatten().unwrap_or(false);
                FolderRecord { items, collapsed }
            }
        };
        folders.insert(name, record);
    }

    let total_before: usize = folders.values().map(|f: &FolderRecord| f.items.len()).sum();
    let state = FolderState::from_folders(folders);
    let dropped = total_before - state.item_count();
    if dropped > 0 {
        warn!("Dropped {} duplicate conversation entries while loading folders", dropped);
        upgraded = true;
    }

    if upgraded {
        debug!("Migrated folder state ({} folders)", state.len());
    }

    Ok(Migrated { state, upgraded })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(items: &[&str]) -> Vec<ConversationId> {
        items.iter().map(|s| ConversationId::new(*s)).collect()
    }

    #[test]
    fn test_legacy_shape() {
        let migrated = migrate(json!({
            "folders": {"A": ["x", "y"]},
            "collapsed": {"A": true}
        }))
        .unwrap();

        assert!(migrated.upgraded);
        let record = migrated.state.get("A").unwrap();
        assert_eq!(record.items, ids(&["x", "y"]));
        assert!(record.collapsed);
        assert_eq!(
            serde_json::to_value(&migrated.state).unwrap(),
            json!({"folders": {"A": {"items": ["x", "y"], "collapsed": true}}})
        );
    }

    #[test]
    fn test_legacy_without_collapsed_map() {
        let migrated = migrate(json!({"folders": {"A": ["x"], "B": []}})).unwrap();
        assert!(migrated.upgraded);
        assert!(!migrated.state.get("A").unwrap().collapsed);
        assert_eq!(migrated.state.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_current_shape_is_not_upgraded() {
        let migrated = migrate(json!({
            "folders": {"A": {"items": ["x"], "collapsed": false}}
        }))
        .unwrap();
        assert!(!migrated.upgraded);
        assert_eq!(migrated.state.get("A").unwrap().items, ids(&["x"]));
    }

    #[test]
    fn test_record_with_missing_fields() {
        let migrated = migrate(json!({"folders": {"A": {}}})).unwrap();
        let record = migrated.state.get("A").unwrap();
        assert!(record.items.is_empty());
        assert!(!record.collapsed);
    }

    #[test]
    fn test_mixed_shape_keeps_record_flag() {
        let migrated = migrate(json!({
            "folders": {
                "A": ["x"],
                "B": {"items": ["y"], "collapsed": false}
            },
            "collapsed": {"A": true, "B": true}
        }))
        .unwrap();

        assert!(migrated.upgraded);
        assert!(migrated.state.get("A").unwrap().collapsed);
        assert!(!migrated.state.get("B").unwrap().collapsed);
    }

    #[test]
    fn test_duplicates_across_folders_are_dropped() {
        let migrated = migrate(json!({
            "folders": {
                "A": {"items": ["x", "y"], "collapsed": false},
                "B": {"items": ["x", "z"], "collapsed": false}
            }
        }))
        .unwrap();

        assert!(migrated.upgraded);
        assert_eq!(migrated.state.folder_of(&ConversationId::new("x")), Some("A"));
        assert_eq!(migrated.state.get("B").unwrap().items, ids(&["z"]));
    }

    #[test]
    fn test_null_and_empty() {
        assert!(migrate(Value::Null).unwrap().state.is_empty());
        let migrated = migrate(json!({})).unwrap();
        assert!(migrated.state.is_empty());
        assert!(!migrated.upgraded);
    }

    #[test]
    fn test_rejects_unrecognized_shapes() {
        assert!(matches!(
            migrate(json!([1, 2, 3])),
            Err(FolderError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            migrate(json!({"folders": {"A": 42}})),
            Err(FolderError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            migrate(json!({"folders": {"A": [1, 2]}})),
            Err(FolderError::UnrecognizedShape(_))
        ));
    }
}
