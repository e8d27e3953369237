//! Storage trait definitions

use anyhow::Result;
use serde_json::Value;

use crate::identity::StorageKey;

/// Key-value persistence for folder state
///
/// Reads are awaited once at startup. Writes are fire-and-forget: `persist`
/// queues the write and returns; a failure that only surfaces after the
/// write completes is the implementation's to report.
#[allow(async_fn_in_trait)]
pub trait StateStorage {
    /// Fetch the value stored under `key`, if any
    async fn load(&self, key: &StorageKey) -> Result<Option<Value>>;

    /// Queue a write of `value` under `key`
    fn persist(&self, key: &StorageKey, value: Value) -> Result<()>;
}
