//! Host page abstraction
//!
//! The conversation list belongs to a page this crate does not control.
//! [`HostList`] is the narrow surface the synchronizer and controller need
//! from it; the browser shell implements it over the DOM and
//! [`InMemoryHostList`] models it for tests.

mod memory;
mod traits;

pub use memory::{EntryHandle, InMemoryHostList, SubscriptionId};
pub use traits::{FolderView, HostList};
