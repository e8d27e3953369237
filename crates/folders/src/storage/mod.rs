//! Storage traits and implementations
//!
//! This module defines the persistence abstraction for folder state. The
//! browser shell implements it over extension storage; the in-memory
//! implementation backs tests.

mod memory;
mod traits;

pub use memory::InMemoryStateStorage;
pub use traits::StateStorage;
