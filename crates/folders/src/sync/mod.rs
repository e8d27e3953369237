//! DOM synchronization
//!
//! Reconciles folder state with the rendered conversation list: initial
//! placement, re-placement after the host re-renders, and single moves.

mod placement;

pub use placement::{PlacementReport, entry_id, find_entry, place_all, place_entry};
