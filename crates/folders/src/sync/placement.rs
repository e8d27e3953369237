//! Placement of rendered conversations into folder containers

use log::debug;
use std::collections::HashMap;

use crate::host::HostList;
use crate::models::{ConversationId, FolderState};

/// Outcome of a placement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Unfiled entries examined
    pub scanned: usize,
    /// Entries moved into a folder container
    pub moved: usize,
    /// Entries without a parseable conversation id
    pub unidentified: usize,
}

/// Parse the conversation id of a rendered entry
pub fn entry_id<H: HostList>(host: &H, entry: &H::Entry, marker: &str) -> Option<ConversationId> {
    let href = host.link_href(entry)?;
    ConversationId::from_href(&href, marker)
}

/// Move every unfiled entry that belongs to a folder into that folder
///
/// Unfiled entries are made draggable on the way. Entries already inside
/// folder containers are not looked at, so a second pass over an unchanged
/// page moves nothing.
pub fn place_all<H: HostList>(host: &H, state: &FolderState, marker: &str) -> PlacementReport {
    let mut report = PlacementReport::default();
    if !host.is_ready() {
        return report;
    }

    for entry in host.unfiled_entries() {
        report.scanned += 1;
        let Some(id) = entry_id(host, &entry, marker) else {
            report.unidentified += 1;
            continue;
        };
        host.make_draggable(&entry, &id);

        let Some(folder) = state.folder_of(&id) else {
            continue;
        };
        if place_entry(host, state, &entry, &id, folder, marker) {
            report.moved += 1;
        }
    }

    if report.moved > 0 {
        debug!(
            "Placement pass moved {} of {} entries ({} unidentified)",
            report.moved, report.scanned, report.unidentified
        );
    }
    report
}

/// Move one entry into `folder`, keeping the folder's stored order
///
/// The entry goes in front of the first conversation stored after it that
/// is already rendered in the folder, or at the end if there is none.
pub fn place_entry<H: HostList>(
    host: &H,
    state: &FolderState,
    entry: &H::Entry,
    id: &ConversationId,
    folder: &str,
    marker: &str,
) -> bool {
    let anchor = state.get(folder).and_then(|record| {
        let position = record.position(id)?;
        let mut rendered: HashMap<ConversationId, H::Entry> = host
            .folder_entries(folder)
            .into_iter()
            .filter_map(|e| entry_id(host, &e, marker).map(|rid| (rid, e)))
            .collect();
        rendered.remove(id);
        record.items[position + 1..]
            .iter()
            .find_map(|later| rendered.remove(later))
    });

    host.move_into_folder(entry, folder, anchor.as_ref())
}

/// Find the rendered entry for a conversation, wherever it sits
pub fn find_entry<H: HostList>(host: &H, id: &ConversationId, marker: &str) -> Option<H::Entry> {
    host.all_entries()
        .into_iter()
        .find(|entry| entry_id(host, entry, marker).as_ref() == Some(id))
}
