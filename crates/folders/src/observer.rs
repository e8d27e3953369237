//! Re-placement when the host inserts conversations
//!
//! The host renders its list lazily and re-renders it at will. Every batch
//! of insertions into the list container triggers a full placement pass;
//! placement is idempotent, so redundant passes only cost a scan.

use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

use crate::controller::FolderController;
use crate::dialogs::Dialogs;
use crate::host::HostList;
use crate::storage::StateStorage;

/// Subscribe the controller to insertions into the conversation list
///
/// The subscription only holds a weak reference, so dropping the
/// controller ends re-placement. Returns `None` when the list container is
/// not on the page.
pub fn attach_observer<H, S, D>(
    controller: &Rc<RefCell<FolderController<H, S, D>>>,
) -> Option<H::Subscription>
where
    H: HostList + 'static,
    S: StateStorage + 'static,
    D: Dialogs + 'static,
{
    let host = controller.borrow().host().clone();
    let weak = Rc::downgrade(controller);

    host.subscribe_insertions(Box::new(move |added| {
        if added == 0 {
            return;
        }
        let Some(controller) = weak.upgrade() else {
            return;
        };
        let Ok(controller) = controller.try_borrow() else {
            debug!("Controller busy; skipping placement for {} inserted nodes", added);
            return;
        };
        let report = controller.place_all();
        debug!(
            "Observed {} inserted nodes; placed {} conversations",
            added, report.moved
        );
    }))
}
