//! Last-write-wins resolution between the local snapshot and one received
//! from the remote.

use crate::core::model::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Install the remote snapshot wholesale and persist it locally.
    AcceptRemote,
    /// The local snapshot stands; the inbound one is dropped.
    KeepLocal,
}

/// Decides which snapshot survives. Last write wins on `last_modified`,
/// with one guard: a remote that reads newer on the clock but is identical
/// in content is this device's own push echoing back, and adopting it would
/// re-persist and re-propagate the same data forever.
pub fn reconcile(local: Option<&AppState>, remote: &AppState) -> Reconciliation {
    let Some(local) = local else {
        return Reconciliation::AcceptRemote;
    };

    let remote_is_newer = match (remote.last_modified, local.last_modified) {
        (Some(remote_stamp), Some(local_stamp)) => remote_stamp > local_stamp,
        (Some(_), None) => true,
        (None, _) => false,
    };

    if remote_is_newer && !local.content_eq(remote) {
        Reconciliation::AcceptRemote
    } else {
        Reconciliation::KeepLocal
    }
}
