//! Notification port
//!
//! Defines how the turn loop reports progress to front-ends: worker
//! status changes, committed messages and system notices.

use huddle_domain::{GroupId, Message, WorkerId, WorkerStatus};

/// Observer for turn loop events
///
/// Calls are synchronous and must not block; implementations live in the
/// presentation layer (console, websocket, ...).
pub trait NotificationSink: Send + Sync {
    /// A worker's status changed.
    fn emit_status(&self, group_id: &GroupId, worker_id: &WorkerId, status: WorkerStatus);

    /// A message was committed to the log.
    fn emit_message(&self, message: &Message);

    /// A system notice for the group (failures, chain limit).
    fn emit_system(&self, group_id: &GroupId, text: &str);
}

/// No-op sink for when nobody is listening
pub struct NoNotifications;

impl NotificationSink for NoNotifications {
    fn emit_status(&self, _group_id: &GroupId, _worker_id: &WorkerId, _status: WorkerStatus) {}
    fn emit_message(&self, _message: &Message) {}
    fn emit_system(&self, _group_id: &GroupId, _text: &str) {}
}
