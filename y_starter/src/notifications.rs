//! Notifications of module `starter`

use crate::identifiers::{N_PROCESS_DATA, N_PROCESS_DONE};
use serde::Serialize;
use yang_binding::{Leaf, Notification, NotificationEmitter, XmlString};

/// notification /processData
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Leaf<XmlString>,
    #[serde(rename = "processID")]
    pub process_id: i32,
}

impl Notification for ProcessData {
    const NAME: &'static str = N_PROCESS_DATA;
}

/// notification /processDone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_status: Leaf<XmlString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etc: Leaf<XmlString>,
}

impl Notification for ProcessDone {
    const NAME: &'static str = N_PROCESS_DONE;
}

/// Sends a `processData` notification
pub fn send_process_data(
    emitter: &NotificationEmitter,
    process_name: Option<&XmlString>,
    process_id: i32,
) {
    emitter.emit(ProcessData {
        process_name: process_name.cloned(),
        process_id,
    });
}

/// Sends a `processDone` notification
pub fn send_process_done(
    emitter: &NotificationEmitter,
    process_status: Option<&XmlString>,
    etc: Option<&XmlString>,
) {
    emitter.emit(ProcessDone {
        process_status: process_status.cloned(),
        etc: etc.cloned(),
    });
}
