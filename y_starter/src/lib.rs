//! # starter
//!
//! Binding of YANG module `starter`, revision `2013-03-13`
//! (namespace `http://csikor.tmit.bme.hu/netconf/unify/starter`,
//! organization BME-TMIT).
//!
//! The module lets a manager start Click-based VNFs on the host, stop them,
//! list them and read the host load. Process lifecycle events are reported
//! with the `processData` and `processDone` notifications.
//!
//! ```text
//! container /starter           appName, appParams, capabilities*
//! rpc starter_start-vnf        port, clickDescription -> vnfID
//! rpc starter_kill-vnf         vnfID -> success
//! rpc starter_get-load         -> load[loadOne, loadFive, loadFifteen,
//!                                      processesCurrentlyExists, pid]
//! rpc starter_get-processes    -> processes
//! notification processData     processName, processID
//! notification processDone     processStatus, etc
//! ```

pub mod identifiers;
pub mod load;
pub mod model;
pub mod module;
pub mod notifications;
pub mod operations;
pub mod vnf;

pub use identifiers::IDENTIFIERS;
pub use model::Starter;
pub use module::StarterModule;

use core_types::{ModuleIdentity, Revision};

pub const MODULE_NAME: &str = identifiers::M_STARTER;
pub const REVISION: &str = identifiers::R_STARTER;
pub const NAMESPACE: &str = "http://csikor.tmit.bme.hu/netconf/unify/starter";

/// Compiled identity of the module
pub fn identity() -> ModuleIdentity {
    let revision = Revision::parse(REVISION)
        .unwrap_or_else(|e| panic!("compiled revision of {} is malformed: {}", MODULE_NAME, e));
    ModuleIdentity::new(MODULE_NAME, revision)
}
