//! # Schema Binding Layer
//!
//! Building blocks a compiled schema module is made of, and the contract
//! through which an agent hosts it.
//!
//! ## Philosophy
//!
//! - **Single owner**: containers own their leaves and lists outright; the
//!   one root container lives inside the module, never in a global
//! - **Fixed shapes**: every operation has an input and an output record,
//!   even when the schema declares neither
//! - **Fire-and-forget events**: notification emitters hand records to the
//!   agent and keep nothing
//! - **Strict lifecycle**: `init`, `init2`, `cleanup`, each exactly once
//!
//! ## Key Types
//!
//! - [`IdentifierTable`]: schema node name constants
//! - [`OrderedList`]: insertion-ordered list field
//! - [`Container`] / [`Dispose`]: schema containers and recursive release
//! - [`Operation`] / [`OperationRecord`]: RPC input/output pairs
//! - [`Notification`] / [`NotificationEmitter`]: event records and delivery
//! - [`SchemaModule`] / [`ModuleCore`]: the per-module lifecycle contract

pub mod error;
pub mod identifier;
pub mod list;
pub mod module;
pub mod notification;
pub mod operation;

pub use error::BindingError;
pub use identifier::{IdentifierTable, UNKNOWN_IDENTIFIER};
pub use list::{Dispose, OrderedList};
pub use module::{AgentServices, Container, ModuleCore, SchemaModule};
pub use notification::{Notification, NotificationEmitter};
pub use operation::{
    invoke_operation, EmptyInput, EmptyOutput, Operation, OperationError, OperationRecord,
};

pub use core_types::{ModuleIdentity, Status, XmlString};
pub use lifecycle::LifecycleState;

/// A scalar leaf: `None` when unset, which is distinct from an empty value
pub type Leaf<T> = Option<T>;

/// A leaf-list: ordered scalar values
pub type LeafList<T> = OrderedList<T>;
