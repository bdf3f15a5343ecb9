//! # Reference Agent
//!
//! Hosts compiled schema modules and speaks newline-delimited JSON.
//!
//! ## Philosophy
//!
//! - **Agent owns I/O**: modules never read stdin or write stdout
//! - **Modules are driven, not running**: lifecycle, dispatch and polling
//!   all happen from one loop, one call at a time
//! - **Notifications are queued**: emitters never wait for subscribers
//!
//! ## Responsibilities
//!
//! The agent:
//! - Loads modules from the built-in registry by name and revision
//! - Feeds persisted startup configuration between `init` and `init2`
//! - Routes `rpc.request` envelopes to the owning module and answers with
//!   correlated `rpc.reply` envelopes
//! - Distributes `notification.event` envelopes to subscribers
//! - Cleans modules up on shutdown
//!
//! ## Non-Responsibilities
//!
//! The agent does NOT:
//! - Implement the NETCONF wire protocol or sessions
//! - Persist running configuration back to disk
//! - Lock datastores

pub mod catalog;
pub mod config;
pub mod runtime;
pub mod subscriptions;

pub use catalog::OperationCatalog;
pub use config::{ConfigError, HostConfig, ModuleSpec, StartupConfig};
pub use runtime::{builtin_registry, HostError, HostRuntime};
pub use subscriptions::{EventFilter, SubscriptionManager};
