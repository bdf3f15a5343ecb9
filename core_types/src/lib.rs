//! # Core Types
//!
//! Value types shared by every crate of the schema binding workspace.
//!
//! ## Philosophy
//!
//! - **Owned, never aliased**: textual leaf values are [`XmlString`]s and
//!   every copy into a new owner duplicates the data.
//! - **Typed identity**: modules are addressed by [`ModuleIdentity`]
//!   (name + revision), not by loose strings.
//! - **One status vocabulary**: every failure that crosses into the agent
//!   is expressed as a [`Status`].
//!
//! ## Key Types
//!
//! - [`XmlString`]: XML-safe owned text
//! - [`ModuleIdentity`] / [`Revision`]: compiled identity of a schema module
//! - [`Status`]: agent-facing status code
//! - [`ModuleInstanceId`], [`SubscriberId`]: unique runtime identifiers

pub mod identity;
pub mod ids;
pub mod status;
pub mod xml_string;

pub use identity::{ModuleIdentity, Revision, RevisionError};
pub use ids::{ModuleInstanceId, SubscriberId};
pub use status::Status;
pub use xml_string::{XmlString, XmlStringError};
