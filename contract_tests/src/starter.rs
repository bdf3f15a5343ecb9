//! Module `starter` contract tests
//!
//! Node names and record shapes are what a manager's NETCONF requests are
//! written against; they must match the YANG module exactly.

// ===== Module Identity =====
pub const MODULE: &str = "starter";
pub const REVISION: &str = "2013-03-13";
pub const NAMESPACE: &str = "http://csikor.tmit.bme.hu/netconf/unify/starter";

// ===== Contract Tests =====
