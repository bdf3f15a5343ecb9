//! # Agent Contract Tests
//!
//! "Golden" tests for everything a manager or an agent relies on, so the
//! wire-visible surface does not drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: contracts are written out as literals
//! - **Testability first**: a renamed node or action fails a test here
//!   before it breaks a manager
//! - **Mechanism not policy**: pin what must be stable, not how it is used
//!
//! ## Structure
//!
//! - `rpc`: envelope actions, schema version, request/reply/event fields,
//!   status codes
//! - `starter`: node names, operation and notification record shapes of
//!   module `starter`

pub mod rpc;
pub mod starter;

/// Common test helpers for contract validation
pub mod test_helpers {
    use ipc::{MessageEnvelope, SchemaVersion};
    use serde_json::Value;

    /// Verifies an envelope has the expected action and version
    pub fn verify_envelope_contract(
        envelope: &MessageEnvelope,
        expected_action: &str,
        expected_version: SchemaVersion,
    ) {
        assert_eq!(
            envelope.action, expected_action,
            "Action identifier changed: expected '{}', got '{}'",
            expected_action, envelope.action
        );
        assert_eq!(
            envelope.schema_version, expected_version,
            "Schema version changed: expected {}, got {}",
            expected_version, envelope.schema_version
        );
    }

    /// Verifies schema version stays within major version
    pub fn verify_major_version(envelope: &MessageEnvelope, expected_major: u32) {
        assert_eq!(
            envelope.schema_version.major, expected_major,
            "Major version changed (breaking change): expected {}, got {}",
            expected_major, envelope.schema_version.major
        );
    }

    /// Verifies a JSON object has exactly the given keys
    pub fn verify_keys(value: &Value, expected: &[&str]) {
        let mut keys: Vec<&str> = value
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        let mut expected = expected.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected, "Payload field names changed");
    }
}
