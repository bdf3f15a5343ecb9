//! Unique identifiers for runtime entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one loaded module instance
///
/// A module identity is loaded at most once per agent process; the
/// instance id tells successive loads apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleInstanceId(Uuid);

impl ModuleInstanceId {
    /// Creates a new random instance ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModuleInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModuleInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({})", self.0)
    }
}

/// Unique identifier for a notification subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Creates a new random subscriber ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscriber({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_instance_id_creation() {
        let id1 = ModuleInstanceId::new();
        let id2 = ModuleInstanceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_subscriber_id_creation() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_display_prefixes() {
        assert!(ModuleInstanceId::new().to_string().starts_with("Module("));
        assert!(SubscriberId::new().to_string().starts_with("Subscriber("));
    }
}
