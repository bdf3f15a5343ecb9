//! Operation and notification catalog
//!
//! Records, for every hosted module, which operations it serves and which
//! notifications it may emit. Operation names are global: two modules
//! cannot serve the same operation.

use ipc::EventSender;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use yang_binding::{AgentServices, BindingError, ModuleIdentity};

/// The agent side of module registration
#[derive(Debug)]
pub struct OperationCatalog {
    operations: BTreeMap<String, ModuleIdentity>,
    notifications: BTreeMap<String, BTreeSet<String>>,
    sender: EventSender,
}

impl OperationCatalog {
    /// Creates an empty catalog handing out `sender` to emitters
    pub fn new(sender: EventSender) -> Self {
        Self {
            operations: BTreeMap::new(),
            notifications: BTreeMap::new(),
            sender,
        }
    }

    /// Returns the module serving `operation`
    pub fn resolve(&self, operation: &str) -> Option<&ModuleIdentity> {
        self.operations.get(operation)
    }

    /// Checks whether `module` declared `notification`
    pub fn declares_notification(&self, module: &str, notification: &str) -> bool {
        self.notifications
            .get(module)
            .is_some_and(|declared| declared.contains(notification))
    }

    /// Lists operations served by `module`
    pub fn operations_of(&self, module: &str) -> Vec<&str> {
        self.operations
            .iter()
            .filter(|(_, owner)| owner.name == module)
            .map(|(operation, _)| operation.as_str())
            .collect()
    }

    /// Number of registered operations
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

impl AgentServices for OperationCatalog {
    fn register_operation(
        &mut self,
        module: &ModuleIdentity,
        operation: &'static str,
    ) -> Result<(), BindingError> {
        if let Some(owner) = self.operations.get(operation) {
            return Err(BindingError::Registration {
                item: operation.to_string(),
                reason: format!("already served by {}", owner),
            });
        }
        debug!(module = %module, operation, "Operation registered");
        self.operations.insert(operation.to_string(), module.clone());
        Ok(())
    }

    fn register_notification(
        &mut self,
        module: &ModuleIdentity,
        notification: &'static str,
    ) -> Result<(), BindingError> {
        let declared = self.notifications.entry(module.name.clone()).or_default();
        if !declared.insert(notification.to_string()) {
            return Err(BindingError::Registration {
                item: notification.to_string(),
                reason: format!("declared twice by {}", module),
            });
        }
        debug!(module = %module, notification, "Notification registered");
        Ok(())
    }

    fn deregister_module(&mut self, module: &ModuleIdentity) {
        self.operations.retain(|_, owner| owner != module);
        self.notifications.remove(&module.name);
        debug!(module = %module, "Module deregistered");
    }

    fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Revision;
    use ipc::event_channel;

    fn identity(name: &str) -> ModuleIdentity {
        ModuleIdentity::new(name, Revision::parse("2013-03-13").unwrap())
    }

    fn catalog() -> OperationCatalog {
        let (sender, _receiver) = event_channel();
        OperationCatalog::new(sender)
    }

    #[test]
    fn test_register_and_resolve() {
        let mut catalog = catalog();
        let starter = identity("starter");
        catalog.register_operation(&starter, "starter_kill-vnf").unwrap();
        catalog.register_notification(&starter, "processDone").unwrap();

        assert_eq!(catalog.resolve("starter_kill-vnf"), Some(&starter));
        assert_eq!(catalog.resolve("starter_reboot"), None);
        assert!(catalog.declares_notification("starter", "processDone"));
        assert!(!catalog.declares_notification("starter", "processData"));
        assert_eq!(catalog.operations_of("starter"), vec!["starter_kill-vnf"]);
    }

    #[test]
    fn test_operation_names_are_exclusive() {
        let mut catalog = catalog();
        catalog
            .register_operation(&identity("starter"), "starter_kill-vnf")
            .unwrap();
        let err = catalog
            .register_operation(&identity("other"), "starter_kill-vnf")
            .unwrap_err();
        assert!(matches!(err, BindingError::Registration { .. }));
        assert_eq!(catalog.resolve("starter_kill-vnf").unwrap().name, "starter");
    }

    #[test]
    fn test_deregister_only_touches_module() {
        let mut catalog = catalog();
        let starter = identity("starter");
        let other = identity("other");
        catalog.register_operation(&starter, "starter_get-load").unwrap();
        catalog.register_operation(&other, "other_ping").unwrap();
        catalog.register_notification(&starter, "processData").unwrap();

        catalog.deregister_module(&starter);
        assert_eq!(catalog.operation_count(), 1);
        assert!(catalog.resolve("other_ping").is_some());
        assert!(!catalog.declares_notification("starter", "processData"));
    }
}
