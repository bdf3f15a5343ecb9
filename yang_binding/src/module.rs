//! The per-module lifecycle contract
//!
//! [`SchemaModule`] is what the agent sees of a compiled module: three
//! lifecycle phases, a configuration hand-off between the first two, and
//! one dispatch entry point for the module's operations. [`ModuleCore`]
//! is the plumbing every module shares: it owns the root container, the
//! lifecycle controller and the notification emitter, and performs (and
//! rolls back) the registrations with the agent.

use crate::list::Dispose;
use crate::notification::NotificationEmitter;
use crate::operation::OperationError;
use crate::BindingError;
use core_types::ModuleIdentity;
use ipc::{EventSender, MessagePayload};
use lifecycle::{LifecycleController, LifecycleError, LifecycleState, LifecycleWatch};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a module needs from its hosting agent
pub trait AgentServices {
    /// Makes `operation` dispatchable to `module`
    fn register_operation(
        &mut self,
        module: &ModuleIdentity,
        operation: &'static str,
    ) -> Result<(), BindingError>;

    /// Declares that `module` may emit `notification`
    fn register_notification(
        &mut self,
        module: &ModuleIdentity,
        notification: &'static str,
    ) -> Result<(), BindingError>;

    /// Drops every registration made for `module`
    fn deregister_module(&mut self, module: &ModuleIdentity);

    /// Returns a sender into the agent's notification fan-out
    fn event_sender(&self) -> EventSender;
}

/// A schema container node with value semantics
pub trait Container: Default + Serialize + DeserializeOwned + Dispose + Send {
    /// Schema path of the container (e.g. `/starter`)
    const PATH: &'static str;
}

/// A compiled schema module, as driven by the agent
///
/// The agent calls `init`, then (optionally) `load_startup_config`, then
/// `init2`, dispatches operations through `invoke` while the module is
/// running, and finally calls `cleanup`. All calls come from one execution
/// context; handlers are never invoked concurrently.
pub trait SchemaModule: Send {
    /// Compiled name and revision
    fn identity(&self) -> &ModuleIdentity;

    /// Current lifecycle state
    fn state(&self) -> LifecycleState;

    /// Phase 1: identity check, root allocation, registration
    fn init(
        &mut self,
        name: &str,
        revision: Option<&str>,
        agent: &mut dyn AgentServices,
    ) -> Result<(), BindingError>;

    /// Replaces the root container with persisted configuration
    ///
    /// Only valid between `init` and `init2`.
    fn load_startup_config(&mut self, config: &MessagePayload) -> Result<(), BindingError>;

    /// Phase 2: non-configuration startup
    fn init2(&mut self) -> Result<(), BindingError>;

    /// Runs the handler of `operation` on `input`
    fn invoke(
        &mut self,
        operation: &str,
        input: &MessagePayload,
    ) -> Result<MessagePayload, OperationError>;

    /// Periodic bookkeeping hook, called by the agent while running
    fn poll(&mut self) {}

    /// Teardown: release the root container, deregister
    fn cleanup(&mut self, agent: &mut dyn AgentServices);
}

/// Lifecycle plumbing shared by every module
#[derive(Debug)]
pub struct ModuleCore<R> {
    lifecycle: LifecycleController,
    root: Option<R>,
    emitter: Option<NotificationEmitter>,
    operations: &'static [&'static str],
    notifications: &'static [&'static str],
}

impl<R: Container> ModuleCore<R> {
    /// Creates the core of a module declaring `operations` and `notifications`
    pub fn new(
        identity: ModuleIdentity,
        operations: &'static [&'static str],
        notifications: &'static [&'static str],
    ) -> Self {
        Self {
            lifecycle: LifecycleController::new(identity),
            root: None,
            emitter: None,
            operations,
            notifications,
        }
    }

    pub fn identity(&self) -> &ModuleIdentity {
        self.lifecycle.identity()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn watch(&self) -> LifecycleWatch {
        self.lifecycle.watch()
    }

    /// Declared operation names
    pub fn operations(&self) -> &'static [&'static str] {
        self.operations
    }

    /// Declared notification names
    pub fn notifications(&self) -> &'static [&'static str] {
        self.notifications
    }

    /// Phase 1
    ///
    /// Registers every operation and notification, allocates an empty root
    /// container and the emitter. If any registration fails, the ones made
    /// so far are withdrawn and the module stays `UNINITIALIZED`.
    pub fn init(
        &mut self,
        name: &str,
        revision: Option<&str>,
        agent: &mut dyn AgentServices,
    ) -> Result<(), BindingError> {
        let identity = self.lifecycle.identity().clone();
        let watch = self.lifecycle.watch();
        let operations = self.operations;
        let notifications = self.notifications;
        let root = &mut self.root;
        let emitter = &mut self.emitter;

        self.lifecycle.init(name, revision, || {
            if let Err(e) = register_all(&mut *agent, &identity, operations, notifications) {
                agent.deregister_module(&identity);
                return Err(e);
            }
            *emitter = Some(NotificationEmitter::new(
                identity.name.clone(),
                agent.event_sender(),
                watch,
            ));
            *root = Some(R::default());
            info!(module = %identity, root = R::PATH, "Root container allocated");
            Ok(())
        })
    }

    /// Replaces the root container with `config`
    ///
    /// On a decoding failure the current root is kept.
    ///
    /// # Panics
    ///
    /// Unless the module is `CONFIG_LOADING`.
    pub fn load_startup_config(&mut self, config: &MessagePayload) -> Result<(), BindingError> {
        self.lifecycle.require_config_loading("load_startup_config");
        let decoded: R = config
            .deserialize()
            .map_err(|e| BindingError::InvalidConfig {
                module: self.identity().name.clone(),
                reason: e.to_string(),
            })?;
        if let Some(previous) = self.root.as_mut() {
            previous.dispose();
        }
        self.root = Some(decoded);
        debug!(module = %self.identity(), "Startup configuration applied");
        Ok(())
    }

    /// Phase 2, running `setup` on the configured root
    ///
    /// If `setup` fails the module stays `CONFIG_LOADING` and may be
    /// started again.
    pub fn init2(
        &mut self,
        setup: impl FnOnce(&mut R) -> Result<(), BindingError>,
    ) -> Result<(), BindingError> {
        let root = &mut self.root;
        let identity = self.lifecycle.identity().clone();
        self.lifecycle.init2(|| match root.as_mut() {
            Some(root) => setup(root),
            None => panic!("contract violation: module {} has no root container", identity),
        })
    }

    /// Teardown, running `teardown` on the root before it is released
    ///
    /// A second call is a logged no-op.
    pub fn cleanup(&mut self, agent: &mut dyn AgentServices, teardown: impl FnOnce(&mut R)) {
        let identity = self.lifecycle.identity().clone();
        let root = &mut self.root;
        let emitter = &mut self.emitter;
        let released = self.lifecycle.cleanup(|| {
            if let Some(mut r) = root.take() {
                teardown(&mut r);
                r.dispose();
            }
            *emitter = None;
            agent.deregister_module(&identity);
        });
        if released {
            info!(module = %identity, "Root container released");
        }
    }

    /// Fails unless the module is `RUNNING`
    pub fn require_running(&self) -> Result<(), LifecycleError> {
        self.lifecycle.require_running()
    }

    /// Returns the root container, if allocated
    pub fn try_root(&self) -> Option<&R> {
        self.root.as_ref()
    }

    /// Returns the root container
    ///
    /// # Panics
    ///
    /// Outside `CONFIG_LOADING` and `RUNNING`.
    pub fn root(&self) -> &R {
        match self.root.as_ref() {
            Some(root) => root,
            None => self.disposed("root"),
        }
    }

    /// Returns the root container mutably
    ///
    /// # Panics
    ///
    /// Outside `CONFIG_LOADING` and `RUNNING`.
    pub fn root_mut(&mut self) -> &mut R {
        let lifecycle = &self.lifecycle;
        match self.root.as_mut() {
            Some(root) => root,
            None => panic!(
                "contract violation: root_mut() used on module {} in state {}",
                lifecycle.identity(),
                lifecycle.state()
            ),
        }
    }

    /// Returns the notification emitter
    ///
    /// # Panics
    ///
    /// Before `init` or after `cleanup`.
    pub fn emitter(&self) -> &NotificationEmitter {
        match self.emitter.as_ref() {
            Some(emitter) => emitter,
            None => self.disposed("emitter"),
        }
    }

    fn disposed(&self, what: &str) -> ! {
        panic!(
            "contract violation: {}() used on module {} in state {}",
            what,
            self.identity(),
            self.state()
        )
    }
}

fn register_all(
    agent: &mut dyn AgentServices,
    identity: &ModuleIdentity,
    operations: &'static [&'static str],
    notifications: &'static [&'static str],
) -> Result<(), BindingError> {
    for operation in operations {
        agent.register_operation(identity, operation)?;
    }
    for notification in notifications {
        agent.register_notification(identity, notification)?;
    }
    debug!(
        module = %identity,
        operations = operations.len(),
        notifications = notifications.len(),
        "Registered with agent"
    );
    Ok(())
}

impl<R> Drop for ModuleCore<R> {
    fn drop(&mut self) {
        if self.lifecycle.state() == LifecycleState::Running {
            warn!(
                module = %self.lifecycle.identity(),
                "Module dropped while running, cleanup() was never called"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Leaf, OrderedList};
    use core_types::{Revision, XmlString};
    use ipc::{event_channel, EventReceiver};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct Demo {
        name: Leaf<XmlString>,
        tags: OrderedList<XmlString>,
    }

    impl Dispose for Demo {
        fn dispose(&mut self) {
            self.name.dispose();
            self.tags.dispose();
        }
    }

    impl Container for Demo {
        const PATH: &'static str = "/demo";
    }

    struct FakeAgent {
        sender: EventSender,
        receiver: EventReceiver,
        operations: BTreeSet<String>,
        notifications: BTreeSet<String>,
        refuse: Option<&'static str>,
    }

    impl FakeAgent {
        fn new() -> Self {
            let (sender, receiver) = event_channel();
            Self {
                sender,
                receiver,
                operations: BTreeSet::new(),
                notifications: BTreeSet::new(),
                refuse: None,
            }
        }
    }

    impl AgentServices for FakeAgent {
        fn register_operation(
            &mut self,
            _: &ModuleIdentity,
            operation: &'static str,
        ) -> Result<(), BindingError> {
            self.operations.insert(operation.to_string());
            Ok(())
        }

        fn register_notification(
            &mut self,
            _: &ModuleIdentity,
            notification: &'static str,
        ) -> Result<(), BindingError> {
            if self.refuse == Some(notification) {
                return Err(BindingError::Registration {
                    item: notification.to_string(),
                    reason: "refused".to_string(),
                });
            }
            self.notifications.insert(notification.to_string());
            Ok(())
        }

        fn deregister_module(&mut self, _: &ModuleIdentity) {
            self.operations.clear();
            self.notifications.clear();
        }

        fn event_sender(&self) -> EventSender {
            self.sender.clone()
        }
    }

    fn core() -> ModuleCore<Demo> {
        ModuleCore::new(
            ModuleIdentity::new("demo", Revision::parse("2020-01-01").unwrap()),
            &["demo_op"],
            &["demoEvent"],
        )
    }

    #[test]
    fn test_init_allocates_and_registers() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        assert!(core.try_root().is_none());

        core.init("demo", Some("2020-01-01"), &mut agent).unwrap();
        assert_eq!(core.state(), LifecycleState::ConfigLoading);
        assert_eq!(core.root(), &Demo::default());
        assert!(agent.operations.contains("demo_op"));
        assert!(agent.notifications.contains("demoEvent"));
    }

    #[test]
    fn test_init_mismatch_allocates_nothing() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        let err = core.init("other", None, &mut agent).unwrap_err();
        assert_eq!(err.status(), core_types::Status::IdentityMismatch);
        assert_eq!(core.state(), LifecycleState::Uninitialized);
        assert!(core.try_root().is_none());
        assert!(agent.operations.is_empty());
    }

    #[test]
    fn test_failed_registration_rolls_back() {
        let mut agent = FakeAgent::new();
        agent.refuse = Some("demoEvent");
        let mut core = core();

        assert!(core.init("demo", None, &mut agent).is_err());
        assert_eq!(core.state(), LifecycleState::Uninitialized);
        assert!(core.try_root().is_none());
        assert!(agent.operations.is_empty(), "partial registration left behind");
    }

    #[test]
    fn test_startup_config_replaces_root() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        core.init("demo", None, &mut agent).unwrap();

        let config = MessagePayload::from_value(json!({ "name": "x", "tags": ["a", "b"] }));
        core.load_startup_config(&config).unwrap();
        assert_eq!(core.root().name.as_ref().map(XmlString::as_str), Some("x"));
        assert_eq!(core.root().tags.len(), 2);

        let bad = MessagePayload::from_value(json!({ "bogus": true }));
        assert!(matches!(
            core.load_startup_config(&bad),
            Err(BindingError::InvalidConfig { .. })
        ));
        assert_eq!(core.root().tags.len(), 2);
    }

    #[test]
    fn test_full_lifecycle_releases_root() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        core.init("demo", None, &mut agent).unwrap();
        core.init2(|root| {
            root.tags.append(XmlString::new("started").unwrap());
            Ok(())
        })
        .unwrap();
        assert_eq!(core.state(), LifecycleState::Running);
        assert_eq!(core.root().tags.len(), 1);

        core.emitter().emit(DemoEvent {});
        assert_eq!(agent.receiver.drain().len(), 1);

        let mut seen = 0;
        core.cleanup(&mut agent, |root| seen = root.tags.len());
        assert_eq!(seen, 1);
        assert_eq!(core.state(), LifecycleState::Terminated);
        assert!(core.try_root().is_none());
        assert!(agent.operations.is_empty());

        // Second cleanup is a no-op.
        core.cleanup(&mut agent, |_| panic!("teardown ran twice"));
    }

    #[test]
    fn test_failed_init2_keeps_configuration() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        core.init("demo", None, &mut agent).unwrap();
        let config = MessagePayload::from_value(json!({ "name": "x", "tags": ["a"] }));
        core.load_startup_config(&config).unwrap();

        let err = core
            .init2(|_| Err(BindingError::ResourceExhausted("worker".to_string())))
            .unwrap_err();
        assert_eq!(err.status(), core_types::Status::ResourceExhausted);
        assert_eq!(core.state(), LifecycleState::ConfigLoading);
        assert_eq!(core.root().name.as_ref().map(XmlString::as_str), Some("x"));
        assert_eq!(core.root().tags.len(), 1);

        core.emitter().emit(DemoEvent {});
        assert!(agent.receiver.drain().is_empty());

        core.init2(|_| Ok(())).unwrap();
        assert_eq!(core.state(), LifecycleState::Running);
    }

    #[derive(Serialize)]
    struct DemoEvent {}

    impl crate::Notification for DemoEvent {
        const NAME: &'static str = "demoEvent";
    }

    #[test]
    #[should_panic(expected = "contract violation: load_startup_config()")]
    fn test_config_before_init_panics() {
        let mut core = core();
        let _ = core.load_startup_config(&MessagePayload::from_value(json!({})));
    }

    #[test]
    #[should_panic(expected = "contract violation: root()")]
    fn test_root_after_cleanup_panics() {
        let mut agent = FakeAgent::new();
        let mut core = core();
        core.init("demo", None, &mut agent).unwrap();
        core.init2(|_| Ok(())).unwrap();
        core.cleanup(&mut agent, |_| {});
        core.root();
    }
}
