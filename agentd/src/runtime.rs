//! # Host Runtime
//!
//! Loads modules, drives their lifecycle, routes operation requests and
//! fans notifications out to subscribers.

use crate::catalog::OperationCatalog;
use crate::config::{ConfigError, HostConfig, StartupConfig};
use crate::subscriptions::{EventFilter, SubscriptionManager};
use core_types::{ModuleInstanceId, Status, SubscriberId};
use ipc::{
    event_channel, EventReceiver, MessageEnvelope, NotificationEvent, RpcReply, RpcRequest,
    RPC_REQUEST_ACTION, RPC_SCHEMA_VERSION,
};
use module_registry::{ModuleRegistry, RegistryError};
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};
use y_starter::StarterModule;
use yang_binding::{AgentServices, BindingError, LifecycleState, ModuleIdentity, SchemaModule};

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Module {module}: {source}")]
    Binding {
        module: String,
        #[source]
        source: BindingError,
    },

    #[error("Module {0} is already loaded")]
    AlreadyLoaded(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HostError {
    /// Maps the error to the agent-facing status
    pub fn status(&self) -> Status {
        match self {
            HostError::Registry(RegistryError::NotFound { .. }) => Status::IdentityMismatch,
            HostError::Binding { source, .. } => source.status(),
            HostError::Config(_) => Status::InvalidValue,
            _ => Status::Internal,
        }
    }
}

struct LoadedModule {
    instance: ModuleInstanceId,
    module: Box<dyn SchemaModule>,
}

/// Registry of the modules this binary was built with
pub fn builtin_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    if let Err(e) = registry.register(
        y_starter::identity(),
        Box::new(|| Box::new(StarterModule::new()) as Box<dyn SchemaModule>),
    ) {
        warn!(error = %e, "Cannot register built-in module");
    }
    registry
}

/// Host runtime
pub struct HostRuntime {
    registry: ModuleRegistry,
    catalog: OperationCatalog,
    events: EventReceiver,
    modules: BTreeMap<String, LoadedModule>,
    subscriptions: SubscriptionManager,
}

impl HostRuntime {
    /// Creates a runtime with nothing loaded
    pub fn new(registry: ModuleRegistry, config: &HostConfig) -> Self {
        let (sender, events) = event_channel();
        Self {
            registry,
            catalog: OperationCatalog::new(sender),
            events,
            modules: BTreeMap::new(),
            subscriptions: SubscriptionManager::new(
                config.notification_history,
                config.subscriber_queue,
            ),
        }
    }

    /// Loads every configured module, applies `startup` and starts them
    pub fn bootstrap(
        registry: ModuleRegistry,
        config: &HostConfig,
        startup: &StartupConfig,
    ) -> Result<Self, HostError> {
        let mut runtime = Self::new(registry, config);
        for spec in &config.modules {
            runtime.load_module(&spec.name, spec.revision.as_deref())?;
        }
        runtime.apply_startup_config(startup)?;
        runtime.start_modules()?;
        Ok(runtime)
    }

    /// Instantiates a module and runs its `init`
    ///
    /// A module name may be loaded once per runtime.
    pub fn load_module(
        &mut self,
        name: &str,
        revision: Option<&str>,
    ) -> Result<ModuleInstanceId, HostError> {
        if self.modules.contains_key(name) {
            return Err(HostError::AlreadyLoaded(name.to_string()));
        }

        let mut module = self.registry.instantiate(name, revision)?;
        module
            .init(name, revision, &mut self.catalog)
            .map_err(|source| HostError::Binding {
                module: name.to_string(),
                source,
            })?;

        let instance = ModuleInstanceId::new();
        info!(module = %module.identity(), %instance, "Module loaded");
        self.modules
            .insert(name.to_string(), LoadedModule { instance, module });
        Ok(instance)
    }

    /// Hands persisted configuration to every module awaiting it
    pub fn apply_startup_config(&mut self, startup: &StartupConfig) -> Result<(), HostError> {
        for name in startup.modules.keys() {
            if !self.modules.contains_key(name) {
                warn!(module = %name, "Startup configuration for a module that is not loaded");
            }
        }

        for (name, loaded) in &mut self.modules {
            if loaded.module.state() != LifecycleState::ConfigLoading {
                continue;
            }
            if let Some(config) = startup.module(name) {
                loaded
                    .module
                    .load_startup_config(&config)
                    .map_err(|source| HostError::Binding {
                        module: name.clone(),
                        source,
                    })?;
                debug!(module = %name, "Startup configuration loaded");
            }
        }
        Ok(())
    }

    /// Runs `init2` on every module awaiting it
    pub fn start_modules(&mut self) -> Result<(), HostError> {
        for (name, loaded) in &mut self.modules {
            if loaded.module.state() == LifecycleState::ConfigLoading {
                loaded.module.init2().map_err(|source| HostError::Binding {
                    module: name.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Handles one request envelope, returning the reply envelope
    ///
    /// Every failure is reported in the reply; only encoding the reply
    /// itself can fail.
    pub fn dispatch(&mut self, envelope: &MessageEnvelope) -> Result<MessageEnvelope, HostError> {
        let (operation, reply) = match self.decode(envelope) {
            Ok(request) => {
                let reply = self.invoke(&envelope.module, &request);
                (request.operation, reply)
            }
            Err(reply) => (reply.operation.clone(), reply),
        };

        if !reply.status.is_ok() {
            warn!(
                module = %envelope.module,
                operation = %operation,
                status = %reply.status,
                error = reply.error.as_deref().unwrap_or(""),
                "Operation failed"
            );
        }
        Ok(reply.into_envelope(&envelope.module, envelope.id)?)
    }

    fn decode(&self, envelope: &MessageEnvelope) -> Result<RpcRequest, RpcReply> {
        if envelope.action != RPC_REQUEST_ACTION {
            return Err(RpcReply::error(
                "",
                Status::InvalidValue,
                format!("unsupported action '{}'", envelope.action),
            ));
        }
        if !envelope.schema_version.is_compatible_with(&RPC_SCHEMA_VERSION) {
            return Err(RpcReply::error(
                "",
                Status::InvalidValue,
                format!(
                    "incompatible schema version {} (agent speaks {})",
                    envelope.schema_version, RPC_SCHEMA_VERSION
                ),
            ));
        }
        envelope
            .payload
            .deserialize::<RpcRequest>()
            .map_err(|e| {
                RpcReply::error("", Status::InvalidValue, format!("malformed request: {}", e))
            })
    }

    fn invoke(&mut self, module: &str, request: &RpcRequest) -> RpcReply {
        let owner = match self.catalog.resolve(&request.operation) {
            Some(owner) if owner.name == module => owner.name.clone(),
            _ => {
                return RpcReply::error(
                    &request.operation,
                    Status::UnknownOperation,
                    format!("module {} has no operation '{}'", module, request.operation),
                )
            }
        };
        let Some(loaded) = self.modules.get_mut(&owner) else {
            return RpcReply::error(
                &request.operation,
                Status::UnknownOperation,
                format!("module {} is not loaded", module),
            );
        };

        debug!(module, operation = %request.operation, "Dispatching operation");
        match loaded.module.invoke(&request.operation, &request.input) {
            Ok(output) => RpcReply::ok(&request.operation, output),
            Err(e) => RpcReply::error(&request.operation, e.status, e.message),
        }
    }

    /// Moves emitted notifications into subscriber queues
    ///
    /// Events of undeclared notification types are dropped.
    pub fn pump_notifications(&mut self) -> usize {
        let mut delivered = 0;
        for event in self.events.drain() {
            if !self
                .catalog
                .declares_notification(&event.module, &event.event_type)
            {
                warn!(
                    module = %event.module,
                    event_type = %event.event_type,
                    "Undeclared notification dropped"
                );
                continue;
            }
            self.subscriptions.publish(event);
            delivered += 1;
        }
        delivered
    }

    /// Gives every running module a chance to do its bookkeeping
    pub fn poll_modules(&mut self) {
        for loaded in self.modules.values_mut() {
            if loaded.module.state() == LifecycleState::Running {
                loaded.module.poll();
            }
        }
        self.pump_notifications();
    }

    /// Adds a notification subscriber
    pub fn subscribe(&mut self, filter: EventFilter) -> SubscriberId {
        self.subscriptions.subscribe(filter)
    }

    /// Adds a subscriber that first receives the retained history
    pub fn subscribe_with_replay(&mut self, filter: EventFilter) -> SubscriberId {
        self.pump_notifications();
        self.subscriptions.subscribe_with_replay(filter)
    }

    /// Removes a subscriber
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Takes the pending notifications of a subscriber
    pub fn take_notifications(&mut self, id: SubscriberId) -> Vec<NotificationEvent> {
        self.pump_notifications();
        self.subscriptions.take(id)
    }

    /// Returns the lifecycle state of a loaded module
    pub fn module_state(&self, name: &str) -> Option<LifecycleState> {
        self.modules.get(name).map(|loaded| loaded.module.state())
    }

    /// Returns the instance id of a loaded module
    pub fn module_instance(&self, name: &str) -> Option<ModuleInstanceId> {
        self.modules.get(name).map(|loaded| loaded.instance)
    }

    /// Identities of the loaded modules
    pub fn loaded_modules(&self) -> Vec<ModuleIdentity> {
        self.modules
            .values()
            .map(|loaded| loaded.module.identity().clone())
            .collect()
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Cleans every module up and unloads it
    ///
    /// Modules that never reached `RUNNING` cannot run `cleanup`; they are
    /// deregistered and dropped.
    pub fn shutdown(&mut self) {
        for (name, mut loaded) in std::mem::take(&mut self.modules) {
            match loaded.module.state() {
                LifecycleState::Running => loaded.module.cleanup(&mut self.catalog),
                LifecycleState::ConfigLoading => {
                    warn!(module = %name, "Module never started, dropping without cleanup");
                    self.catalog.deregister_module(loaded.module.identity());
                }
                _ => {}
            }
            info!(module = %name, instance = %loaded.instance, "Module unloaded");
        }
        self.pump_notifications();
    }
}

impl Drop for HostRuntime {
    fn drop(&mut self) {
        if !self.modules.is_empty() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipc::{MessagePayload, SchemaVersion, RPC_REPLY_ACTION};
    use serde_json::json;

    fn runtime() -> HostRuntime {
        HostRuntime::new(builtin_registry(), &HostConfig::default())
    }

    fn request(operation: &str, input: serde_json::Value) -> MessageEnvelope {
        RpcRequest::new(operation, &input)
            .unwrap()
            .into_envelope("starter")
            .unwrap()
    }

    fn reply(envelope: &MessageEnvelope) -> RpcReply {
        envelope.payload.deserialize().unwrap()
    }

    #[test]
    fn test_builtin_registry_has_starter() {
        let registry = builtin_registry();
        assert_eq!(registry.identities(), vec![y_starter::identity()]);
    }

    #[test]
    fn test_load_twice_rejected() {
        let mut rt = runtime();
        let instance = rt.load_module("starter", None).unwrap();
        assert_eq!(rt.module_instance("starter"), Some(instance));
        assert!(matches!(
            rt.load_module("starter", None),
            Err(HostError::AlreadyLoaded(_))
        ));
    }

    #[test]
    fn test_load_unknown_revision() {
        let mut rt = runtime();
        let err = rt.load_module("starter", Some("1999-01-01")).unwrap_err();
        assert_eq!(err.status(), Status::IdentityMismatch);
        assert_eq!(rt.module_state("starter"), None);
        assert_eq!(rt.catalog().operation_count(), 0);
    }

    #[test]
    fn test_dispatch_before_start_is_wrong_state() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        let out = rt
            .dispatch(&request("starter_get-processes", json!({})))
            .unwrap();
        assert_eq!(reply(&out).status, Status::WrongState);
    }

    #[test]
    fn test_reply_is_correlated() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        rt.start_modules().unwrap();

        let req = request("starter_get-processes", json!({}));
        let out = rt.dispatch(&req).unwrap();
        assert_eq!(out.action, RPC_REPLY_ACTION);
        assert_eq!(out.correlation_id, Some(req.id));
        let body = reply(&out);
        assert_eq!(body.status, Status::Ok);
        assert_eq!(body.output.unwrap().as_value(), &json!({ "processes": "" }));
    }

    #[test]
    fn test_incompatible_version_rejected() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        rt.start_modules().unwrap();

        let mut req = request("starter_get-processes", json!({}));
        req.schema_version = SchemaVersion::new(2, 0);
        let body = reply(&rt.dispatch(&req).unwrap());
        assert_eq!(body.status, Status::InvalidValue);
        assert!(body.output.is_none());
    }

    #[test]
    fn test_operation_of_other_module_rejected() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        rt.start_modules().unwrap();

        let req = RpcRequest::without_input("starter_get-processes")
            .into_envelope("other")
            .unwrap();
        assert_eq!(reply(&rt.dispatch(&req).unwrap()).status, Status::UnknownOperation);
    }

    #[test]
    fn test_wrong_action_rejected() {
        let mut rt = runtime();
        let env = MessageEnvelope::new(
            "starter",
            "rpc.cancel",
            RPC_SCHEMA_VERSION,
            MessagePayload::from_value(json!({})),
        );
        assert_eq!(reply(&rt.dispatch(&env).unwrap()).status, Status::InvalidValue);
    }

    #[test]
    fn test_shutdown_terminates_and_deregisters() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        rt.start_modules().unwrap();
        assert_eq!(rt.module_state("starter"), Some(LifecycleState::Running));

        rt.shutdown();
        assert_eq!(rt.module_state("starter"), None);
        assert_eq!(rt.catalog().operation_count(), 0);
    }

    #[test]
    fn test_shutdown_before_start() {
        let mut rt = runtime();
        rt.load_module("starter", None).unwrap();
        rt.shutdown();
        assert!(rt.loaded_modules().is_empty());
        assert_eq!(rt.catalog().operation_count(), 0);
    }
}
