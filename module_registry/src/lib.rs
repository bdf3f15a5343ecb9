//! # Module Registry
//!
//! Catalog of the schema modules an agent binary was built with.
//!
//! ## Philosophy
//!
//! Modules are looked up by identity, never by path or file name. A
//! registration is a factory: the agent instantiates a fresh module every
//! time it loads one, so no module state outlives its lifecycle.

use core_types::{ModuleIdentity, Revision};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use yang_binding::SchemaModule;

/// Builds a fresh, uninitialized module instance
pub type ModuleFactory = Box<dyn Fn() -> Box<dyn SchemaModule> + Send + Sync>;

/// Error types for registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Identity already registered
    #[error("module {0} is already registered")]
    AlreadyRegistered(ModuleIdentity),

    /// No module matches the requested name and revision
    #[error("no module {name}@{}", .revision.as_deref().unwrap_or("*"))]
    NotFound {
        name: String,
        revision: Option<String>,
    },
}

/// Registry of compiled modules
///
/// Several revisions of one module may be registered side by side.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: BTreeMap<String, BTreeMap<Revision, ModuleFactory>>,
}

impl ModuleRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory of `identity`
    pub fn register(
        &mut self,
        identity: ModuleIdentity,
        factory: ModuleFactory,
    ) -> Result<(), RegistryError> {
        let revisions = self.factories.entry(identity.name.clone()).or_default();
        if revisions.contains_key(&identity.revision) {
            return Err(RegistryError::AlreadyRegistered(identity));
        }
        debug!(module = %identity, "Module registered");
        revisions.insert(identity.revision, factory);
        Ok(())
    }

    /// Resolves a name and optional revision to a registered identity
    ///
    /// Without a revision the newest registered one is chosen.
    pub fn lookup(
        &self,
        name: &str,
        revision: Option<&str>,
    ) -> Result<ModuleIdentity, RegistryError> {
        let not_found = || RegistryError::NotFound {
            name: name.to_string(),
            revision: revision.map(str::to_string),
        };

        let revisions = self.factories.get(name).ok_or_else(not_found)?;
        let found = match revision {
            Some(text) => revisions.keys().find(|r| r.as_str() == text),
            None => revisions.keys().next_back(),
        };
        found
            .map(|r| ModuleIdentity::new(name, r.clone()))
            .ok_or_else(not_found)
    }

    /// Builds a fresh instance of the module matching `name` and `revision`
    pub fn instantiate(
        &self,
        name: &str,
        revision: Option<&str>,
    ) -> Result<Box<dyn SchemaModule>, RegistryError> {
        let identity = self.lookup(name, revision)?;
        let factory = self
            .factories
            .get(&identity.name)
            .and_then(|revisions| revisions.get(&identity.revision))
            .ok_or(RegistryError::NotFound {
                name: identity.name.clone(),
                revision: Some(identity.revision.to_string()),
            })?;
        debug!(module = %identity, "Instantiating module");
        Ok(factory())
    }

    /// Lists registered identities, ordered by name then revision
    pub fn identities(&self) -> Vec<ModuleIdentity> {
        self.factories
            .iter()
            .flat_map(|(name, revisions)| {
                revisions
                    .keys()
                    .map(move |r| ModuleIdentity::new(name.as_str(), r.clone()))
            })
            .collect()
    }

    /// Removes a registration
    pub fn unregister(&mut self, identity: &ModuleIdentity) -> Result<(), RegistryError> {
        let removed = self
            .factories
            .get_mut(&identity.name)
            .and_then(|revisions| revisions.remove(&identity.revision));
        if removed.is_none() {
            return Err(RegistryError::NotFound {
                name: identity.name.clone(),
                revision: Some(identity.revision.to_string()),
            });
        }
        if self
            .factories
            .get(&identity.name)
            .is_some_and(BTreeMap::is_empty)
        {
            self.factories.remove(&identity.name);
        }
        Ok(())
    }

    /// Returns the number of registered modules
    pub fn count(&self) -> usize {
        self.factories.values().map(BTreeMap::len).sum()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.identities()).finish()
    }
}
