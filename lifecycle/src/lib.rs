//! # Lifecycle
//!
//! The three-phase state machine an agent drives exactly once per hosted
//! module instance.
//!
//! ```text
//! UNINITIALIZED --init(name, revision)--> CONFIG_LOADING
//! CONFIG_LOADING --init2()--> RUNNING
//! RUNNING --cleanup()--> TERMINATED
//! ```
//!
//! ## Philosophy
//!
//! - **Construct or roll back**: each transition runs a caller-supplied
//!   setup step between the state check and the state change; if the step
//!   fails the state is left untouched
//! - **Misuse is fatal**: out-of-order calls mean the hosting agent is
//!   broken, so they panic instead of returning an error
//! - **Observable**: a [`LifecycleWatch`] lets emitters on other threads
//!   check whether the module is running without touching the controller
//!
//! ## Core Concepts
//!
//! - `LifecycleState`: where the module is in its life
//! - `LifecycleController`: owns the state and enforces the transitions
//! - `LifecycleWatch`: cloneable, read-only view of the state
//! - `LifecycleError`: recoverable failures (identity mismatch, not running)

use core_types::{ModuleIdentity, Status};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Lifecycle phase of a hosted module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum LifecycleState {
    /// Loaded, nothing allocated yet
    Uninitialized = 0,
    /// Root container allocated, waiting for startup configuration
    ConfigLoading = 1,
    /// Operations dispatchable, notifications emittable
    Running = 2,
    /// Root container released, deregistered from the agent
    Terminated = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Uninitialized,
            1 => LifecycleState::ConfigLoading,
            2 => LifecycleState::Running,
            _ => LifecycleState::Terminated,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "UNINITIALIZED"),
            LifecycleState::ConfigLoading => write!(f, "CONFIG_LOADING"),
            LifecycleState::Running => write!(f, "RUNNING"),
            LifecycleState::Terminated => write!(f, "TERMINATED"),
        }
    }
}

/// Recoverable lifecycle failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error(
        "module identity mismatch: compiled {expected}, requested {requested_name}@{}",
        .requested_revision.as_deref().unwrap_or("*")
    )]
    IdentityMismatch {
        expected: ModuleIdentity,
        requested_name: String,
        requested_revision: Option<String>,
    },

    #[error("module {module} is {state}, not RUNNING")]
    NotRunning {
        module: String,
        state: LifecycleState,
    },
}

impl LifecycleError {
    /// Maps the error to the agent-facing status
    pub fn status(&self) -> Status {
        match self {
            LifecycleError::IdentityMismatch { .. } => Status::IdentityMismatch,
            LifecycleError::NotRunning { .. } => Status::WrongState,
        }
    }
}

/// Read-only view of a controller's state
///
/// Cheap to clone and safe to consult from any thread.
#[derive(Debug, Clone)]
pub struct LifecycleWatch {
    state: Arc<AtomicU8>,
}

impl LifecycleWatch {
    /// Returns the current state
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Checks whether the module is running
    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }
}

/// Enforces the lifecycle of one module instance
#[derive(Debug)]
pub struct LifecycleController {
    identity: ModuleIdentity,
    state: Arc<AtomicU8>,
}

impl LifecycleController {
    /// Creates a controller in `UNINITIALIZED`
    pub fn new(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            state: Arc::new(AtomicU8::new(LifecycleState::Uninitialized as u8)),
        }
    }

    /// Returns the compiled identity
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Returns the current state
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns a watch sharing this controller's state
    pub fn watch(&self) -> LifecycleWatch {
        LifecycleWatch {
            state: Arc::clone(&self.state),
        }
    }

    fn set_state(&self, next: LifecycleState) {
        let previous = self.state();
        self.state.store(next as u8, Ordering::Release);
        info!(module = %self.identity, from = %previous, to = %next, "Lifecycle transition");
    }

    fn violation(&self, call: &str) -> ! {
        panic!(
            "contract violation: {}() called on module {} in state {}",
            call,
            self.identity,
            self.state()
        )
    }

    /// Phase 1: identity check, then `setup`, then `CONFIG_LOADING`
    ///
    /// On identity mismatch `setup` is not run. If `setup` fails the
    /// controller stays `UNINITIALIZED`.
    ///
    /// # Panics
    ///
    /// If the controller is not `UNINITIALIZED`.
    pub fn init<T, E>(
        &mut self,
        name: &str,
        revision: Option<&str>,
        setup: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<LifecycleError>,
    {
        if self.state() != LifecycleState::Uninitialized {
            self.violation("init");
        }

        if !self.identity.matches(name, revision) {
            warn!(
                module = %self.identity,
                requested_name = name,
                requested_revision = revision.unwrap_or("*"),
                "Rejecting init: identity mismatch"
            );
            return Err(LifecycleError::IdentityMismatch {
                expected: self.identity.clone(),
                requested_name: name.to_string(),
                requested_revision: revision.map(str::to_string),
            }
            .into());
        }

        let value = setup()?;
        self.set_state(LifecycleState::ConfigLoading);
        Ok(value)
    }

    /// Phase 2: `setup`, then `RUNNING`
    ///
    /// # Panics
    ///
    /// If the controller is not `CONFIG_LOADING`.
    pub fn init2<T, E>(&mut self, setup: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if self.state() != LifecycleState::ConfigLoading {
            self.violation("init2");
        }
        let value = setup()?;
        self.set_state(LifecycleState::Running);
        Ok(value)
    }

    /// Teardown: `teardown`, then `TERMINATED`
    ///
    /// Returns `false` without running `teardown` when already terminated.
    ///
    /// # Panics
    ///
    /// If the controller is `UNINITIALIZED` or `CONFIG_LOADING`.
    pub fn cleanup(&mut self, teardown: impl FnOnce()) -> bool {
        match self.state() {
            LifecycleState::Running => {
                teardown();
                self.set_state(LifecycleState::Terminated);
                true
            }
            LifecycleState::Terminated => {
                warn!(module = %self.identity, "cleanup() on terminated module ignored");
                false
            }
            LifecycleState::Uninitialized | LifecycleState::ConfigLoading => {
                self.violation("cleanup")
            }
        }
    }

    /// Fails unless the module is `RUNNING`
    pub fn require_running(&self) -> Result<(), LifecycleError> {
        match self.state() {
            LifecycleState::Running => Ok(()),
            state => {
                debug!(module = %self.identity, %state, "Request refused: module not running");
                Err(LifecycleError::NotRunning {
                    module: self.identity.name.clone(),
                    state,
                })
            }
        }
    }

    /// Asserts that startup configuration may be applied now
    ///
    /// # Panics
    ///
    /// If the controller is not `CONFIG_LOADING`.
    pub fn require_config_loading(&self, call: &str) {
        if self.state() != LifecycleState::ConfigLoading {
            self.violation(call);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Revision;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Lifecycle(LifecycleError),
        Setup,
    }

    impl From<LifecycleError> for TestError {
        fn from(e: LifecycleError) -> Self {
            TestError::Lifecycle(e)
        }
    }

    fn controller() -> LifecycleController {
        LifecycleController::new(ModuleIdentity::new(
            "starter",
            Revision::parse("2013-03-13").unwrap(),
        ))
    }

    fn ok() -> Result<(), TestError> {
        Ok(())
    }

    #[test]
    fn test_full_sequence() {
        let mut lc = controller();
        assert_eq!(lc.state(), LifecycleState::Uninitialized);

        lc.init("starter", Some("2013-03-13"), ok).unwrap();
        assert_eq!(lc.state(), LifecycleState::ConfigLoading);

        lc.init2(ok).unwrap();
        assert_eq!(lc.state(), LifecycleState::Running);
        assert!(lc.require_running().is_ok());

        let mut torn_down = false;
        assert!(lc.cleanup(|| torn_down = true));
        assert!(torn_down);
        assert_eq!(lc.state(), LifecycleState::Terminated);
    }

    #[test]
    fn test_identity_mismatch_stays_uninitialized() {
        let mut lc = controller();
        let mut ran = false;
        let result = lc.init("starter", Some("2099-01-01"), || {
            ran = true;
            ok()
        });

        assert!(!ran);
        match result {
            Err(TestError::Lifecycle(e)) => assert_eq!(e.status(), Status::IdentityMismatch),
            other => panic!("expected identity mismatch, got {:?}", other),
        }
        assert_eq!(lc.state(), LifecycleState::Uninitialized);

        // A correct request afterwards still works.
        lc.init("starter", None, ok).unwrap();
        assert_eq!(lc.state(), LifecycleState::ConfigLoading);
    }

    #[test]
    fn test_failed_setup_rolls_back() {
        let mut lc = controller();
        let result: Result<(), TestError> = lc.init("starter", None, || Err(TestError::Setup));
        assert_eq!(result, Err(TestError::Setup));
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_cleanup_twice_is_noop() {
        let mut lc = controller();
        lc.init("starter", None, ok).unwrap();
        lc.init2(ok).unwrap();
        assert!(lc.cleanup(|| {}));

        let mut ran = false;
        assert!(!lc.cleanup(|| ran = true));
        assert!(!ran);
        assert_eq!(lc.state(), LifecycleState::Terminated);
    }

    #[test]
    #[should_panic(expected = "contract violation: init2()")]
    fn test_init2_before_init_panics() {
        let mut lc = controller();
        let _ = lc.init2(ok);
    }

    #[test]
    #[should_panic(expected = "contract violation: cleanup()")]
    fn test_cleanup_while_config_loading_panics() {
        let mut lc = controller();
        lc.init("starter", None, ok).unwrap();
        lc.cleanup(|| {});
    }

    #[test]
    #[should_panic(expected = "contract violation: init()")]
    fn test_init_twice_panics() {
        let mut lc = controller();
        lc.init("starter", None, ok).unwrap();
        let _ = lc.init("starter", None, ok);
    }

    #[test]
    fn test_watch_follows_controller() {
        let mut lc = controller();
        let watch = lc.watch();
        assert!(!watch.is_running());

        lc.init("starter", None, ok).unwrap();
        assert_eq!(watch.state(), LifecycleState::ConfigLoading);
        lc.init2(ok).unwrap();
        assert!(watch.is_running());
        lc.cleanup(|| {});
        assert!(!watch.is_running());
    }

    #[test]
    fn test_require_running_reports_state() {
        let lc = controller();
        assert_eq!(
            lc.require_running(),
            Err(LifecycleError::NotRunning {
                module: "starter".to_string(),
                state: LifecycleState::Uninitialized,
            })
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::ConfigLoading.to_string(), "CONFIG_LOADING");
        assert_eq!(LifecycleState::Terminated.to_string(), "TERMINATED");
    }
}
