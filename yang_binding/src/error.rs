//! Binding error types

use core_types::Status;
use lifecycle::LifecycleError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported to the agent by lifecycle phases
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("invalid startup configuration for {module}: {reason}")]
    InvalidConfig { module: String, reason: String },

    #[error("registration of '{item}' failed: {reason}")]
    Registration { item: String, reason: String },
}

impl BindingError {
    /// Maps the error to the agent-facing status
    pub fn status(&self) -> Status {
        match self {
            BindingError::Lifecycle(e) => e.status(),
            BindingError::ResourceExhausted(_) => Status::ResourceExhausted,
            BindingError::InvalidConfig { .. } => Status::InvalidValue,
            BindingError::Registration { .. } => Status::Internal,
        }
    }
}

impl From<TryReserveError> for BindingError {
    fn from(error: TryReserveError) -> Self {
        BindingError::ResourceExhausted(error.to_string())
    }
}

impl From<&BindingError> for Status {
    fn from(error: &BindingError) -> Self {
        error.status()
    }
}
