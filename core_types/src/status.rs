//! Agent-facing status codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status returned to the agent by lifecycle phases and operation handlers
///
/// Codes are stable; the agent translates them into the management
/// protocol's error representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Success
    Ok,
    /// Allocation of a structure or record failed
    ResourceExhausted,
    /// Requested module name or revision differs from the compiled one
    IdentityMismatch,
    /// Request arrived while the module was in the wrong lifecycle state
    WrongState,
    /// No handler is registered for the requested operation
    UnknownOperation,
    /// A supplied value is malformed
    InvalidValue,
    /// A mandatory input field is absent
    MissingParameter,
    /// The handler ran and reported failure
    OperationFailed,
    /// Unexpected internal failure
    Internal,
}

impl Status {
    /// Returns the numeric status code
    pub fn code(&self) -> u32 {
        match self {
            Status::Ok => 0,
            Status::ResourceExhausted => 2,
            Status::IdentityMismatch => 3,
            Status::WrongState => 4,
            Status::UnknownOperation => 5,
            Status::InvalidValue => 6,
            Status::MissingParameter => 7,
            Status::OperationFailed => 8,
            Status::Internal => 9,
        }
    }

    /// Returns whether this status is success
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Ok => "ok",
            Status::ResourceExhausted => "resource exhausted",
            Status::IdentityMismatch => "module identity mismatch",
            Status::WrongState => "wrong lifecycle state",
            Status::UnknownOperation => "unknown operation",
            Status::InvalidValue => "invalid value",
            Status::MissingParameter => "missing parameter",
            Status::OperationFailed => "operation failed",
            Status::Internal => "internal error",
        };
        write!(f, "{} ({})", text, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ok_is_ok() {
        assert!(Status::Ok.is_ok());
        assert!(!Status::OperationFailed.is_ok());
        assert_eq!(Status::Ok.code(), 0);
    }

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            Status::Ok,
            Status::ResourceExhausted,
            Status::IdentityMismatch,
            Status::WrongState,
            Status::UnknownOperation,
            Status::InvalidValue,
            Status::MissingParameter,
            Status::OperationFailed,
            Status::Internal,
        ];
        let mut codes: Vec<u32> = all.iter().map(Status::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Status::IdentityMismatch).unwrap(),
            "\"identity-mismatch\""
        );
    }
}
