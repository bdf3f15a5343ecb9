//! Operation records
//!
//! Every RPC declared by a schema gets a fixed-shape input record and a
//! fixed-shape output record, even when the schema declares no fields for
//! one of them ([`EmptyInput`], [`EmptyOutput`]). A record pair lives for
//! exactly one invocation.

use crate::BindingError;
use core_types::Status;
use ipc::MessagePayload;
use lifecycle::LifecycleError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A declared remote operation
pub trait Operation {
    /// Operation name as it appears on the wire
    const NAME: &'static str;
    /// Populated by the agent before the handler runs
    type Input: DeserializeOwned + Serialize + Default;
    /// Populated by the handler before it returns
    type Output: DeserializeOwned + Serialize + Default;
}

/// Input of an operation that declares no input fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyInput {}

/// Output of an operation that declares no output fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyOutput {}

/// Failure reported by an operation handler
///
/// Propagated verbatim to the agent; the binding never retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct OperationError {
    pub status: Status,
    pub message: String,
}

impl OperationError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A mandatory input leaf was not supplied
    pub fn missing_parameter(field: &str) -> Self {
        Self::new(Status::MissingParameter, format!("missing input '{}'", field))
    }

    /// A supplied value could not be accepted
    pub fn invalid_value(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            Status::InvalidValue,
            format!("invalid value for '{}': {}", field, reason),
        )
    }

    /// The handler ran and failed
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(Status::OperationFailed, message)
    }

    /// No handler exists for the operation
    pub fn unknown_operation(name: &str) -> Self {
        Self::new(
            Status::UnknownOperation,
            format!("unknown operation '{}'", name),
        )
    }
}

impl From<LifecycleError> for OperationError {
    fn from(error: LifecycleError) -> Self {
        Self::new(error.status(), error.to_string())
    }
}

impl From<BindingError> for OperationError {
    fn from(error: BindingError) -> Self {
        Self::new(error.status(), error.to_string())
    }
}

/// Input and output of one invocation of `O`
pub struct OperationRecord<O: Operation> {
    pub input: O::Input,
    pub output: O::Output,
}

impl<O: Operation> OperationRecord<O> {
    /// Decodes the input record and allocates an empty output record
    pub fn decode(input: &MessagePayload) -> Result<Self, OperationError> {
        let input = input
            .deserialize()
            .map_err(|e| OperationError::invalid_value("input", e))?;
        Ok(Self {
            input,
            output: O::Output::default(),
        })
    }

    /// Encodes the output record, consuming the pair
    pub fn into_output(self) -> Result<MessagePayload, OperationError> {
        MessagePayload::new(&self.output)
            .map_err(|e| OperationError::new(Status::Internal, e.to_string()))
    }
}

impl<O: Operation> std::fmt::Debug for OperationRecord<O>
where
    O::Input: std::fmt::Debug,
    O::Output: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRecord")
            .field("operation", &O::NAME)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

/// Runs one handler invocation
///
/// Decodes the input, lets `handler` fill the output in place and encodes
/// it. If the handler fails, the partially filled output is dropped and
/// only the error is returned.
pub fn invoke_operation<O, C>(
    context: &mut C,
    input: &MessagePayload,
    handler: impl FnOnce(&mut C, &O::Input, &mut O::Output) -> Result<(), OperationError>,
) -> Result<MessagePayload, OperationError>
where
    O: Operation,
    C: ?Sized,
{
    let mut record = OperationRecord::<O>::decode(input)?;
    handler(context, &record.input, &mut record.output)?;
    record.into_output()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::XmlString;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EchoInput {
        #[serde(default)]
        text: Option<XmlString>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct EchoOutput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<XmlString>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extra: Option<XmlString>,
    }

    struct Echo;

    impl Operation for Echo {
        const NAME: &'static str = "demo_echo";
        type Input = EchoInput;
        type Output = EchoOutput;
    }

    struct Ping;

    impl Operation for Ping {
        const NAME: &'static str = "demo_ping";
        type Input = EmptyInput;
        type Output = EmptyOutput;
    }

    fn payload(value: serde_json::Value) -> MessagePayload {
        MessagePayload::from_value(value)
    }

    #[test]
    fn test_success_returns_output() {
        let mut calls = 0u32;
        let input = payload(json!({ "text": "hi" }));
        let out = invoke_operation::<Echo, _>(&mut calls, &input, |calls, input, output| {
            *calls += 1;
            output.text = input.text.clone();
            Ok(())
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(out.as_value(), &json!({ "text": "hi" }));
    }

    #[test]
    fn test_failure_discards_partial_output() {
        let mut ctx = ();
        let result = invoke_operation::<Echo, _>(&mut ctx, &payload(json!({})), |_, _, output| {
            output.extra = Some(XmlString::new("partial").unwrap());
            Err(OperationError::failed("boom"))
        });
        assert_eq!(result, Err(OperationError::failed("boom")));
    }

    #[test]
    fn test_empty_records() {
        let mut ctx = ();
        let out = invoke_operation::<Ping, _>(&mut ctx, &payload(json!({})), |_, input, output| {
            assert_eq!(*input, EmptyInput {});
            assert_eq!(*output, EmptyOutput {});
            Ok(())
        })
        .unwrap();
        assert_eq!(out.as_value(), &json!({}));
    }

    #[test]
    fn test_unexpected_input_for_empty_operation() {
        let mut ctx = ();
        let result = invoke_operation::<Ping, _>(&mut ctx, &payload(json!({ "x": 1 })), |_, _, _| {
            panic!("handler must not run")
        });
        assert_eq!(result.unwrap_err().status, Status::InvalidValue);
    }

    #[test]
    fn test_invalid_text_rejected_before_handler() {
        let mut ctx = ();
        let input = payload(json!({ "text": "\u{0001}" }));
        let result = invoke_operation::<Echo, _>(&mut ctx, &input, |_, _, _| {
            panic!("handler must not run")
        });
        assert_eq!(result.unwrap_err().status, Status::InvalidValue);
    }

    #[test]
    fn test_exhausted_list_fails_the_operation() {
        let mut ctx = ();
        let result = invoke_operation::<Echo, _>(&mut ctx, &payload(json!({})), |_, _, output| {
            output.extra = Some(XmlString::new("partial").unwrap());
            let failure = Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err();
            Err(OperationError::from(BindingError::from(failure)))
        });
        let err = result.unwrap_err();
        assert_eq!(err.status, Status::ResourceExhausted);
        assert!(err.message.starts_with("resource exhausted"));
    }

    #[test]
    fn test_error_constructors() {
        assert_eq!(
            OperationError::missing_parameter("vnfID").status,
            Status::MissingParameter
        );
        assert_eq!(
            OperationError::unknown_operation("x").to_string(),
            "unknown operation (5): unknown operation 'x'"
        );
    }
}
