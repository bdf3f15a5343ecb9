//! Typed payloads for operation requests, replies and notifications.
//!
//! This module provides a stable, versioned schema for the messages the
//! agent exchanges with hosted modules.

use crate::{MessageEnvelope, MessageId, MessagePayload, SchemaVersion};
use core_types::Status;
use serde::{Deserialize, Serialize};

/// Schema version shared by all typed payloads (v1.0).
pub const RPC_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0);

/// Envelope action for operation requests.
pub const RPC_REQUEST_ACTION: &str = "rpc.request";

/// Envelope action for operation replies.
pub const RPC_REPLY_ACTION: &str = "rpc.reply";

/// Envelope action for emitted notifications.
pub const NOTIFICATION_ACTION: &str = "notification.event";

/// Decoded inbound operation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    /// Operation name as declared by the schema (e.g. `starter_kill-vnf`).
    pub operation: String,
    /// Input record, keyed by schema node names.
    #[serde(default = "empty_object")]
    pub input: MessagePayload,
}

fn empty_object() -> MessagePayload {
    MessagePayload::from_value(serde_json::Value::Object(serde_json::Map::new()))
}

impl RpcRequest {
    /// Creates a request with the given input record.
    pub fn new<T: Serialize>(
        operation: impl Into<String>,
        input: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            operation: operation.into(),
            input: MessagePayload::new(input)?,
        })
    }

    /// Creates a request for an operation without input.
    pub fn without_input(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            input: empty_object(),
        }
    }

    /// Wraps this request in a message envelope addressed to `module`.
    pub fn into_envelope(self, module: &str) -> Result<MessageEnvelope, serde_json::Error> {
        let payload = MessagePayload::new(&self)?;
        Ok(MessageEnvelope::new(
            module,
            RPC_REQUEST_ACTION,
            RPC_SCHEMA_VERSION,
            payload,
        ))
    }
}

/// Reply delivered back to the agent after one handler invocation.
///
/// On failure `output` is always absent: partial results are discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcReply {
    pub operation: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<MessagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RpcReply {
    /// Creates a successful reply.
    pub fn ok(operation: impl Into<String>, output: MessagePayload) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Ok,
            output: Some(output),
            error: None,
        }
    }

    /// Creates a failed reply.
    pub fn error(operation: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status,
            output: None,
            error: Some(message.into()),
        }
    }

    /// Wraps this reply in a message envelope correlated to a request.
    pub fn into_envelope(
        self,
        module: &str,
        correlation: MessageId,
    ) -> Result<MessageEnvelope, serde_json::Error> {
        let payload = MessagePayload::new(&self)?;
        Ok(
            MessageEnvelope::new(module, RPC_REPLY_ACTION, RPC_SCHEMA_VERSION, payload)
                .with_correlation(correlation),
        )
    }
}

/// A notification emitted by a module, as handed to the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    /// Emitting module name.
    pub module: String,
    /// Notification name as declared by the schema (e.g. `processDone`).
    pub event_type: String,
    /// Per-module sequence number, starting at 1.
    pub sequence: u64,
    /// Notification record.
    pub payload: MessagePayload,
}

impl NotificationEvent {
    /// Wraps this event in a message envelope.
    pub fn into_envelope(self) -> Result<MessageEnvelope, serde_json::Error> {
        let payload = MessagePayload::new(&self)?;
        Ok(MessageEnvelope::new(
            self.module,
            NOTIFICATION_ACTION,
            RPC_SCHEMA_VERSION,
            payload,
        ))
    }
}
