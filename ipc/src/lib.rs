//! # Agent Messaging
//!
//! Message-passing primitives between a hosted schema module and the agent.
//!
//! ## Philosophy
//!
//! - **Messages, not shared memory**: requests, replies and notifications
//!   cross the module boundary as envelopes with owned payloads
//! - **Traceable**: every message has an id, replies carry a correlation id
//! - **Versionable**: envelopes carry a schema version
//! - **Fire-and-forget events**: notification senders never block and never
//!   learn whether anyone received the event
//!
//! ## Architecture
//!
//! An envelope contains:
//! - The destination module name
//! - The action (`rpc.request`, `rpc.reply`, `notification.event`)
//! - Schema version for compatibility checks
//! - Correlation ID for request/reply matching
//! - A JSON payload (see [`typed`])

pub mod channel;
pub mod message;
pub mod typed;

pub use channel::{event_channel, EventReceiver, EventSender};
pub use message::{MessageEnvelope, MessageId, MessagePayload, SchemaVersion};
pub use typed::{
    NotificationEvent, RpcReply, RpcRequest, NOTIFICATION_ACTION, RPC_REPLY_ACTION,
    RPC_REQUEST_ACTION, RPC_SCHEMA_VERSION,
};
