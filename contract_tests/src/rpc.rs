//! Agent RPC contract tests
//!
//! These tests define the stable envelope contract between a manager and
//! the agent.

// ===== Contract Version =====
pub const RPC_VERSION: ipc::SchemaVersion = ipc::SchemaVersion::new(1, 0);

// ===== Action Identifiers =====
pub const ACTION_REQUEST: &str = "rpc.request";
pub const ACTION_REPLY: &str = "rpc.reply";
pub const ACTION_NOTIFICATION: &str = "notification.event";

// ===== Contract Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use core_types::Status;
    use ipc::{
        MessageId, MessagePayload, NotificationEvent, RpcReply, RpcRequest, NOTIFICATION_ACTION,
        RPC_REPLY_ACTION, RPC_REQUEST_ACTION, RPC_SCHEMA_VERSION,
    };
    use serde_json::json;

    #[test]
    fn test_action_identifiers() {
        assert_eq!(RPC_REQUEST_ACTION, ACTION_REQUEST);
        assert_eq!(RPC_REPLY_ACTION, ACTION_REPLY);
        assert_eq!(NOTIFICATION_ACTION, ACTION_NOTIFICATION);
        assert_eq!(RPC_SCHEMA_VERSION, RPC_VERSION);
    }

    #[test]
    fn test_request_contract() {
        let envelope = RpcRequest::new("starter_kill-vnf", &json!({ "vnfID": "vnf-7" }))
            .unwrap()
            .into_envelope("starter")
            .unwrap();

        verify_envelope_contract(&envelope, ACTION_REQUEST, RPC_VERSION);
        verify_major_version(&envelope, 1);
        assert_eq!(envelope.module, "starter");
        assert!(!envelope.is_response());

        let body = envelope.payload.as_value();
        verify_keys(body, &["operation", "input"]);
        assert_eq!(body["input"], json!({ "vnfID": "vnf-7" }));
    }

    #[test]
    fn test_request_input_is_optional() {
        let request: RpcRequest =
            serde_json::from_value(json!({ "operation": "starter_get-load" })).unwrap();
        assert_eq!(request.input.as_value(), &json!({}));
    }

    #[test]
    fn test_reply_contract() {
        let correlation = MessageId::new();
        let ok = RpcReply::ok(
            "starter_kill-vnf",
            MessagePayload::from_value(json!({ "success": "true" })),
        )
        .into_envelope("starter", correlation)
        .unwrap();
        verify_envelope_contract(&ok, ACTION_REPLY, RPC_VERSION);
        assert_eq!(ok.correlation_id, Some(correlation));
        verify_keys(ok.payload.as_value(), &["operation", "status", "output"]);
        assert_eq!(ok.payload.as_value()["status"], json!("ok"));

        let failed = RpcReply::error(
            "starter_start-vnf",
            Status::MissingParameter,
            "missing input 'port'",
        )
        .into_envelope("starter", correlation)
        .unwrap();
        verify_keys(failed.payload.as_value(), &["operation", "status", "error"]);
        assert_eq!(failed.payload.as_value()["status"], json!("missing-parameter"));
    }

    #[test]
    fn test_notification_contract() {
        let event = NotificationEvent {
            module: "starter".to_string(),
            event_type: "processDone".to_string(),
            sequence: 3,
            payload: MessagePayload::from_value(json!({ "processStatus": "killed" })),
        };
        let envelope = event.into_envelope().unwrap();

        verify_envelope_contract(&envelope, ACTION_NOTIFICATION, RPC_VERSION);
        verify_keys(
            envelope.payload.as_value(),
            &["module", "event_type", "sequence", "payload"],
        );
    }

    #[test]
    fn test_envelope_fields() {
        let envelope = RpcRequest::without_input("starter_get-load")
            .into_envelope("starter")
            .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();
        verify_keys(
            &value,
            &["id", "module", "action", "schema_version", "correlation_id", "payload"],
        );
    }

    #[test]
    fn test_status_codes_are_stable() {
        let codes = [
            (Status::Ok, 0),
            (Status::ResourceExhausted, 2),
            (Status::IdentityMismatch, 3),
            (Status::WrongState, 4),
            (Status::UnknownOperation, 5),
            (Status::InvalidValue, 6),
            (Status::MissingParameter, 7),
            (Status::OperationFailed, 8),
            (Status::Internal, 9),
        ];
        for (status, code) in codes {
            assert_eq!(status.code(), code, "{:?}", status);
        }
    }
}
