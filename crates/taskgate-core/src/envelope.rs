//! Request, result, and error envelopes.
//!
//! None of these outlive a single request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated trigger request: non-empty identifier plus the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub identifier: String,
    pub payload: Value,
}

impl TriggerRequest {
    /// Build a request, refusing an empty identifier.
    pub fn new(identifier: impl Into<String>, payload: Value) -> Option<Self> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return None;
        }
        Some(Self {
            identifier,
            payload,
        })
    }
}

/// Success envelope: `{ "taskId", "payload", "handle" }`.
///
/// `task_id` is the identifier exactly as received. `handle` is whatever
/// the trigger backend returned and is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResult<P = Value> {
    pub task_id: String,
    pub payload: P,
    pub handle: Value,
}

/// Error envelope: `{ "error": "..." }`, with optional `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Body of a [`TriggerResponse`](crate::TriggerResponse).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Triggered(TriggerResult<Value>),
    Error(ErrorEnvelope),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_rejects_empty_identifier() {
        assert!(TriggerRequest::new("", json!({})).is_none());
        assert!(TriggerRequest::new("send-email", json!({})).is_some());
    }

    #[test]
    fn result_uses_camel_case_task_id() {
        let result = TriggerResult {
            task_id: "test-task".to_string(),
            payload: json!({"name": "Test User"}),
            handle: json!({"id": "run_abc123"}),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "taskId": "test-task",
                "payload": {"name": "Test User"},
                "handle": {"id": "run_abc123"}
            })
        );
    }

    #[test]
    fn error_envelope_omits_missing_details() {
        let value = serde_json::to_value(ErrorEnvelope::new("Task ID is required")).unwrap();
        assert_eq!(value, json!({"error": "Task ID is required"}));

        let value =
            serde_json::to_value(ErrorEnvelope::new("Failed to trigger task").with_details("boom"))
                .unwrap();
        assert_eq!(
            value,
            json!({"error": "Failed to trigger task", "details": "boom"})
        );
    }

    #[test]
    fn response_body_serializes_untagged() {
        let body = ResponseBody::Error(ErrorEnvelope::new("nope"));
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"error": "nope"}));
    }
}
