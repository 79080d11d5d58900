//! In-memory trigger backend for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TriggerError;
use crate::trigger::TaskTrigger;

/// Records every call and answers with a canned handle or failure.
#[derive(Debug)]
pub struct MockTrigger {
    outcome: Result<Value, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTrigger {
    pub fn returning(handle: Value) -> Self {
        Self {
            outcome: Ok(handle),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(task_id, payload)` for each call, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TaskTrigger for MockTrigger {
    async fn trigger(&self, task_id: &str, payload: &Value) -> Result<Value, TriggerError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((task_id.to_string(), payload.clone()));
        self.outcome.clone().map_err(TriggerError::Other)
    }
}
