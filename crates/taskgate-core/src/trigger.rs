//! The trigger backend boundary and the invocation function.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::TriggerResult;
use crate::error::TriggerError;

/// A task-triggering backend.
///
/// Receives the task identifier and the payload, returns an opaque handle.
/// Implementations own retries, timeouts, and auth; adapters add none.
#[async_trait]
pub trait TaskTrigger: Send + Sync {
    async fn trigger(&self, task_id: &str, payload: &Value) -> Result<Value, TriggerError>;
}

/// Trigger backend shared across concurrent handlers.
pub type SharedTrigger = Arc<dyn TaskTrigger>;

#[async_trait]
impl<T: TaskTrigger + ?Sized> TaskTrigger for Arc<T> {
    async fn trigger(&self, task_id: &str, payload: &Value) -> Result<Value, TriggerError> {
        (**self).trigger(task_id, payload).await
    }
}

/// Call the backend once and wrap its handle in a [`TriggerResult`].
///
/// `task_id` is assumed non-empty; checking is the caller's job. Backend
/// errors are returned as-is.
pub async fn invoke<P: Serialize>(
    trigger: &dyn TaskTrigger,
    task_id: &str,
    payload: P,
) -> Result<TriggerResult<P>, TriggerError> {
    let wire = serde_json::to_value(&payload).map_err(|e| TriggerError::Other(e.to_string()))?;
    let handle = trigger.trigger(task_id, &wire).await?;
    Ok(TriggerResult {
        task_id: task_id.to_string(),
        payload,
        handle,
    })
}
