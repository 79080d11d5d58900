//! The shared adapter algorithm.
//!
//! Every framework binding runs the same steps: read the identifier,
//! refuse an empty one, read the JSON body, invoke the trigger, shape
//! the response. Bindings differ only in how they read a request
//! ([`TriggerSource`]) and how they write a response (their native type,
//! or a [`ResponseWriter`]).
//!
//! Invocation failures are handled the same way in every binding: logged
//! and answered with `500 {"error":"Failed to trigger task"}`. The backend's
//! error text is only included when [`HandlerOptions::expose_error_details`]
//! is set.

use std::fmt::Display;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::envelope::{ErrorEnvelope, ResponseBody, TriggerRequest, TriggerResult};
use crate::error::TriggerError;
use crate::trigger::{TaskTrigger, invoke};

pub const TASK_ID_REQUIRED: &str = "Task ID is required";
pub const FAILED_TO_TRIGGER: &str = "Failed to trigger task";
pub const INVALID_JSON_BODY: &str = "Invalid JSON body";
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Per-handler behavior switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    /// Add the backend error text as `details` on 500 responses.
    pub expose_error_details: bool,
}

/// Read side of a framework request.
#[async_trait]
pub trait TriggerSource: Send {
    /// What the framework reports when the body can't be turned into JSON.
    type Rejection: Display + Send;

    /// Task identifier from the route, if present.
    fn identifier(&self) -> Option<String>;

    /// Consume the request and produce the JSON payload.
    async fn payload(self) -> Result<Value, Self::Rejection>;
}

/// Write side of a framework response, for callback-style bindings.
pub trait ResponseWriter {
    fn status(&mut self, status: StatusCode) -> &mut Self;
    fn json<T: Serialize + ?Sized>(&mut self, body: &T);
}

/// Status plus body produced by [`handle_trigger`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl TriggerResponse {
    pub fn triggered(result: TriggerResult<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Triggered(result),
        }
    }

    pub fn error(status: StatusCode, envelope: ErrorEnvelope) -> Self {
        Self {
            status,
            body: ResponseBody::Error(envelope),
        }
    }

    pub fn missing_task_id() -> Self {
        Self::error(StatusCode::BAD_REQUEST, ErrorEnvelope::new(TASK_ID_REQUIRED))
    }

    pub fn invalid_body() -> Self {
        Self::error(StatusCode::BAD_REQUEST, ErrorEnvelope::new(INVALID_JSON_BODY))
    }

    pub fn body_too_large() -> Self {
        Self::error(StatusCode::PAYLOAD_TOO_LARGE, ErrorEnvelope::new(BODY_TOO_LARGE))
    }

    pub fn failed(err: &TriggerError, options: &HandlerOptions) -> Self {
        let mut envelope = ErrorEnvelope::new(FAILED_TO_TRIGGER);
        if options.expose_error_details {
            envelope = envelope.with_details(err.to_string());
        }
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, envelope)
    }

    /// Hand this response to a callback-style writer.
    pub fn write_to<W: ResponseWriter>(&self, writer: &mut W) {
        writer.status(self.status).json(&self.body);
    }
}

/// Run the adapter algorithm against one request.
///
/// Returns `Err` only when the framework rejected the body; the binding
/// turns that into its own native error response. The trigger is never
/// called for a missing identifier or a rejected body.
pub async fn handle_trigger<S: TriggerSource>(
    trigger: &dyn TaskTrigger,
    options: &HandlerOptions,
    source: S,
) -> Result<TriggerResponse, S::Rejection> {
    let Some(mut request) = source
        .identifier()
        .and_then(|id| TriggerRequest::new(id, Value::Null))
    else {
        warn!("trigger request without task id");
        return Ok(TriggerResponse::missing_task_id());
    };

    request.payload = match source.payload().await {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(
                task_id = %request.identifier,
                error = %rejection,
                "trigger request body rejected"
            );
            return Err(rejection);
        }
    };

    debug!(task_id = %request.identifier, "triggering task");
    match invoke(trigger, &request.identifier, request.payload).await {
        Ok(result) => {
            info!(task_id = %result.task_id, "task triggered");
            Ok(TriggerResponse::triggered(result))
        }
        Err(e) => {
            error!(task_id = %request.identifier, error = %e, "failed to trigger task");
            Ok(TriggerResponse::failed(&e, options))
        }
    }
}
