//! taskgate-core — the contract every taskgate adapter implements.
//!
//! An adapter turns `POST /<prefix>/{id}` with a JSON body into a call
//! against a [`TaskTrigger`] and writes the result back in its host
//! framework's response type.
//!
//! # Flow
//!
//! ```text
//! framework request
//!   │
//!   ▼
//! TriggerSource  ── identifier() ──► missing/empty? ──► 400 {"error":"Task ID is required"}
//!   │
//!   ├── payload().await        (framework-native JSON body)
//!   ├── invoke(trigger, id, payload)
//!   │
//!   ▼
//! TriggerResponse ──► 200 {taskId, payload, handle}
//!                 └─► 500 {"error":"Failed to trigger task"}
//! ```
//!
//! The algorithm lives once, in [`handle_trigger`]. Framework crates only
//! supply a [`TriggerSource`] and map the [`TriggerResponse`] onto their
//! own response type (or feed it to a [`ResponseWriter`]).

pub mod envelope;
pub mod error;
pub mod handler;
pub mod trigger;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use envelope::{ErrorEnvelope, ResponseBody, TriggerRequest, TriggerResult};
pub use error::{PayloadError, TriggerError};
pub use handler::{
    BODY_TOO_LARGE, FAILED_TO_TRIGGER, HandlerOptions, INVALID_JSON_BODY, ResponseWriter,
    TASK_ID_REQUIRED, TriggerResponse, TriggerSource, handle_trigger,
};
pub use trigger::{SharedTrigger, TaskTrigger, invoke};
