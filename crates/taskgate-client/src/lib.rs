//! taskgate-client — [`TaskTrigger`](taskgate_core::TaskTrigger) over HTTP.
//!
//! Triggers a task with `POST {api_url}/api/v1/tasks/{id}/trigger`,
//! authenticated with a bearer secret key. The response body becomes the
//! run handle.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpTaskTrigger;
pub use config::ClientConfig;
pub use error::ClientError;
