//! taskgate-hyper — hyper binding for taskgate.
//!
//! hyper has no route parameters, so the task identifier is the final
//! path segment (percent-decoded). The body is buffered with
//! `http-body-util`, capped at [`DEFAULT_BODY_LIMIT`] unless
//! [`HyperTrigger::with_body_limit`] says otherwise, and parsed as JSON.
//!
//! # Entry points
//!
//! [`HyperTrigger`] exposes two calling conventions from one value:
//!
//! - [`HyperTrigger::handle`]: request in, response out.
//! - [`HyperTrigger::handle_legacy`]: request plus a
//!   [`ResponseWriter`](taskgate_core::ResponseWriter) the handler writes into.
//!
//! Both run the full algorithm on their own; neither keeps state between calls.
//! `HyperTrigger` is also a `tower::Service`, which calls `handle`.
//!
//! # Architecture
//!
//! ```text
//! TcpListener (TriggerServer)
//!   │
//!   ├── POST {prefix} or {prefix}/{id}? else 404 / 405
//!   ├── HyperTrigger::handle(req)
//!   │
//!   ▼
//! HTTP response
//! ```

pub mod convert;
pub mod handler;
pub mod server;
pub mod service;

pub use convert::LegacyResponse;
pub use handler::{DEFAULT_BODY_LIMIT, HyperTrigger};
pub use server::TriggerServer;
