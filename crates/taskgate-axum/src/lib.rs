//! taskgate-axum — axum binding for taskgate.
//!
//! The task identifier comes from the named route parameter `id`; the body
//! goes through axum's own `Json` extractor, so malformed bodies get axum's
//! native rejection response.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/{id}` | Trigger task `id` with the JSON body as payload |
//! | POST | `/` | Always `400 {"error":"Task ID is required"}` |
//!
//! ```ignore
//! let app = AxumTrigger::new(trigger).router_at("/api/trigger");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, RawPathParams, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, post};
use serde_json::Value;

use taskgate_core::{HandlerOptions, SharedTrigger, TriggerResponse, TriggerSource, handle_trigger};

/// Name of the route parameter holding the task identifier.
pub const TASK_ID_PARAM: &str = "id";

/// Shared state for the trigger handler.
#[derive(Clone)]
pub struct AxumTrigger {
    trigger: SharedTrigger,
    options: Arc<HandlerOptions>,
}

impl AxumTrigger {
    pub fn new(trigger: SharedTrigger) -> Self {
        Self {
            trigger,
            options: Arc::new(HandlerOptions::default()),
        }
    }

    pub fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// A `POST` method router, for mounting on any path with an `{id}` parameter.
    pub fn method_router<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        post(trigger_task).with_state(self)
    }

    /// Router serving `POST /{id}` and `POST /`.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", self.clone().method_router())
            .route("/{id}", self.method_router())
    }

    /// Router serving `POST {prefix}/{id}`, plus `{prefix}` and `{prefix}/`.
    ///
    /// Prefer this over `Router::nest` with [`router`](Self::router):
    /// `nest` does not route `{prefix}/`, so that path would 404 instead
    /// of answering 400.
    pub fn router_at(self, prefix: &str) -> Router {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return self.router();
        }
        Router::new()
            .route(&format!("/{prefix}"), self.clone().method_router())
            .route(&format!("/{prefix}/"), self.clone().method_router())
            .route(&format!("/{prefix}/{{{TASK_ID_PARAM}}}"), self.method_router())
    }
}

/// Build the trigger router for a backend with default options.
pub fn trigger_router(trigger: SharedTrigger) -> Router {
    AxumTrigger::new(trigger).router()
}

/// POST /{id}
pub async fn trigger_task(State(state): State<AxumTrigger>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();
    let task_id = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == TASK_ID_PARAM)
                .map(|(_, value)| value.to_string())
        });

    let source = AxumSource {
        task_id,
        request: Request::from_parts(parts, body),
    };

    match handle_trigger(state.trigger.as_ref(), &state.options, source).await {
        Ok(resp) => into_axum_response(resp),
        Err(rejection) => rejection.into_response(),
    }
}

fn into_axum_response(resp: TriggerResponse) -> Response {
    (resp.status, Json(resp.body)).into_response()
}

struct AxumSource {
    task_id: Option<String>,
    request: Request,
}

#[async_trait]
impl TriggerSource for AxumSource {
    type Rejection = JsonRejection;

    fn identifier(&self) -> Option<String> {
        self.task_id.clone()
    }

    async fn payload(self) -> Result<Value, JsonRejection> {
        let Json(payload) = Json::<Value>::from_request(self.request, &()).await?;
        Ok(payload)
    }
}
