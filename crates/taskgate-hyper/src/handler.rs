//! Trigger handler for raw hyper requests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use serde_json::Value;

use taskgate_core::{
    HandlerOptions, PayloadError, ResponseWriter, SharedTrigger, TriggerResponse, TriggerSource,
    handle_trigger,
};

use crate::convert::{final_segment, into_hyper_response};

/// Largest request body buffered before answering 413. Matches axum's `Json` default.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Trigger handler with a request→response entry point and a
/// request+writer entry point.
///
/// Cheap to clone; clones share the backend and options.
#[derive(Clone)]
pub struct HyperTrigger {
    trigger: SharedTrigger,
    options: Arc<HandlerOptions>,
    body_limit: usize,
}

impl HyperTrigger {
    pub fn new(trigger: SharedTrigger) -> Self {
        Self {
            trigger,
            options: Arc::new(HandlerOptions::default()),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Cap on buffered body bytes; larger bodies get 413.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Handle one request and return the response.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
    {
        let resp = self.dispatch(req).await;
        into_hyper_response(&resp)
    }

    /// Handle one request, writing the outcome into `res`.
    pub async fn handle_legacy<B, W>(&self, req: Request<B>, res: &mut W)
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
        W: ResponseWriter,
    {
        let resp = self.dispatch(req).await;
        resp.write_to(res);
    }

    async fn dispatch<B>(&self, req: Request<B>) -> TriggerResponse
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
    {
        let source = HyperSource {
            task_id: final_segment(req.uri()),
            body: req.into_body(),
            limit: self.body_limit,
        };
        match handle_trigger(self.trigger.as_ref(), &self.options, source).await {
            Ok(resp) => resp,
            Err(PayloadError::TooLarge(_)) => TriggerResponse::body_too_large(),
            Err(PayloadError::Read(_) | PayloadError::Parse(_)) => TriggerResponse::invalid_body(),
        }
    }
}

struct HyperSource<B> {
    task_id: Option<String>,
    body: B,
    limit: usize,
}

#[async_trait]
impl<B> TriggerSource for HyperSource<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = PayloadError;

    fn identifier(&self) -> Option<String> {
        self.task_id.clone()
    }

    async fn payload(self) -> Result<Value, PayloadError> {
        let limit = self.limit;
        let bytes = Limited::new(self.body, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    PayloadError::TooLarge(limit)
                } else {
                    PayloadError::Read(e.to_string())
                }
            })?
            .to_bytes();
        PayloadError::parse_json(&bytes)
    }
}
