//! Conversions between hyper/http types and taskgate envelopes.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Response, StatusCode, Uri};
use http_body_util::Full;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::error;

use taskgate_core::{ErrorEnvelope, ResponseWriter, TriggerResponse};

fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// Final path segment of a URI, percent-decoded.
///
/// Returns `None` for an empty segment (`/`, `/tasks/`) or one that does
/// not decode to UTF-8.
pub fn final_segment(uri: &Uri) -> Option<String> {
    let segment = uri.path().rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return None;
    }
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Serialize `body` into a JSON response with the given status.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut resp = Response::new(Full::new(Bytes::from(bytes)));
            *resp.status_mut() = status;
            resp.headers_mut().insert(CONTENT_TYPE, application_json());
            resp
        }
        Err(e) => {
            error!(error = %e, "failed to serialize response body");
            let mut resp = Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        }
    }
}

/// Convert a trigger response into a hyper response.
pub fn into_hyper_response(resp: &TriggerResponse) -> Response<Full<Bytes>> {
    json_response(resp.status, &resp.body)
}

/// `{"error": message}` response.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &ErrorEnvelope::new(message))
}

/// Buffered response for the callback-style entry point.
///
/// Starts as an empty `200`; the handler sets the status and writes a
/// JSON body into it.
#[derive(Debug, Clone)]
pub struct LegacyResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for LegacyResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl LegacyResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut resp = Response::new(Full::new(self.body));
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp
    }
}

impl ResponseWriter for LegacyResponse {
    fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    fn json<T: Serialize + ?Sized>(&mut self, body: &T) {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.headers.insert(CONTENT_TYPE, application_json());
                self.body = Bytes::from(bytes);
            }
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.headers.remove(CONTENT_TYPE);
                self.body = Bytes::from_static(b"Internal Server Error");
            }
        }
    }
}
