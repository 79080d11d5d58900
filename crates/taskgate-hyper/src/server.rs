//! Standalone hyper server for the trigger handler.
//!
//! `TriggerServer` accepts connections on a TCP listener and serves
//! `POST {prefix}/{id}` through [`HyperTrigger::handle`]. Anything else
//! gets a JSON 404 or 405.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::convert::error_response;
use crate::handler::HyperTrigger;

/// HTTP server in front of a [`HyperTrigger`].
pub struct TriggerServer {
    prefix: String,
    handler: HyperTrigger,
}

impl TriggerServer {
    /// Serve `handler` under `prefix` (e.g. `/api/trigger`).
    pub fn new(prefix: &str, handler: HyperTrigger) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            handler,
        }
    }

    /// Bind to `addr` and serve until `shutdown` flips.
    pub async fn serve(self, addr: SocketAddr, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind trigger server")?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` flips.
    ///
    /// Spawns a tokio task per connection using HTTP/1.1.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let local_addr = listener.local_addr().context("listener has no local address")?;
        info!(addr = %local_addr, prefix = %self.prefix, "trigger server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer_addr) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            let backoff = accept_backoff(&e);
                            warn!(error = %e, ?backoff, "accept failed");
                            if !backoff.is_zero() {
                                tokio::time::sleep(backoff).await;
                            }
                            continue;
                        }
                    };
                    let handler = self.handler.clone();
                    let prefix = self.prefix.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let handler = handler.clone();
                            let prefix = prefix.clone();
                            async move {
                                Ok::<_, hyper::Error>(route(&prefix, &handler, req).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("trigger server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn route(prefix: &str, handler: &HyperTrigger, mut req: Request<Incoming>) -> Response<Full<Bytes>> {
    let Some(uri) = nest_uri(prefix, req.uri()) else {
        return error_response(StatusCode::NOT_FOUND, "Not Found");
    };
    if req.method() != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }
    *req.uri_mut() = uri;
    handler.handle(req).await
}

/// Pause before the next `accept()` after an error.
///
/// Errors tied to a single connection retry at once; anything else (e.g.
/// file descriptor exhaustion) waits so the loop doesn't spin.
fn accept_backoff(err: &io::Error) -> Duration {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted => Duration::ZERO,
        _ => Duration::from_millis(100),
    }
}

/// `"/api/trigger/"` → `"/api/trigger"`, `"/"` → `""`.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Path below `prefix`: `"/"` for `{prefix}` itself, `"/{segment}"` for one
/// segment below it, `None` for anything else.
fn strip_nested<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    match path.strip_prefix(prefix)? {
        "" => Some("/"),
        rest if rest.starts_with('/') && !rest[1..].contains('/') => Some(rest),
        _ => None,
    }
}

/// Rewrite `uri` relative to `prefix`, keeping the query string.
fn nest_uri(prefix: &str, uri: &Uri) -> Option<Uri> {
    let rest = strip_nested(prefix, uri.path())?;
    let path_and_query = match uri.query() {
        Some(query) => format!("{rest}?{query}"),
        None => rest.to_string(),
    };
    Uri::builder().path_and_query(path_and_query).build().ok()
}
