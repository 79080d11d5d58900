//! HTTP trigger backend.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use taskgate_core::{TaskTrigger, TriggerError};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Header carrying a run-scoped access token for the triggered run.
const RUN_TOKEN_HEADER: &str = "x-trigger-jwt";

#[derive(Serialize)]
struct TriggerBody<'a> {
    payload: &'a Value,
}

/// Triggers tasks through the platform's REST API.
///
/// One request per call; no retries.
#[derive(Clone)]
pub struct HttpTaskTrigger {
    client: reqwest::Client,
    base_url: Url,
    secret_key: String,
}

impl HttpTaskTrigger {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let secret_key = config
            .secret_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ClientError::MissingSecretKey)?;

        let base_url = Url::parse(&config.api_url).map_err(|e| ClientError::InvalidUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: config.api_url.clone(),
                reason: "not a base url".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            secret_key,
        })
    }

    /// `{api_url}/api/v1/tasks/{task_id}/trigger`, with `task_id` encoded as one segment.
    pub fn task_url(&self, task_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v1", "tasks", task_id, "trigger"]);
        }
        url
    }
}

#[async_trait]
impl TaskTrigger for HttpTaskTrigger {
    async fn trigger(&self, task_id: &str, payload: &Value) -> Result<Value, TriggerError> {
        let url = self.task_url(task_id);
        debug!(task_id, %url, "sending trigger request");

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .json(&TriggerBody { payload })
            .send()
            .await
            .map_err(|e| TriggerError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TriggerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let run_token = resp
            .headers()
            .get(RUN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut handle: Value = resp
            .json()
            .await
            .map_err(|e| TriggerError::InvalidHandle(e.to_string()))?;

        if let Value::Object(fields) = &mut handle {
            fields
                .entry("taskIdentifier")
                .or_insert_with(|| Value::String(task_id.to_string()));
            if let Some(token) = run_token {
                fields
                    .entry("publicAccessToken")
                    .or_insert(Value::String(token));
            }
        }

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger_for(url: &str) -> HttpTaskTrigger {
        HttpTaskTrigger::new(&ClientConfig::new(url, "tr_dev_test")).unwrap()
    }

    #[test]
    fn task_url_on_bare_host() {
        let t = trigger_for("https://api.trigger.dev");
        assert_eq!(
            t.task_url("send-email").as_str(),
            "https://api.trigger.dev/api/v1/tasks/send-email/trigger"
        );
    }

    #[test]
    fn task_url_keeps_base_path() {
        let t = trigger_for("http://proxy.internal/trigger/");
        assert_eq!(
            t.task_url("t").as_str(),
            "http://proxy.internal/trigger/api/v1/tasks/t/trigger"
        );
    }

    #[test]
    fn task_url_encodes_identifier_as_one_segment() {
        let t = trigger_for("https://api.trigger.dev");
        assert_eq!(
            t.task_url("reports/daily run").as_str(),
            "https://api.trigger.dev/api/v1/tasks/reports%2Fdaily%20run/trigger"
        );
    }

    #[test]
    fn missing_secret_key_is_rejected() {
        let config = ClientConfig::default();
        assert!(matches!(
            HttpTaskTrigger::new(&config),
            Err(ClientError::MissingSecretKey)
        ));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let config = ClientConfig::new("not a url", "key");
        assert!(matches!(
            HttpTaskTrigger::new(&config),
            Err(ClientError::InvalidUrl { .. })
        ));

        let config = ClientConfig::new("mailto:ops@example.com", "key");
        assert!(matches!(
            HttpTaskTrigger::new(&config),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
