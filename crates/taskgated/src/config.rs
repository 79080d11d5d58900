//! taskgate.toml configuration parser.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use taskgate_client::ClientConfig;
use taskgate_client::config::DEFAULT_API_URL;
use taskgate_core::HandlerOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub client: ClientSection,
    pub handler: HandlerOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub prefix: String,
    pub framework: Framework,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            prefix: "/api/trigger".to_string(),
            framework: Framework::Axum,
        }
    }
}

/// Which adapter serves requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Axum,
    Hyper,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub api_url: Option<String>,
    pub secret_key: Option<String>,
    pub timeout: Option<String>,
}

impl GatewayConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML with the secret key masked.
    pub fn to_redacted_toml(&self) -> anyhow::Result<String> {
        let mut shown = self.clone();
        if shown.client.secret_key.is_some() {
            shown.client.secret_key = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Client settings: file values, then environment overrides via `lookup`.
    pub fn client_config(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig {
            api_url: self
                .client
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            secret_key: self.client.secret_key.clone(),
            timeout: None,
        }
        .with_env_overrides(lookup);

        if let Some(raw) = &self.client.timeout {
            let Some(timeout) = parse_duration(raw) else {
                bail!("invalid client.timeout {raw:?} (expected e.g. \"30s\", \"500ms\", \"2m\")");
            };
            config.timeout = Some(timeout);
        }
        Ok(config)
    }
}

/// Parse `"500ms"`, `"30s"`, `"2m"`, or a bare number of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
