//! Client configuration.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.trigger.dev";
pub const SECRET_KEY_ENV: &str = "TRIGGER_SECRET_KEY";
pub const API_URL_ENV: &str = "TRIGGER_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub secret_key: Option<String>,
    /// Whole-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            secret_key: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            secret_key: Some(secret_key.into()),
            timeout: None,
        }
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = lookup(SECRET_KEY_ENV).filter(|v| !v.is_empty()) {
            self.secret_key = Some(key);
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_points_at_hosted_api() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "https://api.trigger.dev");
        assert_eq!(config.secret_key, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn env_overrides_url_and_key() {
        let env: HashMap<&str, &str> = [
            ("TRIGGER_API_URL", "http://localhost:3030"),
            ("TRIGGER_SECRET_KEY", "tr_dev_123"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::default().with_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://localhost:3030");
        assert_eq!(config.secret_key.as_deref(), Some("tr_dev_123"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = ClientConfig::new("http://api", "key")
            .with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.api_url, "http://api");
        assert_eq!(config.secret_key.as_deref(), Some("key"));
    }
}
