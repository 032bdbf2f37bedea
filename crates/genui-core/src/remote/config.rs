use std::time::Duration;

use crate::errors::GenUiError;

/// Default address of the agent's chat runnable.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/chat";

/// Configuration for the remote runnable client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the runnable; `/stream_events` is appended to it.
    pub url: String,
    /// HTTP timeout for one whole turn.
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `GENUI_API_URL` and `GENUI_TIMEOUT_SECS`, falling
    /// back to the defaults when they are unset.
    pub fn from_env() -> Result<Self, GenUiError> {
        let url = std::env::var("GENUI_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(url);
        if let Ok(raw) = std::env::var("GENUI_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GenUiError::Config(format!("GENUI_TIMEOUT_SECS must be a whole number, got {raw:?}"))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), GenUiError> {
        let url = self.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GenUiError::Config(format!(
                "remote url must be http(s), got {:?}",
                self.url
            )));
        }
        if self.timeout.is_zero() {
            return Err(GenUiError::Config("remote timeout must be non-zero".into()));
        }
        Ok(())
    }

    pub(crate) fn stream_events_url(&self) -> String {
        format!("{}/stream_events", self.url.trim().trim_end_matches('/'))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
