//! Gateway configuration.
//!
//! A [`GatewayConfig`] is read once at startup (YAML file, then environment
//! overrides) and handed to the client as an immutable value. Nothing in the
//! invocation path reads process globals.

use crate::policy::RetryPolicy;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_SITE_URL: &str = "https://aorium.app";
pub const DEFAULT_SITE_NAME: &str = "Aorium";

const KEYRING_SERVICE: &str = "aorium-gateway";
const KEYRING_USER: &str = "openrouter";

/// Candidate models of the observed deployment, in priority order.
pub fn default_candidates() -> Vec<String> {
    vec![
        "deepseek/deepseek-chat-v3.1:free".to_string(),
        "mistralai/mistral-small-3.2-24b-instruct:free".to_string(),
        "meta-llama/llama-3.3-70b-instruct:free".to_string(),
    ]
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Chat-completions URL every attempt is POSTed to.
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` for provider-side attribution.
    pub site_url: String,
    /// Sent as `X-Title` for provider-side attribution.
    pub site_name: String,
    /// Ordered fallback list; the first entry is always attempted first.
    pub candidates: Vec<String>,
    pub retry: RetryPolicy,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Accept JSON wrapped in markdown fences when JSON mode is on.
    pub lenient_json: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            candidates: default_candidates(),
            retry: RetryPolicy::default(),
            timeout_secs: 30,
            proxy_url: None,
            lenient_json: false,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("candidates", &self.candidates)
            .field("retry", &self.retry)
            .field("timeout_secs", &self.timeout_secs)
            .field("proxy_url", &self.proxy_url)
            .field("lenient_json", &self.lenient_json)
            .finish()
    }
}

impl GatewayConfig {
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    /// Full startup load: optional YAML file, environment overrides, API key
    /// resolution, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let mut cfg = base.apply_env();
        cfg.resolve_api_key();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `AORIUM_*` environment overrides.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|k| std::env::var(k).ok())
    }

    pub(crate) fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AORIUM_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("AORIUM_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("AORIUM_MODELS") {
            self.candidates = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(n) = lookup("AORIUM_RETRY_MAX_ATTEMPTS").and_then(|s| s.parse::<u32>().ok()) {
            self.retry.max_attempts = n;
        }
        if let Some(ms) = lookup("AORIUM_RETRY_BASE_DELAY_MS").and_then(|s| s.parse::<u64>().ok())
        {
            self.retry.base_delay_ms = ms;
        }
        if let Some(secs) = lookup("AORIUM_HTTP_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
        if let Some(v) = lookup("AORIUM_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        if let Some(v) = lookup("AORIUM_LENIENT_JSON") {
            self.lenient_json = matches!(v.as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Fill `api_key` when neither the file nor `AORIUM_API_KEY` set it:
    /// OS keyring first, then `OPEN_ROUTER_API_KEY`.
    pub fn resolve_api_key(&mut self) {
        if self.api_key.is_some() {
            return;
        }
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(key) = entry.get_password() {
                self.api_key = Some(key);
                return;
            }
        }
        self.api_key = std::env::var("OPEN_ROUTER_API_KEY").ok();
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(Error::configuration_with_context(
                "candidate model list is empty",
                ErrorContext::new()
                    .with_field_path("candidates")
                    .with_source("config_validator"),
            ));
        }
        if let Some(i) = self.candidates.iter().position(|c| c.trim().is_empty()) {
            return Err(Error::configuration_with_context(
                "candidate model id is blank",
                ErrorContext::new()
                    .with_field_path(format!("candidates[{}]", i))
                    .with_source("config_validator"),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::configuration_with_context(
                "at least one attempt per candidate is required",
                ErrorContext::new()
                    .with_field_path("retry.max_attempts")
                    .with_source("config_validator"),
            ));
        }
        match url::Url::parse(&self.endpoint) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => {
                return Err(Error::configuration_with_context(
                    "endpoint must use http or https",
                    ErrorContext::new()
                        .with_field_path("endpoint")
                        .with_details(format!("scheme: {}", u.scheme()))
                        .with_source("config_validator"),
                ))
            }
            Err(e) => {
                return Err(Error::configuration_with_context(
                    "endpoint is not a valid URL",
                    ErrorContext::new()
                        .with_field_path("endpoint")
                        .with_details(e.to_string())
                        .with_source("config_validator"),
                ))
            }
        }
        Ok(())
    }
}
