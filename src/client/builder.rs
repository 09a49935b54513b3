use crate::client::core::GatewayClient;
use crate::config::GatewayConfig;
use crate::transport::{ChatTransport, HttpTransport};
use crate::Result;
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
#[derive(Default)]
pub struct GatewayClientBuilder {
    config: Option<GatewayConfig>,
    transport: Option<Arc<dyn ChatTransport>>,
    /// Override the endpoint (primarily for testing with mock servers)
    endpoint_override: Option<String>,
}

impl GatewayClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of [`GatewayConfig::default`].
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a transport. Default is an [`HttpTransport`] built from the config.
    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the chat-completions endpoint from the config.
    pub fn endpoint_override(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<GatewayClient> {
        let mut config = self.config.unwrap_or_default();
        if let Some(endpoint) = self.endpoint_override {
            config.endpoint = endpoint;
        }
        config.validate()?;

        let transport: Arc<dyn ChatTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        Ok(GatewayClient {
            config: Arc::new(config),
            transport,
        })
    }
}
