//! The shared HTTP client and response envelope handling.

use crate::config::ClientConfig;
use graphchat_core::error::{GraphChatError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Every backend response wraps its payload in this envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// HTTP implementation of the backend API traits.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: ClientConfig,
}

impl BackendClient {
    /// Creates a client with the provided configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a client configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Sends a request and unwraps the response envelope.
    ///
    /// Distinguishes the three failure layers: transport errors keep their
    /// retryability information, non-2xx responses carry the status code, and
    /// a `success: false` envelope surfaces the backend's own message.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.timeout(self.config.request_timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GraphChatError::http_status(body, status.as_u16()));
        }

        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            GraphChatError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            }
        })?;

        if !envelope.success {
            return Err(GraphChatError::backend(
                envelope
                    .message
                    .unwrap_or_else(|| "unspecified backend failure".to_string()),
            ));
        }

        Ok(envelope.data)
    }

    /// Like [`send`](Self::send), but requires the envelope to carry data.
    pub(crate) async fn send_expecting<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        self.send(request)
            .await?
            .ok_or_else(|| GraphChatError::backend("response envelope carried no data"))
    }

    /// Like [`send`](Self::send), discarding whatever data the envelope has.
    pub(crate) async fn send_unit(&self, request: reqwest::RequestBuilder) -> Result<()> {
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
