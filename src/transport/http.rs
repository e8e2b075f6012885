use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use super::TurnTransport;
use crate::conversation::{ConversationRequest, ConversationResponse};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1/conversation";

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TurnTransport for HttpTransport {
    async fn exchange(&self, request: &ConversationRequest) -> Result<ConversationResponse> {
        tracing::debug!(
            "Conversation request: endpoint={}, messages={}, context_keys={}",
            self.endpoint,
            request.messages.len(),
            request.shared_context.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("Failed to reach conversation endpoint")?;

        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        tracing::debug!(
            "Conversation response: status={}, body={}",
            status,
            response_text
        );

        if !status.is_success() {
            tracing::error!("Conversation API error: {} - {}", status, response_text);
            bail!("Conversation API error: {} - {}", status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse conversation response")
    }
}
