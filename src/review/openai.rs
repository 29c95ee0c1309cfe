use async_trait::async_trait;
use tracing::{debug, instrument};

use super::types::{ChatMessage, ChatRequest, ChatResponse};
use super::{CompletionClient, ReviewError};
use crate::config::OpenAiCredentials;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// No timeout, retry or streaming: a request runs until the server answers.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(credentials: &OpenAiCredentials, model: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), credentials, model)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        credentials: &OpenAiCredentials,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    #[instrument(skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReviewError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        debug!(%url, "sending chat completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        debug!(choices = parsed.choices.len(), "received chat completion");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ReviewError::EmptyResponse)
    }
}
