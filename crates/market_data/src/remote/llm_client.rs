use std::time::Duration;

use async_trait::async_trait;
use common::config::LlmSettings;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::error::RemoteError;
use crate::remote::ChatCompletionResponse;
use crate::traits::{CompletionProvider, CompletionRequest};

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (NVIDIA NIM by default).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    cfg: LlmSettings,
}

impl LlmClient {
    pub fn new(cfg: LlmSettings, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, cfg })
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.cfg.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": {"type": "json_object"}
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, RemoteError> {
        let url = format!("{}/chat/completions", self.cfg.base_url);
        info!("Calling LLM at {} with model {}", self.cfg.base_url, self.cfg.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.cfg.api_key)
            .json(&self.body(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                endpoint: "chat/completions".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let completion = resp
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(completion.into_content())
    }
}
