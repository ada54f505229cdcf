use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    config::DeepSeekConfig,
    error::{PolishError, Result},
    models::ChatCompletionRequest,
};

/// A chat completion endpoint. Returns the decoded JSON body of a 2xx answer.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, api_key: &str, request: &ChatCompletionRequest) -> Result<Value>;
}

/// DeepSeek's OpenAI-compatible `/v1/chat/completions`. One POST per call, no retries.
pub struct DeepSeekClient {
    client: Client,
    url: String,
}

impl DeepSeekClient {
    pub fn new(config: &DeepSeekConfig) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.completions_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionApi for DeepSeekClient {
    async fn complete(&self, api_key: &str, request: &ChatCompletionRequest) -> Result<Value> {
        debug!(url = %self.url, model = %request.model, "Calling completion API");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await?;
            error!(status = status.as_u16(), "Completion API returned an error");
            return Err(PolishError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
