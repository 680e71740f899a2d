//! Anthropic Messages API adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{provider_err, HarnessError};

use super::{http_client, Provider, MAX_OUTPUT_TOKENS, SAMPLING_TEMPERATURE};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http: http_client(timeout),
            api_key,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, HarnessError> {
        let body = MessagesBody {
            model,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
            system: system_prompt,
            messages: [Message {
                role: "user",
                content: user_prompt,
            }],
        };

        let response: MessagesResponse = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(provider_err)?
            .error_for_status()
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        let text: String = response
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(HarnessError::Provider(
                "anthropic response contained no text content".to_string(),
            ));
        }
        Ok(text)
    }
}
