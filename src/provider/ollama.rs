//! Ollama adapter for self-hosted local models.
//!
//! Talks to the `/api/chat` endpoint with streaming disabled. Keyless; the
//! base URL comes from configuration (default `http://localhost:11434`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{provider_err, HarnessError};

use super::{http_client, Provider, MAX_OUTPUT_TOKENS, SAMPLING_TEMPERATURE};

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    stream: bool,
    messages: [ChatMessage<'a>; 2],
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

pub struct OllamaProvider {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            http: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, HarnessError> {
        let body = ChatBody {
            model,
            stream: false,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            options: ChatOptions {
                temperature: SAMPLING_TEMPERATURE,
                num_predict: MAX_OUTPUT_TOKENS,
            },
        };

        let response: ChatResponse = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(provider_err)?
            .error_for_status()
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        if response.message.content.is_empty() {
            return Err(HarnessError::Provider(
                "ollama response contained no message content".to_string(),
            ));
        }
        Ok(response.message.content)
    }
}
