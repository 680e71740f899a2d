//! Google Gemini `generateContent` API adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{provider_err, HarnessError};

use super::{http_client, Provider, MAX_OUTPUT_TOKENS, SAMPLING_TEMPERATURE};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GoogleProvider {
    http: reqwest::Client,
    api_key: String,
}

impl GoogleProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http: http_client(timeout),
            api_key,
        }
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, HarnessError> {
        let body = GenerateBody {
            system_instruction: Content {
                role: None,
                parts: [Part { text: system_prompt }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: user_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: SAMPLING_TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!("{}/{}:generateContent", API_BASE, model);
        let response: GenerateResponse = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(HarnessError::Provider(
                "google response contained no candidate text".to_string(),
            ));
        }
        Ok(text)
    }
}
