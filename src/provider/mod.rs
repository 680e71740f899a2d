//! Provider adapter layer: one uniform invocation capability over
//! heterogeneous generative backends.
//!
//! Each backend (cloud-hosted or self-hosted) implements [`Provider`] once and
//! normalizes its own request/response shapes; no other component knows a
//! backend beyond its string tag. Sampling is pinned low-temperature and
//! bounded-length to keep run-to-run variance from the backend itself small —
//! this is a measurement system, not a mock.

pub mod anthropic;
pub mod google;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Fixed sampling temperature for every backend.
pub const SAMPLING_TEMPERATURE: f64 = 0.1;

/// Fixed output-length bound for every backend.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

// ============================================================================
// ProviderKind — which backend is selected
// ============================================================================

/// Supported generative backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Google,
    Ollama,
}

impl ProviderKind {
    /// Parse from the CLI/CI provider tag. Unknown tags are fatal.
    pub fn from_tag(s: &str) -> Result<Self, HarnessError> {
        match s {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            "google" => Ok(ProviderKind::Google),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(HarnessError::Configuration(format!(
                "unknown provider '{}' (available: anthropic, openai, google, ollama)",
                other
            ))),
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
        }
    }
}

// ============================================================================
// Provider trait
// ============================================================================

/// Abstraction over generative text backends.
///
/// `invoke` is the single capability the runner consumes: send a system
/// prompt plus a user prompt to a named model, get raw text back. Auth
/// failures, rate limits, network faults, and malformed responses all surface
/// as `HarnessError::Provider`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The backend's string tag, as recorded in persisted results.
    fn name(&self) -> &'static str;

    /// One bounded-wait generation call. The underlying HTTP client carries
    /// the configured per-request timeout, so an unresponsive backend cannot
    /// stall a suite indefinitely.
    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, HarnessError>;
}

// ============================================================================
// Factory
// ============================================================================

/// Create the adapter for the given backend, resolving its credential from
/// the configuration. A missing credential aborts before any generation call.
pub fn resolve_provider(
    kind: ProviderKind,
    config: &HarnessConfig,
) -> Result<Box<dyn Provider>, HarnessError> {
    let timeout = config.request_timeout;
    match kind {
        ProviderKind::Anthropic => Ok(Box::new(anthropic::AnthropicProvider::new(
            config.require_credential(kind)?.to_string(),
            timeout,
        ))),
        ProviderKind::OpenAi => Ok(Box::new(openai::OpenAiProvider::new(
            config.require_credential(kind)?.to_string(),
            timeout,
        ))),
        ProviderKind::Google => Ok(Box::new(google::GoogleProvider::new(
            config.require_credential(kind)?.to_string(),
            timeout,
        ))),
        ProviderKind::Ollama => Ok(Box::new(ollama::OllamaProvider::new(
            config.ollama_base_url.clone(),
            timeout,
        ))),
    }
}

/// Shared HTTP client construction: every adapter carries the same
/// per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("failed to build reqwest client")
}
