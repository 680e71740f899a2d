//! Process-level configuration, resolved once at startup.
//!
//! Credentials come from the environment (or a local `.env` in dev), never
//! from test specifications, and are injected into the adapters through this
//! struct instead of being looked up ambient throughout the code.

use std::time::Duration;

use crate::error::HarnessError;
use crate::provider::ProviderKind;

/// Per-provider credentials and harness-wide knobs.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    /// Base URL of the local Ollama server (no credential needed).
    pub ollama_base_url: String,
    /// Per-request timeout for all provider calls. One unresponsive backend
    /// must not stall a suite indefinitely.
    pub request_timeout: Duration,
}

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

impl HarnessConfig {
    /// Build from the process environment. Loads `.env` first when present.
    pub fn from_env() -> Self {
        // Ignore a missing .env; CI supplies real environment variables.
        let _ = dotenvy::dotenv();

        let request_timeout = std::env::var("HARNESS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        HarnessConfig {
            anthropic_api_key: non_empty_env("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            google_api_key: non_empty_env("GOOGLE_API_KEY"),
            ollama_base_url: non_empty_env("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            request_timeout,
        }
    }

    /// The API key for a cloud provider, or a fatal configuration error when
    /// it is absent. Ollama is keyless.
    pub fn require_credential(&self, kind: ProviderKind) -> Result<&str, HarnessError> {
        let (key, var) = match kind {
            ProviderKind::Anthropic => (&self.anthropic_api_key, "ANTHROPIC_API_KEY"),
            ProviderKind::OpenAi => (&self.openai_api_key, "OPENAI_API_KEY"),
            ProviderKind::Google => (&self.google_api_key, "GOOGLE_API_KEY"),
            ProviderKind::Ollama => {
                return Err(HarnessError::Configuration(
                    "ollama requires no credential".to_string(),
                ))
            }
        };
        key.as_deref().ok_or_else(|| {
            HarnessError::Configuration(format!(
                "missing credential for provider '{}': set {}",
                kind.as_tag(),
                var
            ))
        })
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> HarnessConfig {
        HarnessConfig {
            anthropic_api_key: None,
            openai_api_key: None,
            google_api_key: None,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn missing_credential_is_fatal_configuration_error() {
        let config = empty_config();
        let err = config.require_credential(ProviderKind::Anthropic).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn present_credential_resolves() {
        let config = HarnessConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..empty_config()
        };
        assert_eq!(
            config.require_credential(ProviderKind::OpenAi).unwrap(),
            "sk-test"
        );
    }
}
