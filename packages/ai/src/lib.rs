#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Narrative generation client with LLM provider abstraction.
//!
//! Supports `OpenAI` GPT models, Anthropic Claude, and any
//! `OpenAI`-compatible local/self-hosted server (Ollama, vLLM, llama.cpp,
//! LM Studio) via the `OPENAI_BASE_URL` environment variable. A generator
//! takes a system instruction plus a user prompt and returns free-form
//! text. Calls are never retried; a failed or timed-out call surfaces as
//! an [`AiError`].

pub mod providers;

use std::time::Duration;

use thiserror::Error;

/// Default request timeout for a generation call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors that can occur during narrative generation.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the LLM provider failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// A single narrative generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRequest<'a> {
    /// Fixed instruction for the model.
    pub system_prompt: &'a str,
    /// Data to narrate.
    pub user_prompt: &'a str,
    /// Requested model ID. Providers may override it with `AI_MODEL`.
    pub model: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// Trait for narrative generators.
#[async_trait::async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generates free-form text for the given prompts.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails, times out, or the provider
    /// returns no text.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, AiError>;
}

/// Creates a narrative generator based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `OPENAI_API_KEY` set -> `OpenAI`
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
///
/// `AI_MODEL` overrides the per-report model, and `AI_TIMEOUT_SECS` sets
/// the request timeout (default 60 seconds).
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found, the
/// explicitly requested provider is not configured, or the HTTP client
/// cannot be built.
pub fn create_generator_from_env() -> Result<Box<dyn NarrativeGenerator>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());
    let model = std::env::var("AI_MODEL").ok();
    let timeout = timeout_from_env();

    match provider.to_lowercase().as_str() {
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            let base_url = std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| providers::openai::DEFAULT_BASE_URL.to_string());
            Ok(Box::new(providers::openai::OpenAiProvider::new(
                api_key, base_url, model, timeout,
            )?))
        }
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = model.unwrap_or_else(|| "claude-sonnet-4-20250514".to_string());
            Ok(Box::new(providers::anthropic::AnthropicProvider::new(
                api_key, model, timeout,
            )?))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'openai' or 'anthropic'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_generator_from_env`].
fn detect_provider() -> String {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set OPENAI_API_KEY or ANTHROPIC_API_KEY. \
         You can also set AI_PROVIDER explicitly."
    );

    // Falls through to the OpenAI arm, which reports the missing key
    "openai".to_string()
}

fn timeout_from_env() -> Duration {
    parse_timeout(std::env::var("AI_TIMEOUT_SECS").ok().as_deref())
}

fn parse_timeout(value: Option<&str>) -> Duration {
    let secs = value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl NarrativeGenerator for Echo {
        async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, AiError> {
            Ok(format!("{} | {}", request.model, request.user_prompt))
        }
    }

    #[test]
    fn timeout_falls_back_to_default() {
        assert_eq!(parse_timeout(None), Duration::from_secs(60));
        assert_eq!(parse_timeout(Some("abc")), Duration::from_secs(60));
        assert_eq!(parse_timeout(Some("0")), Duration::from_secs(60));
        assert_eq!(parse_timeout(Some(" 15 ")), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn generators_are_usable_as_trait_objects() {
        let generator: Box<dyn NarrativeGenerator> = Box::new(Echo);
        let text = generator
            .generate(&GenerationRequest {
                system_prompt: "system",
                user_prompt: "data",
                model: "gpt-4o-mini",
                temperature: 0.7,
                max_tokens: 350,
            })
            .await
            .unwrap();
        assert_eq!(text, "gpt-4o-mini | data");
    }
}
