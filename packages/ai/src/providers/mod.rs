//! LLM provider implementations of
//! [`NarrativeGenerator`](crate::NarrativeGenerator).
//!
//! Supports `OpenAI` (and compatible servers) and Anthropic.

pub mod anthropic;
pub mod openai;

use std::time::Duration;

use crate::AiError;

/// Builds an HTTP client whose requests fail after `timeout`.
fn http_client(timeout: Duration) -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AiError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_with_timeout() {
        assert!(http_client(Duration::from_secs(1)).is_ok());
    }
}
