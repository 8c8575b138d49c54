//! Anthropic Claude provider implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AiError, GenerationRequest, NarrativeGenerator};

/// Anthropic Claude API provider.
///
/// Requested model IDs name `OpenAI` models, so this provider always uses
/// its own configured model.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if the HTTP client cannot be built.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AiError> {
        Ok(Self {
            api_key,
            model,
            client: super::http_client(timeout)?,
        })
    }

    fn build_request<'a>(&'a self, request: &GenerationRequest<'a>) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.user_prompt,
            }],
        }
    }
}

/// Anthropic API request body.
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic API response body.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API error response.
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

fn parse_completion(body: &str) -> Result<String, AiError> {
    let response: AnthropicResponse = serde_json::from_str(body)?;

    let text = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text),
            AnthropicContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(AiError::Provider {
            message: "No text content in Anthropic response".to_string(),
        });
    }

    Ok(text)
}

#[async_trait::async_trait]
impl NarrativeGenerator for AnthropicProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, AiError> {
        let body = self.build_request(request);

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let err: AnthropicError =
                serde_json::from_str(&text).unwrap_or_else(|_| AnthropicError {
                    error: AnthropicErrorDetail {
                        message: format!("HTTP {status}: {text}"),
                    },
                });
            return Err(AiError::Provider {
                message: err.error.message,
            });
        }

        parse_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_configured_model_and_system_field() {
        let provider = AnthropicProvider::new(
            "key".to_string(),
            "claude-sonnet-4-20250514".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = GenerationRequest {
            system_prompt: "be brief",
            user_prompt: "Reports: 0",
            model: "gpt-4-1106-preview",
            temperature: 0.7,
            max_tokens: 500,
        };

        let body = serde_json::to_value(provider.build_request(&request)).unwrap();

        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["content"], "Reports: 0");
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let body = r#"{"content":[{"type":"text","text":"One."},{"type":"thinking","thinking":"..."},{"type":"text","text":"Two."}],"stop_reason":"end_turn"}"#;
        assert_eq!(parse_completion(body).unwrap(), "One.\nTwo.");
    }

    #[test]
    fn response_without_text_is_an_error() {
        assert!(parse_completion(r#"{"content":[]}"#).is_err());
    }
}
