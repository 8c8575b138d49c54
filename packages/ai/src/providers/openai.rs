//! `OpenAI` chat completions provider implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AiError, GenerationRequest, NarrativeGenerator};

/// Base URL of the hosted `OpenAI` API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model_override: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    ///
    /// `base_url` may point at any `OpenAI`-compatible server. When
    /// `model_override` is set it replaces the model requested per call.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if the HTTP client cannot be built.
    pub fn new(
        api_key: String,
        base_url: String,
        model_override: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_override,
            client: super::http_client(timeout)?,
        })
    }

    fn build_request<'a>(&'a self, request: &GenerationRequest<'a>) -> OpenAiRequest<'a> {
        OpenAiRequest {
            model: self.model_override.as_deref().unwrap_or(request.model),
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                OpenAiMessage {
                    role: "user",
                    content: request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Extracts the completion text from a successful response body.
fn parse_completion(body: &str) -> Result<String, AiError> {
    let response: OpenAiResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AiError::Provider {
            message: "No completion text in OpenAI response".to_string(),
        })
}

/// Extracts the error message from a failed response body.
fn parse_error(status: reqwest::StatusCode, body: &str) -> AiError {
    let err: OpenAiError = serde_json::from_str(body).unwrap_or_else(|_| OpenAiError {
        error: OpenAiErrorDetail {
            message: format!("HTTP {status}: {body}"),
        },
    });
    AiError::Provider {
        message: err.error.message,
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, AiError> {
        let body = self.build_request(request);
        log::debug!(
            "Requesting {} completion ({} max tokens)",
            body.model,
            body.max_tokens
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(parse_error(status, &text));
        }

        parse_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(model_override: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(
            "key".to_string(),
            "http://localhost:11434/v1/".to_string(),
            model_override.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> GenerationRequest<'static> {
        GenerationRequest {
            system_prompt: "be brief",
            user_prompt: "Reports: 3",
            model: "gpt-4o-mini",
            temperature: 0.7,
            max_tokens: 350,
        }
    }

    #[test]
    fn request_carries_prompts_and_settings() {
        let provider = provider(None);
        let body = serde_json::to_value(provider.build_request(&request())).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 350);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Reports: 3");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn model_override_replaces_requested_model() {
        let provider = provider(Some("llama3"));
        let body = serde_json::to_value(provider.build_request(&request())).unwrap();
        assert_eq!(body["model"], "llama3");
    }

    #[test]
    fn parses_completion_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"All good."},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "All good.");
    }

    #[test]
    fn empty_completion_is_an_error() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(matches!(parse_completion(body), Err(AiError::Provider { .. })));
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(AiError::Provider { .. })
        ));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let err = parse_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        );
        assert_eq!(err.to_string(), "Provider error: Rate limit reached");

        let err = parse_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));
    }
}
