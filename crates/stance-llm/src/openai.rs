//! OpenAI chat-completions provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stance_core::{Message, Role};
use std::time::Instant;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse, RequestMetadata};

/// Model the study was fielded with
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a RequestMetadata>,
}

#[derive(Debug, PartialEq, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for WireMessage {
    /// The API has no error role: failed turns go out as assistant turns
    /// marked `[ERROR]`.
    fn from(message: &Message) -> Self {
        match message.role {
            Role::Error => Self {
                role: "assistant",
                content: format!("[ERROR] {}", message.content),
            },
            role => Self {
                role: role.as_str(),
                content: message.content.clone(),
            },
        }
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// OpenAI provider
pub struct OpenAIProvider {
    /// API key
    api_key: String,
    /// Model to use (e.g., "gpt-4-turbo")
    model: String,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at an OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            metadata: request.metadata.as_ref(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let api_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no message content in choices".to_string()))?;

        Ok(LlmResponse {
            content,
            model: api_response.model,
            tokens_used: api_response.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_turn_sent_as_assistant() {
        let wire = WireMessage::from(&Message::error("api_interface Error: timeout"));
        assert_eq!(
            wire,
            WireMessage {
                role: "assistant",
                content: "[ERROR] api_interface Error: timeout".to_string(),
            }
        );
        assert_eq!(WireMessage::from(&Message::user("hi")).role, "user");
    }

    #[test]
    fn test_request_body_shape() {
        let metadata = RequestMetadata {
            participant_id: "p-9".to_string(),
        };
        let body = OpenAIRequest {
            model: DEFAULT_MODEL,
            messages: vec![WireMessage::from(&Message::system("s"))],
            metadata: Some(&metadata),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4-turbo",
                "messages": [{"role": "system", "content": "s"}],
                "metadata": {"prolific_id": "p-9"}
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider =
            OpenAIProvider::new("k", DEFAULT_MODEL).with_base_url("http://localhost:9/");
        assert_eq!(provider.base_url, "http://localhost:9");
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAIProvider::new("sk-researcher-secret", "gpt-4o");
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("sk-researcher-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("gpt-4o"));
    }
}
