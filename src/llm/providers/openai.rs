//! OpenAI client implementation
//!
//! Supports the OpenAI API and OpenAI-compatible endpoints behind a base
//! URL override.

use crate::error::{CogniforgeError, Result};
use crate::llm::{CompletionRequest, VendorClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_TEMPERATURE, VENDOR_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat-completion client
pub struct OpenAiClient {
    client: Client,
}

impl OpenAiClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(VENDOR_TIMEOUT)
            .build()
            .map_err(|e| CogniforgeError::network(e.to_string(), None, None))?;
        Ok(Self { client })
    }

    /// Intelligently constructs the full API URL
    fn build_url(base_url: Option<&str>, endpoint: &str) -> String {
        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/v1{}", base, endpoint)
        }
    }
}

#[async_trait]
impl VendorClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = request
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CogniforgeError::authentication("OpenAI API key is required"))?;

        let body = OpenAiRequest {
            model: request.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: request.max_tokens,
        };

        let url = Self::build_url(request.base_url.as_deref(), "/chat/completions");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CogniforgeError::network(
                    format!("Failed to connect to OpenAI API: {}", e),
                    None,
                    Some(url.clone()),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(match status.as_u16() {
                401 => CogniforgeError::authentication(
                    "Authentication failed (401). Please check your OpenAI API key",
                ),
                403 => CogniforgeError::authentication(
                    "Access forbidden (403). Your API key may not have permission for this endpoint",
                ),
                429 => CogniforgeError::rate_limit("Rate limit exceeded (429). Please try again later"),
                code => CogniforgeError::network(
                    format!("OpenAI API request failed ({}): {}", status, error_text),
                    Some(code),
                    Some(url),
                ),
            });
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| CogniforgeError::parse(e.to_string(), None))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CogniforgeError::internal("No response from OpenAI API"))
    }

    fn kind(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API structures
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}
