//! Anthropic client implementation
//!
//! Supports Anthropic's Claude API

use crate::error::{CogniforgeError, Result};
use crate::llm::{CompletionRequest, VendorClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::VENDOR_TIMEOUT;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Standing ceiling on completion tokens for message calls.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Anthropic message-completion client
pub struct AnthropicClient {
    client: Client,
}

impl AnthropicClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(VENDOR_TIMEOUT)
            .build()
            .map_err(|e| CogniforgeError::network(e.to_string(), None, None))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl VendorClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = request
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CogniforgeError::authentication("Anthropic API key is required"))?;

        let body = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let base = request
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let url = format!("{}/messages", base);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CogniforgeError::network(
                    format!("Failed to connect to Anthropic API: {}", e),
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
                    "Authentication failed (401). Please check your Anthropic API key",
                ),
                403 => CogniforgeError::authentication(
                    "Access forbidden (403). Your API key may not have permission",
                ),
                429 => CogniforgeError::rate_limit("Rate limit exceeded (429). Please try again later"),
                code => CogniforgeError::network(
                    format!("Anthropic API request failed ({}): {}", status, error_text),
                    Some(code),
                    Some(url),
                ),
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| CogniforgeError::parse(e.to_string(), None))?;

        parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| CogniforgeError::internal("No response from Anthropic API"))
    }

    fn kind(&self) -> &'static str {
        "anthropic"
    }
}

// Anthropic API structures
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}
