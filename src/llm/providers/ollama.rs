//! Ollama client implementation
//!
//! Supports a local Ollama server's HTTP API

use crate::error::{CogniforgeError, Result};
use crate::llm::{CompletionRequest, VendorClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::VENDOR_TIMEOUT;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Connectivity checks against a local server should fail fast.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama client for local LLM inference
pub struct OllamaClient {
    client: Client,
}

impl OllamaClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(VENDOR_TIMEOUT)
            .build()
            .map_err(|e| CogniforgeError::network(e.to_string(), None, None))?;
        Ok(Self { client })
    }

    fn base_url(request: &CompletionRequest) -> String {
        request
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

#[async_trait]
impl VendorClient for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
        };

        let url = format!("{}/api/generate", Self::base_url(request));
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CogniforgeError::network(
                    format!("Failed to connect to Ollama: {}", e),
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

            let message = match status.as_u16() {
                404 => format!(
                    "Model '{}' not found. Please pull the model first: ollama pull {}",
                    request.model, request.model
                ),
                500..=599 => format!("Ollama server error ({}). Make sure Ollama is running", status),
                _ => format!("Ollama API request failed ({}): {}", status, error_text),
            };
            return Err(CogniforgeError::network(message, Some(status.as_u16()), Some(url)));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| CogniforgeError::parse(e.to_string(), None))?;

        if parsed.response.is_empty() {
            Ok("no response".to_string())
        } else {
            Ok(parsed.response)
        }
    }

    async fn probe(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/api/tags", Self::base_url(request));
        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                CogniforgeError::network(
                    format!("Failed to connect to Ollama: {}", e),
                    None,
                    Some(url.clone()),
                )
            })?;

        if response.status().is_success() {
            Ok("Connected to Ollama".to_string())
        } else {
            Err(CogniforgeError::network(
                format!("Ollama returned {}", response.status()),
                Some(response.status().as_u16()),
                Some(url),
            ))
        }
    }

    fn kind(&self) -> &'static str {
        "ollama"
    }
}

// Ollama API structures
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}
