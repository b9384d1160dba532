//! LLM vendor integration
//!
//! One client per vendor kind behind a common trait; the dispatcher picks
//! a provider from the registry and routes the prompt to the matching
//! client.

pub mod dispatcher;
pub mod providers;

pub use dispatcher::LlmDispatcher;

use crate::error::{CogniforgeError, Result};
use crate::types::ProviderKind;
use async_trait::async_trait;

/// One vendor completion call, fully resolved
///
/// Carries everything a client needs: the provider record's credential and
/// endpoint override plus the model id chosen by the dispatcher.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Cap on completion tokens; `None` leaves the vendor default in place
    /// (OpenAI) or falls back to the standing ceiling (Anthropic).
    pub max_tokens: Option<u32>,
}

/// Core trait for all vendor clients
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// One prompt in, one completion text out.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Cheap connectivity check for the administrative "test provider"
    /// surface. Default: a tiny completion round trip.
    async fn probe(&self, request: &CompletionRequest) -> Result<String> {
        self.complete(request).await?;
        Ok("Connected successfully".to_string())
    }

    /// Vendor kind name
    fn kind(&self) -> &'static str;
}

/// Vendor kinds with a client implementation
pub fn supported_kinds() -> Vec<&'static str> {
    vec!["openai", "anthropic", "ollama"]
}

/// Create a vendor client for a provider kind
pub fn create_client(kind: &ProviderKind) -> Result<Box<dyn VendorClient>> {
    match kind {
        ProviderKind::OpenAi => Ok(Box::new(providers::OpenAiClient::new()?)),
        ProviderKind::Anthropic => Ok(Box::new(providers::AnthropicClient::new()?)),
        ProviderKind::Ollama => Ok(Box::new(providers::OllamaClient::new()?)),
        ProviderKind::Custom(kind) => Err(CogniforgeError::config(format!(
            "unsupported provider kind: {}. Supported kinds: {}",
            kind,
            supported_kinds().join(", ")
        ))),
    }
}
