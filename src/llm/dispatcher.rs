//! Generation dispatcher
//!
//! Resolves a provider and model from the registry, routes the prompt to
//! the matching vendor client, and folds every failure into a
//! [`Generation`] value. Nothing on this path returns an error or panics:
//! route handlers consume the outcome without an exception path.

use crate::error::Result;
use crate::llm::{create_client, CompletionRequest};
use crate::registry::ProviderRegistry;
use crate::types::{FailureReason, Generation, GenerationRequest, ProviderKind, Turn};
use std::time::Instant;

/// Routes generation requests to the selected provider's vendor client
#[derive(Clone)]
pub struct LlmDispatcher {
    registry: ProviderRegistry,
}

impl LlmDispatcher {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Hardcoded last-resort model id per vendor kind, used when a provider
    /// has no enabled default model and the caller gave no override.
    fn fallback_model_id(kind: &ProviderKind) -> Option<&'static str> {
        match kind {
            ProviderKind::OpenAi => Some("gpt-4o-mini"),
            ProviderKind::Anthropic => Some("claude-3-5-sonnet-20241022"),
            ProviderKind::Ollama => Some("llama3"),
            ProviderKind::Custom(_) => None,
        }
    }

    /// One generation round trip
    ///
    /// Selection order: highest-priority enabled provider matching the
    /// requested kind; explicit model override, else the provider's default
    /// model, else the per-kind fallback id.
    pub async fn generate(&self, request: GenerationRequest) -> Generation {
        let start = Instant::now();

        let provider = match self.registry.select_provider(request.kind.as_ref()) {
            Some(provider) => provider,
            None => {
                tracing::warn!(
                    kind = request.kind.as_ref().map(|k| k.as_str()).unwrap_or("any"),
                    "No active provider configured"
                );
                return Generation::failed(FailureReason::NoProvider);
            }
        };

        let client = match create_client(&provider.kind) {
            Ok(client) => client,
            Err(e) => {
                let reason = if matches!(provider.kind, ProviderKind::Custom(_)) {
                    FailureReason::UnsupportedKind {
                        kind: provider.kind.to_string(),
                    }
                } else {
                    FailureReason::Vendor {
                        status: None,
                        message: e.to_string(),
                    }
                };
                return Generation::failed(reason);
            }
        };

        let model = match request
            .model_id
            .or_else(|| {
                self.registry
                    .select_default_model(provider.id)
                    .map(|m| m.model_id)
            })
            .or_else(|| Self::fallback_model_id(&provider.kind).map(str::to_string))
        {
            Some(model) => model,
            None => {
                return Generation::failed(FailureReason::UnsupportedKind {
                    kind: provider.kind.to_string(),
                })
            }
        };

        let completion = CompletionRequest {
            prompt: request.prompt,
            model: model.clone(),
            api_key: provider.api_key.clone(),
            base_url: provider.base_url.clone(),
            max_tokens: None,
        };

        match client.complete(&completion).await {
            Ok(text) => {
                tracing::info!(
                    provider = %provider.name,
                    kind = %provider.kind,
                    model = %model,
                    duration_ms = %start.elapsed().as_millis(),
                    "Generation completed"
                );
                Generation::completed(text)
            }
            Err(e) => {
                tracing::warn!(
                    provider = %provider.name,
                    kind = %provider.kind,
                    model = %model,
                    error = %e,
                    duration_ms = %start.elapsed().as_millis(),
                    "Generation failed"
                );
                Generation::failed(FailureReason::Vendor {
                    status: e.status_code(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Generation with prior conversation turns flattened into the prompt
    pub async fn generate_with_context(
        &self,
        prompt: &str,
        turns: &[Turn],
        kind: Option<ProviderKind>,
    ) -> Generation {
        let full_prompt = compose_context(prompt, turns);
        let mut request = GenerationRequest::new(full_prompt);
        request.kind = kind;
        self.generate(request).await
    }

    /// Connectivity check for one configured provider (administrative
    /// surface; unlike `generate`, absence and failure are errors here).
    pub async fn probe(&self, provider_id: u64) -> Result<String> {
        let provider = self
            .registry
            .get_provider(provider_id)
            .ok_or_else(|| crate::error::CogniforgeError::not_found("provider", provider_id))?;

        let client = create_client(&provider.kind)?;
        let model = self
            .registry
            .select_default_model(provider.id)
            .map(|m| m.model_id)
            .or_else(|| Self::fallback_model_id(&provider.kind).map(str::to_string))
            .unwrap_or_default();

        let request = CompletionRequest {
            prompt: "Hi".to_string(),
            model,
            api_key: provider.api_key.clone(),
            base_url: provider.base_url.clone(),
            max_tokens: Some(10),
        };
        client.probe(&request).await
    }
}

/// Flatten prior turns into a single context block ahead of the prompt
///
/// Turns render as `role: content` lines in the given order.
pub fn compose_context(prompt: &str, turns: &[Turn]) -> String {
    let context: Vec<String> = turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect();

    format!(
        "Context:\n{}\n\nCurrent question: {}",
        context.join("\n"),
        prompt
    )
}
