//! Core types and structures for cogniforge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// LLM provider kind
///
/// The three dispatchable vendors plus `Custom` for kinds configured
/// before a vendor client exists for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
    Custom(String),
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Custom(kind) => kind,
        }
    }
}

impl From<&str> for ProviderKind {
    fn from(s: &str) -> Self {
        match s {
            "openai" => ProviderKind::OpenAi,
            "anthropic" => ProviderKind::Anthropic,
            "ollama" => ProviderKind::Ollama,
            other => ProviderKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for ProviderKind {
    fn from(s: String) -> Self {
        ProviderKind::from(s.as_str())
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configured connection to one LLM vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: u64,
    pub name: String,
    pub kind: ProviderKind,
    /// Opaque credential; absent for local providers like Ollama.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub enabled: bool,
    /// Higher priority wins during selection.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderRecord {
    /// Credential rendered for administrative listings: at most the first
    /// ten characters, then an ellipsis.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let prefix: String = key.chars().take(10).collect();
            format!("{}...", prefix)
        })
    }
}

/// A vendor-side model available under a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: u64,
    pub provider_id: u64,
    /// Vendor-side model identifier, e.g. "gpt-4o-mini".
    pub model_id: String,
    pub display_name: String,
    pub enabled: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// One generation round trip, as requested by a route handler
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Restrict provider selection to this kind.
    pub kind: Option<ProviderKind>,
    /// Explicit vendor-side model id, overriding the provider default.
    pub model_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind: None,
            model_id: None,
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

/// One prior conversation turn, flattened into the context block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Why a generation call produced no text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// No enabled provider matched the request.
    NoProvider,
    /// The selected provider's kind has no vendor client.
    UnsupportedKind { kind: String },
    /// The vendor call itself failed (transport, auth, rate limit, parse).
    Vendor {
        status: Option<u16>,
        message: String,
    },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoProvider => write!(f, "no active provider configured"),
            FailureReason::UnsupportedKind { kind } => {
                write!(f, "error generating response: unsupported provider kind: {}", kind)
            }
            FailureReason::Vendor { message, .. } => {
                write!(f, "error generating response: {}", message)
            }
        }
    }
}

/// Outcome of one generation round trip
///
/// The dispatcher returns this value directly: failures are data, never
/// errors, so callers have no exception path to handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    Completed { text: String },
    Failed { reason: FailureReason },
}

impl Generation {
    pub fn completed(text: impl Into<String>) -> Self {
        Generation::Completed { text: text.into() }
    }

    pub fn failed(reason: FailureReason) -> Self {
        Generation::Failed { reason }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Generation::Completed { .. })
    }

    /// Completed payload, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Generation::Completed { text } => Some(text),
            Generation::Failed { .. } => None,
        }
    }

    /// Failure reason, if any.
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Generation::Completed { .. } => None,
            Generation::Failed { reason } => Some(reason),
        }
    }

    /// Flatten to the legacy textual surface: the payload on success, the
    /// diagnostic line on failure.
    pub fn into_text(self) -> String {
        match self {
            Generation::Completed { text } => text,
            Generation::Failed { reason } => reason.to_string(),
        }
    }
}
