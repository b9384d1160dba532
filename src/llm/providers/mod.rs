//! Vendor client implementations
//!
//! Each vendor is implemented in its own module for better organization and
//! maintainability.

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use std::time::Duration;

/// One explicit timeout for every vendor, so no call can hang past it.
pub const VENDOR_TIMEOUT: Duration = Duration::from_secs(60);

/// Creative-but-coherent sampling used on the primary generation path.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
