//! Cogniforge - LLM provider core for a learning-assistant backend
//!
//! Routes generation requests to configured LLM vendors by priority and
//! turns structured learning content into prompts whose replies are
//! decoded tolerantly.

pub mod cognitive;
pub mod error;
pub mod llm;
pub mod registry;
pub mod tokens;
pub mod types;

// Re-export commonly used types
pub use error::{CogniforgeError, Result};
pub use types::{
    FailureReason, Generation, GenerationRequest, ModelRecord, ProviderKind, ProviderRecord, Turn,
};

// Re-export main functionality
pub use cognitive::CognitiveEngine;
pub use llm::LlmDispatcher;
pub use registry::ProviderRegistry;
pub use tokens::ResetTokenStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
