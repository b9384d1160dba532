//! Cogniforge - LLM provider routing for a learning assistant
//!
//! A thin CLI over the library: registers providers from environment
//! variables, routes one prompt through the highest-priority provider, and
//! prints the result.

use cogniforge::registry::{NewModel, NewProvider};
use cogniforge::{
    GenerationRequest, LlmDispatcher, ProviderKind, ProviderRegistry, Result,
};
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = cogniforge::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_help();
        return Ok(());
    }

    let prompt = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "Explain the Feynman technique in two sentences.".to_string()
    };

    if let Err(e) = run(&prompt).await {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }

    Ok(())
}

async fn run(prompt: &str) -> Result<()> {
    println!("🧠 Cogniforge - LLM provider routing");
    println!("═══════════════════════════════════════");
    println!();

    let registry = ProviderRegistry::new();
    setup_providers(&registry)?;

    let dispatcher = LlmDispatcher::new(registry);

    println!("💬 Prompt: \"{}\"", prompt);
    println!("🤖 Generating...");
    println!();

    let result = dispatcher.generate(GenerationRequest::new(prompt)).await;
    if result.is_completed() {
        println!("{}", result.into_text());
    } else {
        println!("⚠️  {}", result.into_text());
    }

    Ok(())
}

/// Register providers from environment variables
///
/// DEFAULT_LLM_PROVIDER (default "openai") gets the highest priority so
/// selection prefers it when its key is present.
fn setup_providers(registry: &ProviderRegistry) -> Result<()> {
    let preferred = env::var("DEFAULT_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
    let priority_for = |kind: &str| if kind == preferred { 10 } else { 0 };

    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        let provider = registry.add_provider(NewProvider {
            name: "OpenAI".to_string(),
            kind: ProviderKind::OpenAi,
            api_key: Some(api_key),
            base_url: env::var("OPENAI_BASE_URL").ok(),
            enabled: true,
            priority: priority_for("openai"),
        });
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        registry.add_model(NewModel {
            provider_id: provider.id,
            model_id: model.clone(),
            display_name: model,
            enabled: true,
            is_default: true,
        })?;
        println!("✅ OpenAI provider configured");
    }

    if let Ok(api_key) = env::var("ANTHROPIC_API_KEY") {
        let provider = registry.add_provider(NewProvider {
            name: "Anthropic".to_string(),
            kind: ProviderKind::Anthropic,
            api_key: Some(api_key),
            base_url: env::var("ANTHROPIC_BASE_URL").ok(),
            enabled: true,
            priority: priority_for("anthropic"),
        });
        let model = env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string());
        registry.add_model(NewModel {
            provider_id: provider.id,
            model_id: model.clone(),
            display_name: model,
            enabled: true,
            is_default: true,
        })?;
        println!("✅ Anthropic provider configured");
    }

    // A local Ollama needs no credential; register it when either of its
    // variables is present.
    let ollama_base = env::var("OLLAMA_BASE_URL").ok();
    let ollama_model = env::var("OLLAMA_MODEL").ok();
    if ollama_base.is_some() || ollama_model.is_some() {
        let provider = registry.add_provider(NewProvider {
            name: "Ollama".to_string(),
            kind: ProviderKind::Ollama,
            api_key: None,
            base_url: ollama_base,
            enabled: true,
            priority: priority_for("ollama"),
        });
        let model = ollama_model.unwrap_or_else(|| "llama3".to_string());
        registry.add_model(NewModel {
            provider_id: provider.id,
            model_id: model.clone(),
            display_name: model,
            enabled: true,
            is_default: true,
        })?;
        println!("✅ Ollama provider configured");
    }

    if registry.list_providers().is_empty() {
        println!("⚠️  No providers configured - generation will return a diagnostic.");
        println!("   Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or OLLAMA_BASE_URL.");
    }
    println!();

    Ok(())
}

fn print_help() {
    println!("🧠 Cogniforge v{}", cogniforge::VERSION);
    println!();
    println!("USAGE:");
    println!("    cogniforge [PROMPT]");
    println!();
    println!("ENVIRONMENT:");
    println!("    OPENAI_API_KEY          OpenAI credential");
    println!("    OPENAI_MODEL            Default OpenAI model (gpt-4o-mini)");
    println!("    OPENAI_BASE_URL         OpenAI-compatible endpoint override");
    println!("    ANTHROPIC_API_KEY       Anthropic credential");
    println!("    ANTHROPIC_MODEL         Default Anthropic model (claude-3-5-sonnet-20241022)");
    println!("    OLLAMA_BASE_URL         Local Ollama endpoint (http://localhost:11434)");
    println!("    OLLAMA_MODEL            Default Ollama model (llama3)");
    println!("    DEFAULT_LLM_PROVIDER    Preferred provider kind (openai)");
    println!();
    println!("EXAMPLES:");
    println!("    cogniforge \"Explain spaced repetition\"");
    println!("    DEFAULT_LLM_PROVIDER=ollama cogniforge \"Summarize SQL joins\"");
}
