//! Integration tests for cogniforge

use cogniforge::cognitive::{CognitiveEngine, ModelCardDraft};
use cogniforge::llm::dispatcher::compose_context;
use cogniforge::registry::{NewModel, NewProvider, ProviderRegistry};
use cogniforge::{GenerationRequest, LlmDispatcher, ProviderKind, Turn};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn enabled_provider(kind: ProviderKind, priority: i32, base_url: Option<String>) -> NewProvider {
    NewProvider {
        name: format!("{} test", kind),
        api_key: match kind {
            ProviderKind::Ollama => None,
            _ => Some("test-key".to_string()),
        },
        kind,
        base_url,
        enabled: true,
        priority,
    }
}

/// Read one HTTP request (headers plus content-length body) off a socket,
/// returning the body bytes.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Vec<u8>> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
        if let Some(pos) = received.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&received[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while received.len() - header_end < content_length {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }

    Some(received[header_end..].to_vec())
}

async fn write_response(socket: &mut tokio::net::TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Minimal single-purpose HTTP server: consumes one request, answers with
/// the given status and body, closes.
async fn spawn_http_server(status_line: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_some() {
                    write_response(&mut socket, status_line, body).await;
                }
            });
        }
    });

    addr
}

/// Server that answers with the `model` field of the request body, so
/// tests can observe which model id the dispatcher resolved.
async fn spawn_model_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(request_body) = read_request(&mut socket).await else {
                    return;
                };
                let parsed: serde_json::Value =
                    serde_json::from_slice(&request_body).unwrap_or_default();
                let model = parsed
                    .get("model")
                    .and_then(|m| m.as_str())
                    .unwrap_or("")
                    .to_string();
                let body = serde_json::json!({ "response": model }).to_string();
                write_response(&mut socket, "200 OK", &body).await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn empty_registry_yields_no_provider_diagnostic() {
    let dispatcher = LlmDispatcher::new(ProviderRegistry::new());

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert!(!result.is_completed());
    assert_eq!(result.into_text(), "no active provider configured");
}

#[tokio::test]
async fn kind_filter_with_no_match_yields_no_provider_diagnostic() {
    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(ProviderKind::OpenAi, 5, None));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher
        .generate(GenerationRequest::new("hello").with_kind(ProviderKind::Ollama))
        .await;
    assert_eq!(result.into_text(), "no active provider configured");
}

#[tokio::test]
async fn highest_priority_provider_wins_selection() {
    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(ProviderKind::OpenAi, 5, None));
    registry.add_provider(enabled_provider(ProviderKind::Anthropic, 10, None));

    let selected = registry.select_provider(None).unwrap();
    assert_eq!(selected.kind, ProviderKind::Anthropic);
}

#[tokio::test]
async fn unreachable_vendor_is_a_value_not_a_panic() {
    let registry = ProviderRegistry::new();
    // Nothing listens on port 9; connection is refused immediately.
    registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some("http://127.0.0.1:9".to_string()),
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert!(!result.is_completed());
    assert!(result
        .into_text()
        .starts_with("error generating response:"));
}

#[tokio::test]
async fn missing_credential_is_a_value_not_a_panic() {
    let registry = ProviderRegistry::new();
    registry.add_provider(NewProvider {
        name: "keyless".to_string(),
        kind: ProviderKind::OpenAi,
        api_key: None,
        base_url: None,
        enabled: true,
        priority: 0,
    });
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    let text = result.into_text();
    assert!(text.starts_with("error generating response:"));
    assert!(text.contains("API key"));
}

#[tokio::test]
async fn custom_kind_yields_unsupported_diagnostic() {
    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(
        ProviderKind::Custom("mistral".to_string()),
        0,
        None,
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert!(result
        .into_text()
        .contains("unsupported provider kind: mistral"));
}

#[tokio::test]
async fn ollama_server_error_surfaces_status_code() {
    let addr = spawn_http_server("500 Internal Server Error", "{}").await;

    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert!(!result.is_completed());
    assert!(result.into_text().contains("500"));
}

#[tokio::test]
async fn ollama_success_extracts_response_field() {
    let addr = spawn_http_server("200 OK", r#"{"response": "Paris is the capital of France."}"#).await;

    let registry = ProviderRegistry::new();
    let provider = registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    registry
        .add_model(NewModel {
            provider_id: provider.id,
            model_id: "llama3".to_string(),
            display_name: "Llama 3".to_string(),
            enabled: true,
            is_default: true,
        })
        .unwrap();
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("capital of France?")).await;
    assert_eq!(result.into_text(), "Paris is the capital of France.");
}

#[tokio::test]
async fn ollama_empty_response_yields_placeholder() {
    let addr = spawn_http_server("200 OK", r#"{"response": ""}"#).await;

    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert_eq!(result.into_text(), "no response");
}

#[tokio::test]
async fn explicit_model_override_beats_provider_default() {
    let addr = spawn_model_echo_server().await;

    let registry = ProviderRegistry::new();
    let provider = registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    registry
        .add_model(NewModel {
            provider_id: provider.id,
            model_id: "llama3".to_string(),
            display_name: "Llama 3".to_string(),
            enabled: true,
            is_default: true,
        })
        .unwrap();
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher
        .generate(GenerationRequest::new("hello").with_model("mistral-nemo"))
        .await;
    assert_eq!(result.into_text(), "mistral-nemo");
}

#[tokio::test]
async fn default_model_is_used_when_no_override_given() {
    let addr = spawn_model_echo_server().await;

    let registry = ProviderRegistry::new();
    let provider = registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    registry
        .add_model(NewModel {
            provider_id: provider.id,
            model_id: "qwen2.5".to_string(),
            display_name: "Qwen 2.5".to_string(),
            enabled: true,
            is_default: true,
        })
        .unwrap();
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert_eq!(result.into_text(), "qwen2.5");
}

#[tokio::test]
async fn hardcoded_fallback_model_covers_bare_providers() {
    let addr = spawn_model_echo_server().await;

    let registry = ProviderRegistry::new();
    registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let result = dispatcher.generate(GenerationRequest::new("hello")).await;
    assert_eq!(result.into_text(), "llama3");
}

#[test]
fn context_block_preserves_turn_order() {
    let turns = vec![
        Turn::new("user", "first message"),
        Turn::new("assistant", "second message"),
    ];
    let composed = compose_context("third message", &turns);

    let first = composed.find("first message").unwrap();
    let second = composed.find("second message").unwrap();
    let third = composed.find("third message").unwrap();
    assert!(first < second && second < third);
    assert!(composed.contains("user: first message"));
    assert!(composed.contains("Current question: third message"));
}

#[tokio::test]
async fn builders_degrade_to_defaults_without_a_provider() {
    let engine = CognitiveEngine::new(LlmDispatcher::new(ProviderRegistry::new()));

    let card = engine
        .create_model_card("Bayes' theorem", "Updating beliefs", &["probability".to_string()])
        .await;
    assert_eq!(card, ModelCardDraft::default());

    let counters = engine
        .generate_counter_examples("Bayes' theorem", &["probability".to_string()], "it always works")
        .await;
    assert!(counters.is_empty());

    let migrations = engine
        .suggest_migration("Bayes' theorem", &["probability".to_string()])
        .await;
    assert!(migrations.is_empty());

    let path = engine
        .generate_learning_path("Learn statistics", "From scratch", &["algebra".to_string()])
        .await;
    assert!(path.is_empty());

    // The feedback builder passes text through untouched, diagnostic included.
    let feedback = engine
        .generate_feedback("my answer", "conditional probability", &["dice".to_string()])
        .await;
    assert_eq!(feedback, "no active provider configured");
}

#[tokio::test]
async fn probe_reports_ollama_connectivity() {
    let addr = spawn_http_server("200 OK", r#"{"models": []}"#).await;

    let registry = ProviderRegistry::new();
    let provider = registry.add_provider(enabled_provider(
        ProviderKind::Ollama,
        0,
        Some(format!("http://{}", addr)),
    ));
    let dispatcher = LlmDispatcher::new(registry);

    let message = dispatcher.probe(provider.id).await.unwrap();
    assert_eq!(message, "Connected to Ollama");
}

#[tokio::test]
async fn probe_of_unknown_provider_is_an_error() {
    let dispatcher = LlmDispatcher::new(ProviderRegistry::new());
    assert!(dispatcher.probe(404).await.is_err());
}
