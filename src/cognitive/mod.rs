//! Cognitive-task prompt builders
//!
//! Each builder renders one fixed prompt template, runs it through the
//! dispatcher, and decodes the reply into a structured value. The LLM is
//! an untrusted text generator: the requested JSON shape is a request, not
//! a guarantee, so every structured decode degrades to an empty default
//! instead of failing the enclosing request.

use crate::llm::LlmDispatcher;
use crate::types::{GenerationRequest, Turn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Node in a model card's concept map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
}

/// Directed relationship between two concept nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptMap {
    #[serde(default)]
    pub nodes: Vec<ConceptNode>,
    #[serde(default)]
    pub edges: Vec<ConceptEdge>,
}

/// Structured fields synthesized for a model card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCardDraft {
    #[serde(default)]
    pub concept_maps: ConceptMap,
    #[serde(default)]
    pub core_principles: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

/// One cross-domain migration suggestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationIdea {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub key_adaptations: String,
}

/// One step of a generated learning path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStep {
    #[serde(default)]
    pub step: u32,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Cognitive-task engine over the LLM dispatcher
#[derive(Clone)]
pub struct CognitiveEngine {
    llm: LlmDispatcher,
}

impl CognitiveEngine {
    pub fn new(llm: LlmDispatcher) -> Self {
        Self { llm }
    }

    /// Synthesize a structured model card from learning content
    pub async fn create_model_card(
        &self,
        title: &str,
        description: &str,
        associated_concepts: &[String],
    ) -> ModelCardDraft {
        let prompt = format!(
            r#"Based on the following learning content, create a structured cognitive model card:

Title: {title}
Description: {description}
Associated Concepts: {concepts}

Please generate:
1. A concept map with key nodes and relationships
2. Core principles and assumptions
3. Key examples that illustrate the model
4. Potential edge cases or limitations

Return the response as a JSON object with the following structure:
{{
    "concept_maps": {{
        "nodes": [{{"id": "x", "label": "concept name", "type": "concept/principle/example"}}],
        "edges": [{{"source": "x", "target": "y", "label": "relationship"}}]
    }},
    "core_principles": ["principle 1", "principle 2"],
    "examples": ["example 1", "example 2"],
    "limitations": ["limitation 1"]
}}"#,
            title = title,
            description = description,
            concepts = associated_concepts.join(", "),
        );

        let result = self.llm.generate(GenerationRequest::new(prompt)).await;
        decode_object(result.into_text())
    }

    /// Counter-examples and challenging questions against a user's stated
    /// understanding of a model
    pub async fn generate_counter_examples(
        &self,
        model_title: &str,
        model_concepts: &[String],
        user_response: &str,
    ) -> Vec<String> {
        let prompt = format!(
            r#"You are the Contradiction Generation Module in Model OS.

Current Model: {title}
Model Concepts: {concepts}
User's Response/Understanding: {response}

Generate 2-3 counter-examples or challenging questions that:
1. Test the boundaries of the user's understanding
2. Challenge assumptions in the model
3. Highlight potential misunderstandings

Format as a JSON array of strings, each being a counter-example or challenging question."#,
            title = model_title,
            concepts = model_concepts.join(", "),
            response = user_response,
        );

        let result = self.llm.generate(GenerationRequest::new(prompt)).await;
        decode_array(result.into_text())
    }

    /// Other domains where the model's concepts could transfer
    pub async fn suggest_migration(
        &self,
        model_title: &str,
        model_concepts: &[String],
    ) -> Vec<MigrationIdea> {
        let prompt = format!(
            r#"You are the Cross-Domain Migration Module in Model OS.

Current Model: {title}
Model Concepts: {concepts}

Suggest 2-3 other domains where this model could be applied, with brief explanations of how the concepts translate.

Return as JSON array:
[
    {{"domain": "domain name", "application": "how to apply", "key_adaptations": "what to adapt"}}
]"#,
            title = model_title,
            concepts = model_concepts.join(", "),
        );

        let result = self.llm.generate(GenerationRequest::new(prompt)).await;
        decode_array(result.into_text())
    }

    /// Step-by-step learning path toward a problem or goal
    pub async fn generate_learning_path(
        &self,
        problem_title: &str,
        problem_description: &str,
        existing_knowledge: &[String],
    ) -> Vec<LearningStep> {
        let prompt = format!(
            r#"Generate an optimized learning path for:

Problem/Goal: {title}
Description: {description}
User's Existing Knowledge: {knowledge}

Create a step-by-step learning path that:
1. Builds on existing knowledge
2. Introduces new concepts in logical order
3. Includes opportunities for model collision (testing understanding with counter-examples)

Return as JSON array of steps:
[
    {{
        "step": 1,
        "concept": "concept name",
        "description": "what to learn",
        "resources": ["resource 1", "resource 2"]
    }}
]"#,
            title = problem_title,
            description = problem_description,
            knowledge = existing_knowledge.join(", "),
        );

        let result = self.llm.generate(GenerationRequest::new(prompt)).await;
        decode_array(result.into_text())
    }

    /// Free-form feedback on a practice response; no JSON decode, the raw
    /// text (diagnostic included) flows back to the caller
    pub async fn generate_feedback(
        &self,
        user_response: &str,
        concept: &str,
        model_examples: &[String],
    ) -> String {
        let prompt = format!(
            r#"Provide feedback on the user's understanding:

Concept: {concept}
User's Response: {response}
Model Examples: {examples}

Analyze the response and provide:
1. Whether the understanding is correct
2. Specific gaps or misconceptions
3. Suggestions for improvement
4. A challenging question to test deeper understanding"#,
            concept = concept,
            response = user_response,
            examples = model_examples.join(", "),
        );

        self.llm
            .generate(GenerationRequest::new(prompt))
            .await
            .into_text()
    }

    /// Conversation turn with prior history flattened into the prompt
    pub async fn chat_reply(&self, prompt: &str, turns: &[Turn]) -> String {
        self.llm
            .generate_with_context(prompt, turns, None)
            .await
            .into_text()
    }
}

/// Trim a reply to its outermost JSON object span.
///
/// Models routinely wrap the requested JSON in prose or code fences, so
/// the decode looks only between the first `{` and the last `}`.
fn object_span(content: &str) -> &str {
    span(content, '{', '}')
}

fn array_span(content: &str) -> &str {
    span(content, '[', ']')
}

fn span(content: &str, open: char, close: char) -> &str {
    let start = content.find(open).unwrap_or(0);
    let end = content.rfind(close).map(|i| i + close.len_utf8()).unwrap_or(content.len());
    if start < end {
        &content[start..end]
    } else {
        content
    }
}

/// Decode an expected JSON object, falling back to the type's default on
/// any malformed or wrong-shape reply.
pub(crate) fn decode_object<T: DeserializeOwned + Default>(text: String) -> T {
    match serde_json::from_str(object_span(&text)) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Discarding malformed structured reply");
            T::default()
        }
    }
}

/// Decode an expected JSON array, falling back to empty on any malformed
/// or wrong-shape reply.
pub(crate) fn decode_array<T: DeserializeOwned>(text: String) -> Vec<T> {
    match serde_json::from_str(array_span(&text)) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Discarding malformed structured reply");
            Vec::new()
        }
    }
}
