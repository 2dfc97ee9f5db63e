//! Concept explanation flow.
//!
//! A topic goes in; a simplified explanation, a short practice quiz and
//! suggestions for further exploration come out. The model's reply is
//! validated field by field and every problem is reported, so a malformed
//! answer is never shown half-rendered.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::{FlowError, SchemaViolation};
use crate::model::Question;
use crate::session::QuizSession;
use crate::traits::{extract_json_from_markdown, FlowOptions, LlmProvider};

/// Fewest practice questions an explanation may carry.
pub const MIN_QUIZ_QUESTIONS: usize = 3;
/// Most practice questions an explanation may carry.
pub const MAX_QUIZ_QUESTIONS: usize = 5;
/// Fewest options per practice question.
pub const MIN_OPTIONS: usize = 2;

pub const EXPLAIN_SYSTEM_PROMPT: &str = "You are an AI assistant designed to help 9th-grade students understand complex topics in Physics, Chemistry, and Math. You always answer with a single JSON object and nothing else.";

/// A validated explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptExplanation {
    /// Simplified explanation, markdown.
    pub explanation: String,
    /// Practice questions, each with an explanation.
    pub quiz: Vec<Question>,
    /// Suggestions for further exploration, markdown.
    pub further_exploration: String,
}

impl ConceptExplanation {
    /// A session over the practice quiz. Practice scores are not persisted.
    pub fn practice_session(&self, topic: &str) -> QuizSession {
        QuizSession::new(format!("Practice: {topic}"), self.quiz.clone())
    }
}

/// The user prompt for `topic`.
pub fn explain_prompt(topic: &str) -> String {
    format!(
        r#"A student is struggling with the following topic:
{topic}

Provide a simplified explanation of the topic, a practice quiz to test their understanding, and suggestions for further exploration.

Respond with JSON of exactly this shape:
{{
  "explanation": "markdown text",
  "quiz": [
    {{
      "question": "text",
      "options": ["option A", "option B", "option C", "option D"],
      "answer": "the correct option, copied exactly from options",
      "explanation": "why that answer is correct"
    }}
  ],
  "furtherExploration": "markdown text"
}}

The quiz must have between {MIN_QUIZ_QUESTIONS} and {MAX_QUIZ_QUESTIONS} questions."#
    )
}

/// Ask the model to explain `topic`.
///
/// Each call is independent: no caching and no deduplication.
#[instrument(skip(provider, options), fields(model = %options.model, provider = provider.name()))]
pub async fn explain_concept(
    provider: &dyn LlmProvider,
    options: &FlowOptions,
    topic: &str,
) -> Result<ConceptExplanation, FlowError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(FlowError::InvalidInput("topic must not be empty".into()));
    }

    let request = options.request(EXPLAIN_SYSTEM_PROMPT, explain_prompt(topic), true);
    let response = provider.generate(&request).await.map_err(|e| {
        tracing::error!("explanation request failed: {e:#}");
        FlowError::Transport(format!("{e:#}"))
    })?;

    tracing::debug!(
        latency_ms = response.latency_ms,
        tokens = response.token_usage.total_tokens,
        "explanation received"
    );

    parse_explanation(&response.content).inspect_err(|e| {
        tracing::warn!("rejected explanation: {e}");
    })
}

/// Validate a raw model reply against the explanation schema.
pub fn parse_explanation(content: &str) -> Result<ConceptExplanation, FlowError> {
    let json = extract_json_from_markdown(content);
    let value: Value = serde_json::from_str(&json).map_err(|e| {
        FlowError::Schema(vec![violation("$", format!("response is not valid JSON: {e}"))])
    })?;
    let Value::Object(root) = value else {
        return Err(FlowError::Schema(vec![violation(
            "$",
            "response is not a JSON object",
        )]));
    };

    let mut violations = Vec::new();

    let explanation = required_text(&root, "explanation", "explanation", &mut violations);
    let further_exploration = required_text(
        &root,
        "furtherExploration",
        "furtherExploration",
        &mut violations,
    );

    let mut quiz = Vec::new();
    match root.get("quiz") {
        None | Some(Value::Null) => violations.push(violation("quiz", "missing")),
        Some(Value::Array(items)) => {
            if !(MIN_QUIZ_QUESTIONS..=MAX_QUIZ_QUESTIONS).contains(&items.len()) {
                violations.push(violation(
                    "quiz",
                    format!(
                        "expected {MIN_QUIZ_QUESTIONS}-{MAX_QUIZ_QUESTIONS} questions, found {}",
                        items.len()
                    ),
                ));
            }
            for (i, item) in items.iter().enumerate() {
                if let Some(q) = parse_question(item, i, &mut violations) {
                    quiz.push(q);
                }
            }
        }
        Some(_) => violations.push(violation("quiz", "expected an array")),
    }

    if !violations.is_empty() {
        return Err(FlowError::Schema(violations));
    }

    Ok(ConceptExplanation {
        explanation: explanation.unwrap_or_default(),
        quiz,
        further_exploration: further_exploration.unwrap_or_default(),
    })
}

fn parse_question(
    item: &Value,
    index: usize,
    violations: &mut Vec<SchemaViolation>,
) -> Option<Question> {
    let field = |name: &str| format!("quiz[{index}].{name}");
    let Value::Object(obj) = item else {
        violations.push(violation(format!("quiz[{index}]"), "expected an object"));
        return None;
    };
    let before = violations.len();

    let question = required_text(obj, "question", &field("question"), violations);
    let answer = required_text(obj, "answer", &field("answer"), violations);
    let explanation = required_text(obj, "explanation", &field("explanation"), violations);

    let mut options = Vec::new();
    match obj.get("options") {
        None | Some(Value::Null) => violations.push(violation(field("options"), "missing")),
        Some(Value::Array(raw)) => {
            for (j, opt) in raw.iter().enumerate() {
                match opt.as_str() {
                    Some(s) => options.push(s.to_string()),
                    None => violations.push(violation(
                        format!("quiz[{index}].options[{j}]"),
                        "expected a string",
                    )),
                }
            }
            let mut seen = HashSet::new();
            for opt in &options {
                if !seen.insert(opt.as_str()) {
                    violations.push(violation(
                        field("options"),
                        format!("repeats option {opt:?}"),
                    ));
                }
            }
            if raw.len() < MIN_OPTIONS {
                violations.push(violation(
                    field("options"),
                    format!("expected at least {MIN_OPTIONS} options, found {}", raw.len()),
                ));
            }
        }
        Some(_) => violations.push(violation(field("options"), "expected an array")),
    }

    if let Some(answer) = &answer {
        if !options.is_empty() && !options.iter().any(|o| o == answer) {
            violations.push(violation(
                field("answer"),
                format!("{answer:?} is not one of the options"),
            ));
        }
    }

    if violations.len() > before {
        return None;
    }

    Some(Question {
        question: question?,
        options,
        answer: answer?,
        explanation,
    })
}

/// A required, non-blank string field.
fn required_text(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            violations.push(violation(path, "missing"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            violations.push(violation(path, "must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(violation(path, "expected a string"));
            None
        }
    }
}

fn violation(field: impl Into<String>, message: impl Into<String>) -> SchemaViolation {
    SchemaViolation {
        field: field.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Advance, Selection};
    use crate::traits::{GenerateRequest, GenerateResponse, ModelInfo, TokenUsage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum Reply {
        Text(String),
        Fail(&'static str),
    }

    struct ScriptedProvider {
        reply: Reply,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn text(text: impl Into<String>) -> Self {
            Self {
                reply: Reply::Text(text.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                reply: Reply::Fail(message),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            assert!(request.json_output);
            match &self.reply {
                Reply::Text(text) => Ok(GenerateResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                Reply::Fail(message) => Err(anyhow::anyhow!(*message)),
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn question(q: &str, answer: &str) -> Value {
        json!({
            "question": q,
            "options": ["Mitochondria", "Chloroplast", "Nucleus", "Ribosome"],
            "answer": answer,
            "explanation": "Photosynthesis happens in the chloroplast."
        })
    }

    fn valid_response() -> Value {
        json!({
            "explanation": "Plants turn **light** into chemical energy.",
            "quiz": [
                question("Where does photosynthesis happen?", "Chloroplast"),
                question("Which organelle holds DNA?", "Nucleus"),
                question("Which organelle makes proteins?", "Ribosome"),
            ],
            "furtherExploration": "Look into the Calvin cycle."
        })
    }

    #[test]
    fn parse_valid_response() {
        let result = parse_explanation(&valid_response().to_string()).unwrap();
        assert!(result.explanation.contains("light"));
        assert_eq!(result.quiz.len(), 3);
        assert_eq!(result.quiz[0].answer, "Chloroplast");
        assert!(result.quiz[0].explanation.is_some());
        assert_eq!(result.further_exploration, "Look into the Calvin cycle.");
    }

    #[test]
    fn parse_fenced_response() {
        let content = format!("```json\n{}\n```", valid_response());
        assert!(parse_explanation(&content).is_ok());
    }

    #[test]
    fn missing_further_exploration_is_rejected() {
        let mut value = valid_response();
        value.as_object_mut().unwrap().remove("furtherExploration");
        let err = parse_explanation(&value.to_string()).unwrap_err();
        let FlowError::Schema(violations) = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "furtherExploration");
    }

    #[test]
    fn dangling_answer_is_rejected() {
        let mut value = valid_response();
        value["quiz"][1]["answer"] = json!("Golgi apparatus");
        let err = parse_explanation(&value.to_string()).unwrap_err();
        let FlowError::Schema(violations) = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert!(violations
            .iter()
            .any(|v| v.field == "quiz[1].answer" && v.message.contains("not one of the options")));
    }

    #[test]
    fn repeated_options_are_rejected() {
        let mut value = valid_response();
        value["quiz"][2]["options"] = json!(["Ribosome", "Nucleus", "Ribosome"]);
        let err = parse_explanation(&value.to_string()).unwrap_err();
        let FlowError::Schema(violations) = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "quiz[2].options");
        assert!(violations[0].message.contains("repeats option \"Ribosome\""));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let mut value = valid_response();
        value["quiz"] = json!([]);
        let err = parse_explanation(&value.to_string()).unwrap_err();
        assert!(matches!(err, FlowError::Schema(v) if v[0].field == "quiz"));
    }

    #[test]
    fn too_many_questions_is_rejected() {
        let mut value = valid_response();
        let q = question("Again?", "Nucleus");
        value["quiz"] = json!([q.clone(), q.clone(), q.clone(), q.clone(), q.clone(), q]);
        assert!(parse_explanation(&value.to_string()).is_err());
    }

    #[test]
    fn question_field_problems_are_all_reported() {
        let mut value = valid_response();
        value["quiz"][0] = json!({
            "question": "",
            "options": ["only one"],
            "answer": 3
        });
        value["explanation"] = json!(42);
        let FlowError::Schema(violations) = parse_explanation(&value.to_string()).unwrap_err()
        else {
            panic!("expected schema error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"explanation"));
        assert!(fields.contains(&"quiz[0].question"));
        assert!(fields.contains(&"quiz[0].answer"));
        assert!(fields.contains(&"quiz[0].explanation"));
        assert!(fields.contains(&"quiz[0].options"));
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(matches!(
            parse_explanation("I cannot help with that."),
            Err(FlowError::Schema(_))
        ));
        assert!(matches!(
            parse_explanation("[1, 2]"),
            Err(FlowError::Schema(_))
        ));
    }

    #[test]
    fn prompt_mentions_topic_and_shape() {
        let prompt = explain_prompt("Photosynthesis");
        assert!(prompt.contains("Photosynthesis"));
        assert!(prompt.contains("furtherExploration"));
        assert!(prompt.contains("between 3 and 5"));
    }

    #[tokio::test]
    async fn explain_returns_validated_result() {
        let provider = ScriptedProvider::text(valid_response().to_string());
        let result = explain_concept(&provider, &FlowOptions::default(), "Photosynthesis")
            .await
            .unwrap();
        assert_eq!(result.quiz.len(), 3);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn explain_surfaces_transport_failure() {
        let provider = ScriptedProvider::failing("connection refused");
        let err = explain_concept(&provider, &FlowOptions::default(), "Photosynthesis")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Transport(m) if m.contains("connection refused")));
    }

    #[tokio::test]
    async fn explain_rejects_blank_topic_without_calling_model() {
        let provider = ScriptedProvider::text(valid_response().to_string());
        let err = explain_concept(&provider, &FlowOptions::default(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn repeated_calls_are_independent() {
        let provider = ScriptedProvider::text(valid_response().to_string());
        let options = FlowOptions::default();
        let (a, b) = tokio::join!(
            explain_concept(&provider, &options, "Photosynthesis"),
            explain_concept(&provider, &options, "Photosynthesis"),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn practice_session_plays_generated_quiz() {
        let result = parse_explanation(&valid_response().to_string()).unwrap();
        let mut session = result.practice_session("Photosynthesis");
        assert_eq!(session.title(), "Practice: Photosynthesis");
        assert_eq!(
            session.select_answer("Chloroplast"),
            Selection::Recorded { correct: true }
        );
        assert_eq!(session.advance(), Ok(Advance::Next { index: 1 }));
    }
}
