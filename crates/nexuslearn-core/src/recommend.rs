//! Personalized study recommendations.
//!
//! Unlike the explanation flow this one never fails: any problem degrades to
//! [`FALLBACK_RECOMMENDATION`].

use serde::Deserialize;
use tracing::instrument;

use crate::error::{FlowError, SchemaViolation};
use crate::traits::{extract_json_from_markdown, FlowOptions, LlmProvider};

/// Shown whenever recommendations cannot be produced.
pub const FALLBACK_RECOMMENDATION: &str =
    "Sorry, I was unable to generate recommendations at this time.";

/// Grade level used when none is configured.
pub const DEFAULT_GRADE_LEVEL: u8 = 9;

pub const RECOMMEND_SYSTEM_PROMPT: &str =
    "You are an AI study assistant. You always answer with a single JSON object and nothing else.";

/// Input to the recommendation flow.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    /// e.g. "Physics: 70%, Chemistry: 50%, Math: 90%"
    pub performance_summary: String,
    pub grade_level: u8,
}

#[derive(Debug, Deserialize)]
struct RecommendationReply {
    #[serde(alias = "recommendationText")]
    recommendations: String,
}

/// The user prompt for `request`.
pub fn recommend_prompt(request: &RecommendationRequest) -> String {
    format!(
        r#"You are an AI study assistant for {grade}th grade students.

Based on the following quiz performance data, provide personalized study recommendations to the student. Be specific and actionable.

Quiz Performance Data: {data}

Respond with JSON of exactly this shape:
{{"recommendations": "your recommendations as plain text"}}"#,
        grade = request.grade_level,
        data = request.performance_summary,
    )
}

/// Validate a raw model reply; the text must be present and non-blank.
pub fn parse_recommendation(content: &str) -> Result<String, FlowError> {
    let json = extract_json_from_markdown(content);
    let reply: RecommendationReply = serde_json::from_str(&json).map_err(|e| {
        FlowError::Schema(vec![SchemaViolation {
            field: "recommendations".into(),
            message: e.to_string(),
        }])
    })?;

    let text = reply.recommendations.trim();
    if text.is_empty() {
        return Err(FlowError::Schema(vec![SchemaViolation {
            field: "recommendations".into(),
            message: "must not be empty".into(),
        }]));
    }
    Ok(text.to_string())
}

/// Recommendation text for `request`, or [`FALLBACK_RECOMMENDATION`].
#[instrument(skip_all, fields(model = %options.model, grade = request.grade_level))]
pub async fn recommend(
    provider: &dyn LlmProvider,
    options: &FlowOptions,
    request: &RecommendationRequest,
) -> String {
    let generate = options.request(RECOMMEND_SYSTEM_PROMPT, recommend_prompt(request), true);

    let response = match provider.generate(&generate).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("recommendation request failed: {e:#}");
            return FALLBACK_RECOMMENDATION.to_string();
        }
    };

    match parse_recommendation(&response.content) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("rejected recommendation: {e}");
            FALLBACK_RECOMMENDATION.to_string()
        }
    }
}
