use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::db::models::Opportunity;
use crate::engine::prompt::{self, OPPORTUNITY_SYSTEM_PROMPT};
use crate::engine::tools::{save_opportunities_tool, SAVE_OPPORTUNITIES};
use crate::error::AppError;
use crate::validation::SurveySubmission;

/// Generic user-facing message for any generation failure. Detail goes to
/// the server log, never to the client.
pub const GENERATION_FAILED: &str = "Failed to generate AI opportunities.";

/// Raw outcome of a forced-tool chat completion, before the tool-call
/// payload is validated.
#[derive(Debug, Clone)]
pub struct ChatToolResponse {
    /// Name of the function the model called, if it called one.
    pub tool_name: Option<String>,
    /// JSON-encoded arguments of the tool call.
    pub arguments: Option<String>,
    /// Total token usage reported by the provider.
    pub tokens_used: i64,
}

/// Chat-completions client capable of a forced function call. Injected into
/// the pipeline so tests can substitute a double.
#[async_trait]
pub trait ChatToolClient: Send + Sync {
    /// Send system + user messages, forcing a call to `save_opportunities`.
    async fn complete_forced_tool(
        &self,
        system: &str,
        user: &str,
    ) -> Result<ChatToolResponse, AppError>;

    /// Model identifier for logging.
    fn model(&self) -> &str;
}

// ============================================================================
// OpenAI client
// ============================================================================

pub struct OpenAiClient {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatToolClient for OpenAiClient {
    async fn complete_forced_tool(
        &self,
        system: &str,
        user: &str,
    ) -> Result<ChatToolResponse, AppError> {
        let url = "https://api.openai.com/v1/chat/completions";

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "tools": [save_opportunities_tool()],
            "tool_choice": {
                "type": "function",
                "function": { "name": SAVE_OPPORTUNITIES },
            },
        });

        tracing::debug!(model = %self.model, "Calling OpenAI chat completions");

        let resp = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("OpenAI request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "OpenAI chat API error ({status}): {error_text}"
            )));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("OpenAI response not JSON: {e}")))?;

        let tool_name = json
            .pointer("/choices/0/message/tool_calls/0/function/name")
            .and_then(|v| v.as_str())
            .map(String::from);
        let arguments = json
            .pointer("/choices/0/message/tool_calls/0/function/arguments")
            .and_then(|v| v.as_str())
            .map(String::from);
        let tokens_used = json
            .pointer("/usage/total_tokens")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(ChatToolResponse {
            tool_name,
            arguments,
            tokens_used,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Generation
// ============================================================================

/// A successful generation plus the instrumentation the AI log wants.
#[derive(Debug, Clone)]
pub struct Generation {
    pub opportunities: Vec<Opportunity>,
    pub prompt: String,
    pub raw_arguments: String,
    pub model: String,
    pub tokens_used: i64,
    pub duration_ms: i64,
}

#[derive(Deserialize)]
struct SaveOpportunitiesArgs {
    opportunities: Vec<Opportunity>,
}

/// Generate exactly three opportunities for a validated survey, or fail.
///
/// Every failure mode (transport, missing/wrong tool call, unparseable
/// arguments, wrong item count) collapses to `AppError::Generation` with a
/// generic message; the specific cause is logged server-side. No retries,
/// no partial results.
pub async fn generate_opportunities(
    client: &dyn ChatToolClient,
    survey: &SurveySubmission,
) -> Result<Generation, AppError> {
    let user = prompt::user_content(survey);
    let started = std::time::Instant::now();

    let response = client
        .complete_forced_tool(OPPORTUNITY_SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| {
            tracing::error!("Opportunity generation call failed: {e}");
            AppError::Generation(GENERATION_FAILED.into())
        })?;

    let duration_ms = started.elapsed().as_millis() as i64;

    if response.tool_name.as_deref() != Some(SAVE_OPPORTUNITIES) {
        tracing::error!(
            tool = ?response.tool_name,
            "Invalid model response: expected a tool call to save_opportunities"
        );
        return Err(AppError::Generation(GENERATION_FAILED.into()));
    }

    let raw_arguments = response.arguments.unwrap_or_default();
    let args: SaveOpportunitiesArgs = serde_json::from_str(&raw_arguments).map_err(|e| {
        tracing::error!("Invalid model response: unparseable tool arguments: {e}");
        AppError::Generation(GENERATION_FAILED.into())
    })?;

    if args.opportunities.len() != 3 {
        tracing::error!(
            count = args.opportunities.len(),
            "Invalid model response: expected an array of 3 opportunities"
        );
        return Err(AppError::Generation(GENERATION_FAILED.into()));
    }

    // Returned verbatim; the schema-constrained output is trusted beyond
    // shape validation.
    Ok(Generation {
        opportunities: args.opportunities,
        prompt: format!("{OPPORTUNITY_SYSTEM_PROMPT}\n\n{user}"),
        raw_arguments,
        model: client.model().to_string(),
        tokens_used: response.tokens_used,
        duration_ms,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::db::models::Priority;

    fn survey() -> SurveySubmission {
        SurveySubmission {
            email: "a@b.com".into(),
            initiative: "Streamline Onboarding".into(),
            challenge: "Manual data entry across three tools wastes hours daily".into(),
            systems: vec!["CRM (Salesforce, HubSpot)".into()],
            value: "Save 10 hours/week".into(),
            contact_preference: None,
        }
    }

    #[tokio::test]
    async fn returns_three_opportunities_on_valid_tool_call() {
        let client = FakeChatClient::three_valid();
        let generation = generate_opportunities(&client, &survey()).await.unwrap();
        assert_eq!(generation.opportunities.len(), 3);
        assert_eq!(generation.opportunities[0].priority, Priority::High);
        assert_eq!(generation.model, "fake-model");
        assert!(generation.prompt.contains("Streamline Onboarding"));
    }

    #[tokio::test]
    async fn fails_when_no_tool_call_present() {
        let client = FakeChatClient {
            response: Ok(ChatToolResponse {
                tool_name: None,
                arguments: None,
                tokens_used: 10,
            }),
        };
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(err.to_string(), format!("Generation error: {GENERATION_FAILED}"));
    }

    #[tokio::test]
    async fn fails_on_wrong_tool_name() {
        let client = FakeChatClient {
            response: Ok(ChatToolResponse {
                tool_name: Some("something_else".into()),
                arguments: Some(three_valid_args()),
                tokens_used: 10,
            }),
        };
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn fails_on_unparseable_arguments() {
        let client = FakeChatClient::with_opportunities("not json at all");
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn fails_when_count_is_not_three() {
        let args = serde_json::json!({
            "opportunities": [opportunity_json("only"), opportunity_json("two")]
        })
        .to_string();
        let client = FakeChatClient::with_opportunities(&args);
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn fails_on_out_of_enum_priority() {
        let mut opp = opportunity_json("bad priority");
        opp["priority"] = serde_json::json!("urgent");
        let args = serde_json::json!({
            "opportunities": [opp, opportunity_json("b"), opportunity_json("c")]
        })
        .to_string();
        let client = FakeChatClient::with_opportunities(&args);
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn transport_errors_collapse_to_generic_message() {
        let client = FakeChatClient {
            response: Err("connection refused".into()),
        };
        let err = generate_opportunities(&client, &survey()).await.unwrap_err();
        let AppError::Generation(msg) = err else {
            panic!("expected Generation");
        };
        assert_eq!(msg, GENERATION_FAILED);
    }
}
