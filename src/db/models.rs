use serde::{Deserialize, Serialize};

// ============================================================================
// Profile — user identity keyed by email
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Blueprint — one survey submission plus its (eventually) generated
// opportunities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: String,
    pub profile_id: String,
    pub initiative: String,
    pub challenge: String,
    pub systems: Vec<String>,
    pub value: String,
    /// None until generation succeeds, then exactly three opportunities.
    pub opportunities: Option<Vec<Opportunity>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Priority of an opportunity by impact-to-effort ratio. Closed enum: any
/// other value in a model response fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiEstimate {
    /// Quantifiable value, e.g. "10" or "15%".
    pub value: String,
    /// Primary metric, e.g. "hours saved", "cost reduction".
    pub metric: String,
    /// Timeframe for the return, e.g. "per week".
    pub timeframe: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub title: String,
    pub description: String,
    pub tools_required: Vec<String>,
}

/// One AI-recommended workflow improvement. Field names match the
/// `save_opportunities` tool schema on the wire (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub title: String,
    pub description: String,
    pub roi_estimate: RoiEstimate,
    pub workflow_steps: Vec<WorkflowStep>,
    pub priority: Priority,
}

// ============================================================================
// AI call log — instrumentation for each generation attempt
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AiLog {
    pub id: String,
    pub blueprint_id: String,
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub tokens_used: i64,
    pub cost_estimate: f64,
    pub duration_ms: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateAiLogInput {
    pub blueprint_id: String,
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub tokens_used: i64,
    pub cost_estimate: f64,
    pub duration_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opportunity_round_trips_camel_case() {
        let json = r#"{
            "title": "Automate data entry",
            "description": "Sync the CRM with the billing tool",
            "roiEstimate": {"value": "10", "metric": "hours saved", "timeframe": "per week"},
            "workflowSteps": [
                {"title": "Map fields", "description": "Match CRM fields to billing", "toolsRequired": ["Zapier"]}
            ],
            "priority": "high"
        }"#;
        let opp: Opportunity = serde_json::from_str(json).unwrap();
        assert_eq!(opp.priority, Priority::High);
        assert_eq!(opp.roi_estimate.metric, "hours saved");
        assert_eq!(opp.workflow_steps[0].tools_required, vec!["Zapier"]);

        let back = serde_json::to_value(&opp).unwrap();
        assert!(back.get("roiEstimate").is_some());
        assert!(back.get("workflowSteps").is_some());
        assert_eq!(back["priority"], "high");
    }

    #[test]
    fn unknown_priority_fails_deserialization() {
        let result: Result<Priority, _> = serde_json::from_str(r#""urgent""#);
        assert!(result.is_err());
    }
}
