use serde_json::{json, Value};

/// Name of the forced function the model must call.
pub const SAVE_OPPORTUNITIES: &str = "save_opportunities";

/// OpenAI tool definition for `save_opportunities`. The argument schema
/// mirrors the `Opportunity` wire shape: three items, all sub-fields
/// required, priority constrained to the three-value enum.
pub fn save_opportunities_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": SAVE_OPPORTUNITIES,
            "description": "Saves the three generated AI opportunities to the database.",
            "parameters": {
                "type": "object",
                "properties": {
                    "opportunities": {
                        "type": "array",
                        "description": "An array of three distinct AI opportunities.",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": {
                                    "type": "string",
                                    "description": "A concise, compelling title for the opportunity."
                                },
                                "description": {
                                    "type": "string",
                                    "description": "A clear, brief description of the proposed solution."
                                },
                                "roiEstimate": {
                                    "type": "object",
                                    "properties": {
                                        "timeframe": {
                                            "type": "string",
                                            "description": "The estimated timeframe for seeing a return (e.g., \"per week\", \"per month\")."
                                        },
                                        "metric": {
                                            "type": "string",
                                            "description": "The primary metric for the ROI (e.g., \"hours saved\", \"cost reduction\")."
                                        },
                                        "value": {
                                            "type": "string",
                                            "description": "The quantifiable value of the ROI (e.g., \"10\", \"15%\")."
                                        }
                                    },
                                    "required": ["timeframe", "metric", "value"]
                                },
                                "workflowSteps": {
                                    "type": "array",
                                    "description": "A high-level list of steps to implement the solution.",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "title": {
                                                "type": "string",
                                                "description": "The title of the workflow step."
                                            },
                                            "description": {
                                                "type": "string",
                                                "description": "A brief description of the step."
                                            },
                                            "toolsRequired": {
                                                "type": "array",
                                                "items": { "type": "string" },
                                                "description": "A list of tools or software needed for this step."
                                            }
                                        },
                                        "required": ["title", "description", "toolsRequired"]
                                    }
                                },
                                "priority": {
                                    "type": "string",
                                    "enum": ["high", "medium", "low"],
                                    "description": "The priority of the opportunity based on its impact-to-effort ratio."
                                }
                            },
                            "required": ["title", "description", "roiEstimate", "workflowSteps", "priority"]
                        }
                    }
                },
                "required": ["opportunities"]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_schema_names_and_constraints() {
        let tool = save_opportunities_tool();
        assert_eq!(tool["function"]["name"], SAVE_OPPORTUNITIES);

        let items = &tool["function"]["parameters"]["properties"]["opportunities"]["items"];
        let priority_enum = items["properties"]["priority"]["enum"].as_array().unwrap();
        assert_eq!(priority_enum.len(), 3);

        let required = items["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "roiEstimate"));
        assert!(required.iter().any(|v| v == "workflowSteps"));
    }
}
