//! Wire types for the local model's generate endpoint.
//!
//! Request: `{model, system, prompt, stream: false, format: "json", options}`.
//! The model is instructed (via `format: "json"`) to return a JSON object in
//! its `response` field matching [`ClassifierOutput`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
    pub top_p: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, system: impl Into<String>, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        GenerateRequest {
            model: model.into(),
            system: system.into(),
            prompt: prompt.into(),
            stream: false,
            format: "json".to_string(),
            options,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawDecision {
    FalsePositive,
    Block,
    Escalate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlagJudgment {
    #[serde(rename = "flagId")]
    pub flag_id: String,
    pub decision: RawDecision,
    pub reasoning: String,
}

/// Parsed contents of the model's `response` field.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierOutput {
    pub decision: RawDecision,
    #[serde(default)]
    pub flags: Vec<FlagJudgment>,
    pub confidence: f64,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_defaults_stream_and_format() {
        let req = GenerateRequest::new(
            "llama3",
            "system",
            "prompt",
            GenerateOptions { temperature: 0.0, num_predict: 512, top_p: 0.9 },
        );
        assert!(!req.stream);
        assert_eq!(req.format, "json");
    }

    #[test]
    fn classifier_output_parses_camel_case_flag_id() {
        let raw = r#"{
            "decision": "ESCALATE",
            "flags": [{"flagId": "f1", "decision": "BLOCK", "reasoning": "matches NEVER_SHARE entry"}],
            "confidence": 0.81,
            "reasoning": "payload references a blocked project"
        }"#;
        let parsed: ClassifierOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.decision, RawDecision::Escalate);
        assert_eq!(parsed.flags[0].flag_id, "f1");
        assert_eq!(parsed.flags[0].decision, RawDecision::Block);
    }

    #[test]
    fn classifier_output_defaults_flags_to_empty() {
        let raw = r#"{"decision": "FALSE_POSITIVE", "confidence": 0.95, "reasoning": "benign"}"#;
        let parsed: ClassifierOutput = serde_json::from_str(raw).unwrap();
        assert!(parsed.flags.is_empty());
    }
}
