use serde::{Deserialize, Serialize};

/// Structured evaluation produced once at session end.
///
/// The scoring rubric itself is delegated to the LLM; this is only the
/// structural contract. `voice_analysis` is filled in by the orchestrator
/// when delivery samples and a baseline were recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// 0 – 100.
    pub score: u32,
    pub feedback_summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    /// The single actionable next step.
    pub mission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_analysis: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_deserializes_without_optional_lists() {
        let json = r#"{
            "score": 72,
            "feedback_summary": "Solid fundamentals.",
            "mission": "Practice the STAR format for behavioral answers."
        }"#;
        let report: EvaluationReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.score, 72);
        assert!(report.strengths.is_empty());
        assert!(report.voice_analysis.is_none());
    }

    #[test]
    fn test_voice_analysis_omitted_when_absent() {
        let report = EvaluationReport {
            score: 50,
            feedback_summary: "ok".to_string(),
            strengths: vec![],
            areas_for_improvement: vec![],
            mission: "keep practicing".to_string(),
            voice_analysis: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("voice_analysis").is_none());
    }
}
