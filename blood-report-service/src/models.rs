use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "Summarise my Blood Test Report";

/// Everything produced for one uploaded report, carried through the pipeline context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub id: String,
    pub query: String,
    pub pdf_path: String,
    pub doctor_analysis: Option<String>,
    pub verification: Option<String>,
    pub nutrition_plan: Option<String>,
    pub exercise_plan: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub query: String,
    pub analysis: String,
    pub file_processed: String,
}

/// Blank or missing queries fall back to the default summary request
pub fn normalize_query(query: Option<&str>) -> String {
    match query {
        Some(q) if !q.trim().is_empty() => q.to_string(),
        _ => DEFAULT_QUERY.to_string(),
    }
}
