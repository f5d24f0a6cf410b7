use async_trait::async_trait;

use super::{ReportTool, ToolError, collapse_whitespace, preview};

/// Placeholder: echoes the start of the analysis it was given
pub struct NutritionAnalysisTool;

#[async_trait]
impl ReportTool for NutritionAnalysisTool {
    fn name(&self) -> &str {
        "Nutrition Analysis Tool"
    }

    fn description(&self) -> &str {
        "Analyzes processed blood report data for nutrition insights."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let processed = collapse_whitespace(input);
        Ok(format!(
            "Nutrition analysis functionality to be implemented for: {}...",
            preview(&processed)
        ))
    }
}
