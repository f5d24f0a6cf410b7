use async_trait::async_trait;

use super::{ReportTool, ToolError, preview};

/// Placeholder: echoes the start of the analysis it was given
pub struct ExercisePlanningTool;

#[async_trait]
impl ReportTool for ExercisePlanningTool {
    fn name(&self) -> &str {
        "Exercise Planning Tool"
    }

    fn description(&self) -> &str {
        "Creates an exercise plan based on blood report data."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(format!(
            "Exercise planning functionality to be implemented for: {}...",
            preview(input)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_whitespace_as_given() {
        let out = ExercisePlanningTool.call("LDL:\n  160 mg/dL").await.unwrap();
        assert_eq!(
            out,
            "Exercise planning functionality to be implemented for: LDL:\n  160 mg/dL..."
        );
    }
}
