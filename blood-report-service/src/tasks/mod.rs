pub mod analyze_report;
pub mod exercise_plan;
pub mod nutrition_plan;
pub mod verify_analysis;

pub use analyze_report::AnalyzeReportTask;
pub use exercise_plan::ExercisePlanTask;
pub use nutrition_plan::NutritionPlanTask;
pub use verify_analysis::VerifyAnalysisTask;

use graph_flow::{Context, GraphError};

use crate::models::ReportAnalysis;

pub mod session_keys {
    pub const ANALYSIS: &str = "analysis";
}

pub(crate) async fn load_analysis(context: &Context) -> graph_flow::Result<ReportAnalysis> {
    context
        .get(session_keys::ANALYSIS)
        .await
        .ok_or_else(|| GraphError::ContextError("analysis not found in context".to_string()))
}

/// The doctor's output; later stages cannot run without it
pub(crate) fn doctor_analysis(analysis: &ReportAnalysis) -> graph_flow::Result<&str> {
    analysis
        .doctor_analysis
        .as_deref()
        .ok_or_else(|| GraphError::ContextError("doctor analysis not found".to_string()))
}

pub(crate) fn stage_failed(stage: &str, e: impl std::fmt::Display) -> GraphError {
    GraphError::TaskExecutionFailed(format!("{} failed: {}", stage, e))
}

/// Assemble the task prompt the way every stage presents it to its persona
pub(crate) fn render_prompt(
    description: &str,
    expected_output: &str,
    tool_name: &str,
    tool_output: &str,
) -> String {
    format!(
        "{description}\n\n\
        Result of the {tool_name}:\n{tool_output}\n\n\
        This is the expected criteria for your final answer: {expected_output}\n\
        You MUST return the actual complete content as the final answer, not a summary."
    )
}
