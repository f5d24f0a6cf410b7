use graph_flow::{Graph, GraphBuilder, Session, Task};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::AgentRoster;
use crate::error::PipelineError;
use crate::llm::LanguageModel;
use crate::models::ReportAnalysis;
use crate::tasks::*;
use crate::tools::Toolbox;

pub const WORKFLOW_ID: &str = "blood_report_workflow";

/// Analyze → Verify → Nutrition → Exercise, every stage bound to the given roster
pub fn build_report_workflow(roster: &AgentRoster) -> Graph {
    let analyze_task = Arc::new(AnalyzeReportTask::new(roster.doctor.clone()));
    let analyze_id = analyze_task.id().to_string();

    let verify_task = Arc::new(VerifyAnalysisTask::new(roster.verifier.clone()));
    let verify_id = verify_task.id().to_string();

    let nutrition_task = Arc::new(NutritionPlanTask::new(roster.nutritionist.clone()));
    let nutrition_id = nutrition_task.id().to_string();

    let exercise_task = Arc::new(ExercisePlanTask::new(roster.exercise_specialist.clone()));
    let exercise_id = exercise_task.id().to_string();

    GraphBuilder::new(WORKFLOW_ID)
        .add_task(analyze_task)
        .add_task(verify_task)
        .add_task(nutrition_task)
        .add_task(exercise_task)
        .add_edge(&analyze_id, &verify_id)
        .add_edge(&verify_id, &nutrition_id)
        .add_edge(&nutrition_id, &exercise_id)
        .set_start_task(&analyze_id)
        .build()
}

pub async fn create_report_session(
    graph: &Graph,
    query: &str,
    pdf_path: &Path,
) -> Result<Session, PipelineError> {
    let start_task = graph.start_task_id().ok_or(PipelineError::NoResult)?;
    let session = Session::for_graph(graph.id.clone(), &start_task);

    let analysis = ReportAnalysis {
        id: Uuid::new_v4().to_string(),
        query: query.to_string(),
        pdf_path: pdf_path.to_string_lossy().into_owned(),
        ..Default::default()
    };
    session.context.set(session_keys::ANALYSIS, analysis).await;

    Ok(session)
}

/// Runs the four-stage crew for one report.
///
/// Holds only the shared model backend and tools; personas are rebuilt on
/// every [`ReportPipeline::run`] so concurrent requests never share limits.
#[derive(Clone)]
pub struct ReportPipeline {
    model: Arc<dyn LanguageModel>,
    tools: Toolbox,
}

impl ReportPipeline {
    pub fn new(model: Arc<dyn LanguageModel>, tools: Toolbox) -> Self {
        Self { model, tools }
    }

    /// Run every stage in order and return the last stage's output
    pub async fn run(&self, query: &str, pdf_path: &Path) -> Result<String, PipelineError> {
        let roster = AgentRoster::new(self.model.clone(), &self.tools, query);
        let graph = build_report_workflow(&roster);
        let mut session = create_report_session(&graph, query, pdf_path).await?;

        info!(
            session_id = %session.id,
            "Starting pipeline for query '{}' with file {}",
            query,
            pdf_path.display()
        );

        let result = graph.execute_session(&mut session).await.map_err(|e| {
            error!(
                session_id = %session.id,
                task = %session.current_task_id,
                "Pipeline stage failed: {}",
                e
            );
            e
        })?;

        info!(
            session_id = %session.id,
            task = %result.last_task_id,
            "Pipeline finished"
        );
        result.response.ok_or(PipelineError::NoResult)
    }
}
