use async_trait::async_trait;
use graph_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{doctor_analysis, load_analysis, render_prompt, session_keys, stage_failed};
use crate::agents::AgentPersona;

const EXPECTED_OUTPUT: &str = "A confirmation if the analysis is accurate and factual, or a detailed list of discrepancies found, in markdown format.";

/// Verifier checks the doctor's summary against a web search
pub struct VerifyAnalysisTask {
    verifier: Arc<AgentPersona>,
}

impl VerifyAnalysisTask {
    pub fn new(verifier: Arc<AgentPersona>) -> Self {
        Self { verifier }
    }
}

pub fn describe(doctor_analysis: &str) -> String {
    format!(
        "Verify the provided blood report analysis for factual accuracy and completeness: {}.
        Check for accuracy of extracted values and any highlighted abnormalities against common medical knowledge or general ranges.
        Confirm the summary is factual and does not contain unauthorized medical advice.",
        doctor_analysis
    )
}

pub fn search_query(user_query: &str) -> String {
    format!("blood test normal reference ranges {}", user_query)
}

#[async_trait]
impl Task for VerifyAnalysisTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.id());

        let mut analysis = load_analysis(&context).await?;
        let doctor_analysis = doctor_analysis(&analysis)?.to_string();

        let search_results = self
            .verifier
            .use_tool(&search_query(&analysis.query))
            .await
            .map_err(|e| stage_failed("Verification", e))?;

        let prompt = render_prompt(
            &describe(&doctor_analysis),
            EXPECTED_OUTPUT,
            self.verifier.tool().name(),
            &search_results,
        );

        let verification = self
            .verifier
            .ask(&prompt)
            .await
            .map_err(|e| stage_failed("Verification", e))?;

        analysis.verification = Some(verification);
        context.set(session_keys::ANALYSIS, analysis).await;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Analysis verified".to_string()),
        ))
    }
}
