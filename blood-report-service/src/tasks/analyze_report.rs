use async_trait::async_trait;
use graph_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info};

use super::{load_analysis, render_prompt, session_keys, stage_failed};
use crate::agents::AgentPersona;

const EXPECTED_OUTPUT: &str = "A detailed summary of the blood report, highlighting abnormal values and their corresponding tests, in markdown format.";

/// Doctor reads the uploaded report and writes a factual summary
pub struct AnalyzeReportTask {
    doctor: Arc<AgentPersona>,
}

impl AnalyzeReportTask {
    pub fn new(doctor: Arc<AgentPersona>) -> Self {
        Self { doctor }
    }
}

pub fn describe(pdf_path: &str) -> String {
    format!(
        "Analyze the blood test report provided at {}.
        Extract all key parameters like CBC, LFT, KFT, Lipid Profile, etc., and their values.
        Note any values that are outside the normal range.
        Summarize the overall health status indicated by the report.
        Do not provide medical advice, just a factual summary of the data.",
        pdf_path
    )
}

#[async_trait]
impl Task for AnalyzeReportTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.id());

        let mut analysis = load_analysis(&context).await?;

        let report_text = self.doctor.use_tool(&analysis.pdf_path).await.map_err(|e| {
            error!("Could not read report {}: {}", analysis.pdf_path, e);
            stage_failed("Report analysis", e)
        })?;

        let prompt = render_prompt(
            &describe(&analysis.pdf_path),
            EXPECTED_OUTPUT,
            self.doctor.tool().name(),
            &report_text,
        );

        let doctor_analysis = self
            .doctor
            .ask(&prompt)
            .await
            .map_err(|e| stage_failed("Report analysis", e))?;

        info!("Doctor analysis ready ({} characters)", doctor_analysis.len());
        analysis.doctor_analysis = Some(doctor_analysis);
        context.set(session_keys::ANALYSIS, analysis).await;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Blood report analysed".to_string()),
        ))
    }
}
