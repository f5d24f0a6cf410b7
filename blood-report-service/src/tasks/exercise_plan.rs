use async_trait::async_trait;
use graph_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{doctor_analysis, load_analysis, render_prompt, session_keys, stage_failed};
use crate::agents::AgentPersona;

const EXPECTED_OUTPUT: &str = "A general exercise recommendation based on the blood report analysis, in markdown format. Avoid pushing extreme fitness regimens.";

/// Final stage: its output is what the caller receives
pub struct ExercisePlanTask {
    exercise_specialist: Arc<AgentPersona>,
}

impl ExercisePlanTask {
    pub fn new(exercise_specialist: Arc<AgentPersona>) -> Self {
        Self {
            exercise_specialist,
        }
    }
}

pub fn describe(doctor_analysis: &str) -> String {
    format!(
        "Based on the following factual blood report analysis: {},
        create a general exercise recommendation. Focus on safe, moderate physical activity for overall well-being.
        Do NOT recommend extreme or high-intensity exercises (like CrossFit) or make any claims of curing diseases.
        Emphasize consistency, warm-up, cool-down, listening to one's body, and general fitness for well-being.",
        doctor_analysis
    )
}

#[async_trait]
impl Task for ExercisePlanTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.id());

        let mut analysis = load_analysis(&context).await?;
        let doctor_analysis = doctor_analysis(&analysis)?.to_string();

        let tool_output = self
            .exercise_specialist
            .use_tool(&doctor_analysis)
            .await
            .map_err(|e| stage_failed("Exercise planning", e))?;

        let prompt = render_prompt(
            &describe(&doctor_analysis),
            EXPECTED_OUTPUT,
            self.exercise_specialist.tool().name(),
            &tool_output,
        );

        let plan = self
            .exercise_specialist
            .ask(&prompt)
            .await
            .map_err(|e| stage_failed("Exercise planning", e))?;

        analysis.exercise_plan = Some(plan.clone());
        context.set(session_keys::ANALYSIS, analysis).await;

        Ok(TaskResult::new_with_status(
            Some(plan),
            NextAction::End,
            Some("Blood report analysis completed".to_string()),
        ))
    }
}
