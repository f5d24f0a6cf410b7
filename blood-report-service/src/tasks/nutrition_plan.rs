use async_trait::async_trait;
use graph_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{doctor_analysis, load_analysis, render_prompt, session_keys, stage_failed};
use crate::agents::AgentPersona;

const EXPECTED_OUTPUT: &str = "A general nutrition plan (dietary advice) based on the blood report analysis, in markdown format. Be salesy in tone but avoid pushing specific products.";

pub struct NutritionPlanTask {
    nutritionist: Arc<AgentPersona>,
}

impl NutritionPlanTask {
    pub fn new(nutritionist: Arc<AgentPersona>) -> Self {
        Self { nutritionist }
    }
}

pub fn describe(doctor_analysis: &str) -> String {
    format!(
        "Based on the following factual blood report analysis: {},
        generate a general nutrition plan. Focus on balanced dietary recommendations for overall health.
        Do NOT recommend specific expensive supplements, fad diets, or make any claims of curing diseases.
        Emphasize balanced diet, adequate hydration, and nutrient-rich whole foods.",
        doctor_analysis
    )
}

#[async_trait]
impl Task for NutritionPlanTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.id());

        let mut analysis = load_analysis(&context).await?;
        let doctor_analysis = doctor_analysis(&analysis)?.to_string();

        let tool_output = self
            .nutritionist
            .use_tool(&doctor_analysis)
            .await
            .map_err(|e| stage_failed("Nutrition planning", e))?;

        let prompt = render_prompt(
            &describe(&doctor_analysis),
            EXPECTED_OUTPUT,
            self.nutritionist.tool().name(),
            &tool_output,
        );

        let plan = self
            .nutritionist
            .ask(&prompt)
            .await
            .map_err(|e| stage_failed("Nutrition planning", e))?;

        analysis.nutrition_plan = Some(plan);
        context.set(session_keys::ANALYSIS, analysis).await;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Nutrition plan drafted".to_string()),
        ))
    }
}
