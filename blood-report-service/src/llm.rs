use anyhow::anyhow;
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::openrouter;
use tracing::info;

use crate::config::ModelSettings;

/// The hosted model every persona talks to
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one prompt under the given system preamble and return the reply text
    async fn complete(&self, preamble: &str, prompt: &str) -> anyhow::Result<String>;
}

/// OpenRouter-hosted model, driven through rig
pub struct OpenRouterModel {
    client: openrouter::Client,
    model: String,
    temperature: f64,
}

impl OpenRouterModel {
    pub fn new(settings: &ModelSettings) -> Self {
        info!(
            model = %settings.model,
            temperature = settings.temperature,
            project = settings.gcp_project_id.as_deref().unwrap_or("-"),
            "Configuring language model backend"
        );
        Self {
            client: openrouter::Client::new(&settings.api_key),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenRouterModel {
    async fn complete(&self, preamble: &str, prompt: &str) -> anyhow::Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(self.temperature)
            .build();

        let response = agent
            .prompt(prompt)
            .await
            .map_err(|e| anyhow!("LLM request failed: {}", e))?;

        Ok(response)
    }
}
