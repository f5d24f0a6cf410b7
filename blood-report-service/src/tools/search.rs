use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use super::{ReportTool, ToolError};
use crate::config::SearchSettings;

const NO_RESULT: &str = "No good Google Search Result was found";

/// Google search through the Serper API
pub struct SerperSearchTool {
    client: Client,
    api_key: String,
    url: String,
}

impl SerperSearchTool {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            url: settings.url.clone(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<String, ToolError> {
        info!("Searching the web for: {}", query);

        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| ToolError::ExternalApi(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            error!("Search API returned {}", response.status());
            return Err(ToolError::ExternalApi(format!(
                "search API request failed: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::ExternalApi(format!("invalid search response: {}", e)))?;

        Ok(render_results(&body))
    }
}

#[async_trait]
impl ReportTool for SerperSearchTool {
    fn name(&self) -> &str {
        "Serper Search Tool"
    }

    fn description(&self) -> &str {
        "Performs a Google search using Serper API to find relevant information."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        self.search(input).await
    }
}

/// Turn a Serper response into the text handed to the model.
///
/// A direct answer wins, then the knowledge graph, then organic snippets.
fn render_results(body: &Value) -> String {
    let answer_box = &body["answerBox"];
    if let Some(answer) = answer_box["answer"].as_str() {
        return answer.to_string();
    }
    if let Some(snippet) = answer_box["snippet"].as_str() {
        return snippet.replace('\n', " ");
    }
    if let Some(description) = body["knowledgeGraph"]["description"].as_str() {
        return description.to_string();
    }

    let snippets: Vec<&str> = body["organic"]
        .as_array()
        .map(|results| results.iter().filter_map(|r| r["snippet"].as_str()).collect())
        .unwrap_or_default();

    if snippets.is_empty() {
        NO_RESULT.to_string()
    } else {
        snippets.join(" ")
    }
}
