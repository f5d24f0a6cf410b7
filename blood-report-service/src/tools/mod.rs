pub mod exercise;
pub mod nutrition;
pub mod pdf_report;
pub mod search;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use exercise::ExercisePlanningTool;
pub use nutrition::NutritionAnalysisTool;
pub use pdf_report::{BloodTestReportTool, collapse_whitespace, extract_report_text};
pub use search::SerperSearchTool;

use crate::config::SearchSettings;

/// Number of characters the placeholder tools echo back
pub const PREVIEW_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("File not found at {0}")]
    FileMissing(PathBuf),

    #[error("Error reading PDF file {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("External API call failed: {0}")]
    ExternalApi(String),
}

/// A narrow callable a persona may use before it answers
#[async_trait]
pub trait ReportTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> Result<String, ToolError>;
}

/// One instance of every tool, handed out to the personas configured to use them
#[derive(Clone)]
pub struct Toolbox {
    pub report_reader: Arc<dyn ReportTool>,
    pub web_search: Arc<dyn ReportTool>,
    pub nutrition: Arc<dyn ReportTool>,
    pub exercise: Arc<dyn ReportTool>,
}

impl Toolbox {
    pub fn new(search: &SearchSettings) -> Self {
        Self::with_search(Arc::new(SerperSearchTool::new(search)))
    }

    /// Standard tools with the given web search implementation
    pub fn with_search(web_search: Arc<dyn ReportTool>) -> Self {
        Self {
            report_reader: Arc::new(BloodTestReportTool),
            web_search,
            nutrition: Arc::new(NutritionAnalysisTool),
            exercise: Arc::new(ExercisePlanningTool),
        }
    }
}

/// First `PREVIEW_CHARS` characters of `text`, never splitting a code point
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
