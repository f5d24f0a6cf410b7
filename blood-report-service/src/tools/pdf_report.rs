use anyhow::anyhow;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ReportTool, ToolError};

/// Reads a blood test report PDF and returns its text on a single line
pub struct BloodTestReportTool;

#[async_trait]
impl ReportTool for BloodTestReportTool {
    fn name(&self) -> &str {
        "Blood Test Report Reader"
    }

    fn description(&self) -> &str {
        "Reads and extracts text content from blood test report PDFs given a file path."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        extract_report_text(input.trim()).await
    }
}

/// Extract every page of the PDF at `path`, in page order, and collapse all
/// whitespace runs to single spaces.
pub async fn extract_report_text(path: impl AsRef<Path>) -> Result<String, ToolError> {
    let path = path.as_ref().to_path_buf();

    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| extraction_error(&path, e.into()))?;
    if !exists {
        return Err(ToolError::FileMissing(path));
    }

    info!("Extracting text from PDF: {}", path.display());

    let owned = path.clone();
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
        .await
        .map_err(|e| extraction_error(&path, anyhow!("extraction task failed: {}", e)))?
        .map_err(|e| extraction_error(&path, anyhow!("{}", e)))?;

    let text = collapse_whitespace(&pages.join("\n"));
    info!(
        "Extracted {} pages ({} characters) from {}",
        pages.len(),
        text.chars().count(),
        path.display()
    );

    Ok(text)
}

fn extraction_error(path: &Path, source: anyhow::Error) -> ToolError {
    ToolError::Extraction {
        path: PathBuf::from(path),
        source,
    }
}

/// Collapse every run of whitespace (newlines included) to one space and trim both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
