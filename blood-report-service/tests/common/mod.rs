#![allow(dead_code)]

use async_trait::async_trait;
use blood_report_service::{
    AppState, ReportPipeline,
    llm::LanguageModel,
    tools::{ReportTool, ToolError, Toolbox},
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----blood-report-test-boundary";

/// Replies with a markdown heading naming the persona and keeps every prompt
#[derive(Default)]
pub struct ScriptedModel {
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, preamble: &str, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            anyhow::bail!("model quota exhausted");
        }
        let role = preamble.lines().next().unwrap_or_default();
        Ok(format!("## {}\nEverything looks fine.", role))
    }
}

/// Records the prompt, then never answers
#[derive(Default)]
pub struct HangingModel {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for HangingModel {
    async fn complete(&self, _preamble: &str, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        std::future::pending().await
    }
}

pub struct FakeSearch;

#[async_trait]
impl ReportTool for FakeSearch {
    fn name(&self) -> &str {
        "Serper Search Tool"
    }

    fn description(&self) -> &str {
        "offline search"
    }

    async fn call(&self, _input: &str) -> Result<String, ToolError> {
        Ok("Hemoglobin normal range is 13.2 to 16.6 g/dL".to_string())
    }
}

pub fn app_state(model: Arc<ScriptedModel>, upload_dir: &Path) -> AppState {
    app_state_with(model, upload_dir)
}

pub fn app_state_with(model: Arc<dyn LanguageModel>, upload_dir: &Path) -> AppState {
    AppState {
        pipeline: ReportPipeline::new(model, Toolbox::with_search(Arc::new(FakeSearch))),
        upload_dir: upload_dir.to_path_buf(),
    }
}

/// A one page PDF whose only text is `text`
pub fn report_pdf(dir: &Path, text: &str) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join("fixture_report.pdf");
    doc.save(&path).unwrap();
    path
}

/// Build a multipart/form-data body with optional `file` and `query` parts
pub fn multipart_body(file: Option<(&str, &[u8])>, query: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((filename, content)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(query) = query {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"query\"\r\n\r\n");
        body.extend_from_slice(query.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Files left behind in the upload directory (a missing directory counts as empty)
pub fn leftover_files(upload_dir: &Path) -> usize {
    std::fs::read_dir(upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}
