pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod tasks;
pub mod tools;

pub use config::Settings;
pub use error::PipelineError;
pub use models::*;
pub use pipeline::{ReportPipeline, build_report_workflow};
pub use service::{AppState, build_router, create_app};
