use std::path::PathBuf;
use thiserror::Error;

use graph_flow::GraphError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Stage(#[from] GraphError),

    #[error("pipeline finished without producing a report")]
    NoResult,

    #[error("could not store uploaded report at {path}: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
