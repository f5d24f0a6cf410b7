use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::Context;

/// Execution state of one run through a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub graph_id: String,
    pub current_task_id: String,
    pub status_message: Option<String>,
    #[serde(skip)]
    pub context: Context,
}

impl Session {
    /// Start a fresh session with a random id at the graph's entry task
    pub fn for_graph(graph_id: impl Into<String>, start_task_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            graph_id: graph_id.into(),
            current_task_id: start_task_id.to_string(),
            status_message: None,
            context: Context::new(),
        }
    }
}
