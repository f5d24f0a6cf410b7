use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::{
    context::Context,
    error::{GraphError, Result},
    session::Session,
    task::{NextAction, Task, TaskResult},
};

/// Edge between tasks in the graph
#[derive(Clone, Debug)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A graph of tasks that can be executed
pub struct Graph {
    pub id: String,
    tasks: DashMap<String, Arc<dyn Task>>,
    edges: Mutex<Vec<Edge>>,
    start_task_id: Mutex<Option<String>>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: DashMap::new(),
            edges: Mutex::new(Vec::new()),
            start_task_id: Mutex::new(None),
        }
    }

    /// Add a task to the graph. The first task added becomes the start task.
    pub fn add_task(&self, task: Arc<dyn Task>) -> &Self {
        let task_id = task.id().to_string();
        let is_first = self.tasks.is_empty();
        self.tasks.insert(task_id.clone(), task);

        if is_first {
            if let Ok(mut start) = self.start_task_id.lock() {
                *start = Some(task_id);
            }
        }

        self
    }

    /// Set the starting task; ignored when the task is unknown
    pub fn set_start_task(&self, task_id: impl Into<String>) -> &Self {
        let task_id = task_id.into();
        if self.tasks.contains_key(&task_id) {
            if let Ok(mut start) = self.start_task_id.lock() {
                *start = Some(task_id);
            }
        }
        self
    }

    /// Add an edge between tasks
    pub fn add_edge(&self, from: impl Into<String>, to: impl Into<String>) -> &Self {
        if let Ok(mut edges) = self.edges.lock() {
            edges.push(Edge {
                from: from.into(),
                to: to.into(),
            });
        }
        self
    }

    /// Run the session's current task and keep going for as long as tasks
    /// ask for `ContinueAndExecute`.
    ///
    /// The first failing task aborts the run: its error is returned and no
    /// later task is executed. `session.current_task_id` is left pointing at
    /// the failing task.
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        loop {
            let result = self
                .execute_single_task(&session.current_task_id, session.context.clone())
                .await?;

            session.status_message = result.status_message.clone();

            match result.next_action {
                NextAction::ContinueAndExecute => match self.find_next_task(&result.task_id) {
                    Some(next_task_id) => {
                        debug!(from = %result.task_id, to = %next_task_id, "advancing");
                        session.current_task_id = next_task_id;
                    }
                    None => {
                        // Nowhere left to go: the chain ran off the end of the graph
                        return Ok(ExecutionResult {
                            response: result.response,
                            last_task_id: result.task_id,
                        });
                    }
                },
                NextAction::End => {
                    info!(graph = %self.id, task = %result.task_id, "graph execution completed");
                    return Ok(ExecutionResult {
                        response: result.response,
                        last_task_id: result.task_id,
                    });
                }
            }
        }
    }

    /// Execute a single task without following its next action
    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        debug!(task = %task_id, "running task");
        let mut result = task.run(context).await?;

        // Set the task_id in the result to track which task generated it
        result.task_id = task_id.to_string();

        Ok(result)
    }

    /// Find the task that follows `current_task_id`
    pub fn find_next_task(&self, current_task_id: &str) -> Option<String> {
        let edges = self.edges.lock().ok()?;
        edges
            .iter()
            .find(|edge| edge.from == current_task_id)
            .map(|edge| edge.to.clone())
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Option<String> {
        self.start_task_id.lock().ok().and_then(|start| start.clone())
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_id).map(|entry| entry.clone())
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    pub fn add_task(self, task: Arc<dyn Task>) -> Self {
        self.graph.add_task(task);
        self
    }

    pub fn add_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.add_edge(from, to);
        self
    }

    pub fn set_start_task(self, task_id: impl Into<String>) -> Self {
        self.graph.set_start_task(task_id);
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Outcome of a completed `execute_session` run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    /// The task that ended the run
    pub last_task_id: String,
}
