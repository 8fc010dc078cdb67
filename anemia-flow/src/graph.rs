use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    context::Context,
    error::{GraphError, Result},
    session::Session,
    task::{NextAction, Task, TaskResult},
};

/// Edge between tasks in the graph
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A graph of tasks that is walked one task per call
pub struct Graph {
    pub id: String,
    tasks: DashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: DashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
        }
    }

    /// Add a task to the graph; the first task added becomes the start task
    pub fn add_task(&mut self, task: Arc<dyn Task>) -> &mut Self {
        let task_id = task.id().to_string();
        if self.tasks.is_empty() {
            self.start_task_id = Some(task_id.clone());
        }
        self.tasks.insert(task_id, task);
        self
    }

    /// Set the starting task
    pub fn set_start_task(&mut self, task_id: impl Into<String>) -> &mut Self {
        let task_id = task_id.into();
        if self.tasks.contains_key(&task_id) {
            self.start_task_id = Some(task_id);
        }
        self
    }

    /// Add an edge between tasks
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Execute exactly one task, the session's current one, and move the
    /// session cursor according to the task's [`NextAction`].
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        let result = self
            .execute_single_task(&session.current_task_id, session.context.clone())
            .await?;

        session.status_message = result.status_message.clone();

        let status = match &result.next_action {
            NextAction::Continue => {
                // Find the next task but don't execute it
                match self.find_next_task(&result.task_id) {
                    Some(next_task_id) => session.advance_to(next_task_id),
                    None => debug!(task_id = %result.task_id, "no outgoing edge, staying on task"),
                }
                ExecutionStatus::WaitingForInput
            }
            NextAction::WaitForInput => ExecutionStatus::WaitingForInput,
            NextAction::End => ExecutionStatus::Completed,
            NextAction::GoTo(target_id) => {
                if !self.tasks.contains_key(target_id) {
                    return Err(GraphError::TaskNotFound(target_id.clone()));
                }
                session.advance_to(target_id.clone());
                ExecutionStatus::WaitingForInput
            }
            NextAction::GoBack => {
                if session.go_back().is_err() {
                    debug!(task_id = %result.task_id, "already at the first task");
                }
                ExecutionStatus::WaitingForInput
            }
        };

        Ok(ExecutionResult {
            task_id: result.task_id,
            response: result.response,
            next_action: result.next_action,
            current_task_id: session.current_task_id.clone(),
            status,
        })
    }

    /// Move the session to `task_id` without executing anything
    pub fn jump_to(&self, session: &mut Session, task_id: &str) -> Result<()> {
        if !self.tasks.contains_key(task_id) {
            return Err(GraphError::TaskNotFound(task_id.to_string()));
        }
        if session.current_task_id != task_id {
            session.advance_to(task_id.to_string());
        }
        Ok(())
    }

    /// Execute a single task without following its next action
    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        let mut result = task.run(context).await?;

        // Set the task_id in the result to track which task generated it
        result.task_id = task_id.to_string();

        Ok(result)
    }

    /// Find the next task along the outgoing edge
    pub fn find_next_task(&self, current_task_id: &str) -> Option<String> {
        self.edges
            .iter()
            .find(|edge| edge.from == current_task_id)
            .map(|edge| edge.to.clone())
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Option<String> {
        self.start_task_id.clone()
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

    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        self.graph.add_task(task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.add_edge(from, to);
        self
    }

    pub fn set_start_task(mut self, task_id: impl Into<String>) -> Self {
        self.graph.set_start_task(task_id);
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Outcome of one `execute_session` step
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Task that was executed
    pub task_id: String,
    pub response: Option<String>,
    pub next_action: NextAction,
    /// Where the session cursor points after the step
    pub current_task_id: String,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    pub fn advanced(&self) -> bool {
        self.task_id != self.current_task_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Waiting for caller input to continue
    WaitingForInput,
    /// The flow concluded at the executed task
    Completed,
}
