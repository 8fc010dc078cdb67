use serde::Serialize;
use uuid::Uuid;

use crate::{
    context::Context,
    error::{GraphError, Result},
};

/// One walk through a graph: where it stands and the data it has gathered
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub graph_id: String,
    pub current_task_id: String,
    pub status_message: Option<String>,
    /// Tasks visited before the current one, most recent last
    pub history: Vec<String>,
    #[serde(skip)]
    pub context: Context,
}

impl Session {
    pub fn new_from_task(sid: String, task_name: &str) -> Self {
        Self {
            id: sid,
            graph_id: "default".to_string(),
            current_task_id: task_name.to_string(),
            status_message: None,
            history: Vec::new(),
            context: Context::new(),
        }
    }

    /// New session with a random id
    pub fn start(task_name: &str) -> Self {
        Self::new_from_task(Uuid::new_v4().to_string(), task_name)
    }

    pub(crate) fn advance_to(&mut self, task_id: String) {
        let previous = std::mem::replace(&mut self.current_task_id, task_id);
        self.history.push(previous);
    }

    /// Return to the previously visited task
    pub fn go_back(&mut self) -> Result<&str> {
        let previous = self
            .history
            .pop()
            .ok_or_else(|| GraphError::NoPreviousTask(self.current_task_id.clone()))?;
        self.current_task_id = previous;
        Ok(&self.current_task_id)
    }
}
