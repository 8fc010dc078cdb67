use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("No previous task to go back to from {0}")]
    NoPreviousTask(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
