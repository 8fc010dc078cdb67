use anemia_core::ParseEditError;
use anemia_flow::GraphError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Flow(#[from] GraphError),

    #[error(transparent)]
    Edit(#[from] ParseEditError),

    #[error("Failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}: {source}")]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
