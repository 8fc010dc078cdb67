use anemia_core::PatientSnapshot;
use std::path::Path;
use tracing::debug;

use crate::error::{AssistantError, Result};

/// Read a (possibly partial) snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> Result<PatientSnapshot> {
    let raw = std::fs::read_to_string(path).map_err(|source| AssistantError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_snapshot(&raw).map_err(|source| AssistantError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}

pub fn parse_snapshot(raw: &str) -> std::result::Result<PatientSnapshot, serde_json::Error> {
    serde_json::from_str::<PatientSnapshot>(raw).map(PatientSnapshot::normalized)
}
