use anemia_core::{DecisionResult, Stage};
use serde::{Deserialize, Serialize};

/// Latest recommendation together with the stage that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDecision {
    pub stage: Stage,
    pub decision: DecisionResult,
}

pub mod session_keys {
    pub const PATIENT: &str = "patient";
    pub const DECISION: &str = "decision";
}
