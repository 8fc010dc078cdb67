use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    decision::DecisionResult,
    error::ParseEditError,
    evaluators::{iron_status, screening, therapy, workup},
    snapshot::PatientSnapshot,
};

/// The four assessment stages, in the order they are worked through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Screening,
    IronStatus,
    Workup,
    TherapySelection,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Screening,
        Stage::IronStatus,
        Stage::Workup,
        Stage::TherapySelection,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Stage::Screening => "screening",
            Stage::IronStatus => "iron_status",
            Stage::Workup => "workup",
            Stage::TherapySelection => "therapy_selection",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Screening => "Anemia screening",
            Stage::IronStatus => "Iron status",
            Stage::Workup => "Differential workup",
            Stage::TherapySelection => "Therapy selection",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Screening => Some(Stage::IronStatus),
            Stage::IronStatus => Some(Stage::Workup),
            Stage::Workup => Some(Stage::TherapySelection),
            Stage::TherapySelection => None,
        }
    }

    /// Run this stage's evaluator against the snapshot
    pub fn evaluate(&self, snapshot: &PatientSnapshot) -> DecisionResult {
        match self {
            Stage::Screening => screening::evaluate(snapshot),
            Stage::IronStatus => iron_status::evaluate(snapshot),
            Stage::Workup => workup::evaluate(snapshot),
            Stage::TherapySelection => therapy::evaluate(snapshot),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Stage {
    type Err = ParseEditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "screening" | "1" => Ok(Stage::Screening),
            "iron_status" | "iron" | "2" => Ok(Stage::IronStatus),
            "workup" | "3" => Ok(Stage::Workup),
            "therapy_selection" | "therapy" | "4" => Ok(Stage::TherapySelection),
            _ => Err(ParseEditError::UnknownStage(s.to_string())),
        }
    }
}

/// Evaluate every stage independently against the same snapshot
pub fn assess_all(snapshot: &PatientSnapshot) -> Vec<(Stage, DecisionResult)> {
    Stage::ALL
        .into_iter()
        .map(|stage| (stage, stage.evaluate(snapshot)))
        .collect()
}
