use serde::{Deserialize, Serialize};

/// What the caller should do with the current stage after a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Safe to move on to the next stage
    Continue,
    /// Terminal for this stage, do not auto-advance
    Stop,
    /// A concrete action exists but the stage is not finished
    ActionRequired,
}

/// Display emphasis only, never consulted by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Urgent,
    Treatment,
    Info,
}

/// Which kind of outcome a result represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    /// Required fields are unset; keep collecting input
    InsufficientData,
    /// Findings pull in opposite directions and are reported as such
    Conflict,
    Verdict,
}

/// Recommendation produced by one evaluation of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub status: DecisionStatus,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub category: DecisionCategory,
}

impl DecisionResult {
    fn verdict(status: DecisionStatus, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            message: message.into(),
            details: Vec::new(),
            severity: None,
            category: DecisionCategory::Verdict,
        }
    }

    pub fn stop(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::verdict(DecisionStatus::Stop, title, message)
    }

    pub fn continue_with(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::verdict(DecisionStatus::Continue, title, message)
    }

    pub fn action_required(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::verdict(DecisionStatus::ActionRequired, title, message)
    }

    /// `continue` result with no clinical content
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self {
            category: DecisionCategory::InsufficientData,
            ..Self::continue_with("Insufficient data", message)
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    pub fn details<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn conflict(mut self) -> Self {
        self.category = DecisionCategory::Conflict;
        self
    }

    pub fn is_insufficient_data(&self) -> bool {
        self.category == DecisionCategory::InsufficientData
    }
}
