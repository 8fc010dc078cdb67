use anemia_core::{DecisionResult, DecisionStatus, PatientSnapshot, Stage};
use anemia_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use async_trait::async_trait;
use tracing::info;

use super::types::{StageDecision, session_keys};

/// Evaluates one assessment stage against the patient snapshot in the context
pub struct StageTask {
    stage: Stage,
}

impl StageTask {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }
}

/// How the flow moves after a decision.
///
/// Only a clinical `continue` advances; "insufficient data" is also a
/// `continue` but must keep the stepper where it is.
pub fn next_action_for(decision: &DecisionResult) -> NextAction {
    if decision.is_insufficient_data() {
        return NextAction::WaitForInput;
    }
    match decision.status {
        DecisionStatus::Continue => NextAction::Continue,
        DecisionStatus::ActionRequired => NextAction::WaitForInput,
        DecisionStatus::Stop => NextAction::End,
    }
}

#[async_trait]
impl Task for StageTask {
    fn id(&self) -> &str {
        self.stage.id()
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let snapshot: PatientSnapshot = context
            .get(session_keys::PATIENT)
            .await
            .ok_or_else(|| GraphError::ContextError("patient snapshot not found".to_string()))?;

        let decision = self.stage.evaluate(&snapshot);
        let next_action = next_action_for(&decision);

        info!(
            stage = %self.stage,
            status = ?decision.status,
            category = ?decision.category,
            title = %decision.title,
            next_action = ?next_action,
            "stage evaluated"
        );

        let status_message = format!("{}: {}", self.stage.title(), decision.title);
        let response = decision.message.clone();
        context
            .set(
                session_keys::DECISION,
                StageDecision {
                    stage: self.stage,
                    decision,
                },
            )
            .await?;

        Ok(TaskResult::new_with_status(
            Some(response),
            next_action,
            Some(status_message),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemia_core::{Sex, Severity};

    #[test]
    fn test_next_action_mapping() {
        assert_eq!(
            next_action_for(&DecisionResult::insufficient_data("more")),
            NextAction::WaitForInput
        );
        assert_eq!(
            next_action_for(&DecisionResult::continue_with("ok", "")),
            NextAction::Continue
        );
        assert_eq!(
            next_action_for(&DecisionResult::action_required("do", "")),
            NextAction::WaitForInput
        );
        assert_eq!(
            next_action_for(&DecisionResult::stop("halt", "").severity(Severity::Urgent)),
            NextAction::End
        );
    }

    #[tokio::test]
    async fn test_run_stores_decision() {
        let context = Context::new();
        let snapshot = PatientSnapshot {
            sex: Some(Sex::Male),
            hemoglobin: Some(14.0),
            ..Default::default()
        };
        context.set(session_keys::PATIENT, &snapshot).await.unwrap();

        let task = StageTask::new(Stage::Screening);
        let result = task.run(context.clone()).await.unwrap();

        assert_eq!(result.next_action, NextAction::End);
        assert_eq!(result.status_message.as_deref(), Some("Anemia screening: No anemia"));

        let stored: StageDecision = context.get(session_keys::DECISION).await.unwrap();
        assert_eq!(stored.stage, Stage::Screening);
        assert_eq!(stored.decision, Stage::Screening.evaluate(&snapshot));
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_context_error() {
        let task = StageTask::new(Stage::Workup);
        let err = task.run(Context::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::ContextError(_)));
    }
}
