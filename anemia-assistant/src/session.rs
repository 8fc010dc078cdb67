//! The clinical session: one patient snapshot walked through the four stages.
//!
//! Every field edit goes through [`ClinicalSession::apply`], which
//! normalizes the snapshot before any evaluator sees it and then
//! re-evaluates the active stage. A clinical `continue` moves the cursor to
//! the next stage; the following edit is evaluated there.

use anemia_core::{DecisionResult, FieldEdit, PatientSnapshot, Stage};
use anemia_flow::{ExecutionStatus, FlowRunner, GraphError, Session};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::Result,
    tasks::{StageDecision, session_keys},
    workflow::create_flow_runner,
};

/// Result of evaluating the active stage once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub stage: Stage,
    pub decision: DecisionResult,
    /// Stage the cursor moved to, if the decision allowed advancing
    pub advanced_to: Option<Stage>,
    /// The pathway concluded at this stage
    pub completed: bool,
}

pub struct ClinicalSession {
    runner: FlowRunner,
    session: Session,
    snapshot: PatientSnapshot,
}

impl ClinicalSession {
    /// Empty snapshot, cursor on screening
    pub fn new() -> Result<Self> {
        Self::with_snapshot(PatientSnapshot::new())
    }

    pub fn with_snapshot(snapshot: PatientSnapshot) -> Result<Self> {
        let runner = create_flow_runner();
        let session = Session::start(Stage::Screening.id());
        let clinical = Self {
            runner,
            session,
            snapshot: snapshot.normalized(),
        };
        clinical.store_snapshot()?;
        info!(session_id = %clinical.session.id, "clinical session started");
        Ok(clinical)
    }

    pub fn id(&self) -> &str {
        &self.session.id
    }

    pub fn snapshot(&self) -> &PatientSnapshot {
        &self.snapshot
    }

    pub fn current_stage(&self) -> Stage {
        stage_for(&self.session.current_task_id)
    }

    pub fn status_message(&self) -> Option<&str> {
        self.session.status_message.as_deref()
    }

    /// Most recent recommendation, if any stage has been evaluated
    pub fn last_decision(&self) -> Option<StageDecision> {
        self.session.context.get_sync(session_keys::DECISION)
    }

    /// Apply one field edit and re-evaluate the active stage
    pub async fn apply(&mut self, edit: FieldEdit) -> Result<StepOutcome> {
        debug!(session_id = %self.session.id, field = %edit.field(), "applying edit");
        self.snapshot.apply(edit);
        self.store_snapshot()?;
        self.evaluate().await
    }

    /// Re-evaluate the active stage without changing the snapshot
    pub async fn evaluate(&mut self) -> Result<StepOutcome> {
        let result = self.runner.run(&mut self.session).await?;

        let record = self.last_decision().ok_or_else(|| {
            GraphError::ContextError("stage did not record a decision".to_string())
        })?;

        Ok(StepOutcome {
            stage: record.stage,
            decision: record.decision,
            advanced_to: result.advanced().then(|| stage_for(&result.current_task_id)),
            completed: result.status == ExecutionStatus::Completed,
        })
    }

    /// Evaluate from the active stage onwards for as long as stages say `continue`
    pub async fn walk(&mut self) -> Result<Vec<StepOutcome>> {
        let mut steps = Vec::new();
        loop {
            let step = self.evaluate().await?;
            let advanced = step.advanced_to.is_some();
            steps.push(step);
            if !advanced {
                break;
            }
        }
        Ok(steps)
    }

    /// Return to the previously visited stage
    pub fn go_back(&mut self) -> Result<Stage> {
        self.session.go_back()?;
        Ok(self.current_stage())
    }

    pub fn go_to(&mut self, stage: Stage) -> Result<()> {
        self.runner.graph().jump_to(&mut self.session, stage.id())?;
        Ok(())
    }

    fn store_snapshot(&self) -> Result<()> {
        self.session
            .context
            .set_sync(session_keys::PATIENT, &self.snapshot)?;
        Ok(())
    }
}

fn stage_for(task_id: &str) -> Stage {
    Stage::ALL
        .into_iter()
        .find(|stage| stage.id() == task_id)
        .unwrap_or(Stage::Screening)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemia_core::{DecisionStatus, Finding, LabField, Sex};

    #[tokio::test]
    async fn test_new_session_waits_for_data() {
        let mut session = ClinicalSession::new().unwrap();
        assert_eq!(session.current_stage(), Stage::Screening);
        assert!(session.last_decision().is_none());

        let step = session.evaluate().await.unwrap();
        assert!(step.decision.is_insufficient_data());
        assert_eq!(step.advanced_to, None);
        assert_eq!(session.current_stage(), Stage::Screening);
    }

    #[tokio::test]
    async fn test_edits_reevaluate_and_advance() {
        let mut session = ClinicalSession::new().unwrap();

        let step = session.apply(FieldEdit::Sex(Some(Sex::Female))).await.unwrap();
        assert!(step.decision.is_insufficient_data());

        let step = session
            .apply(FieldEdit::Lab(LabField::Hemoglobin, Some(11.0)))
            .await
            .unwrap();
        assert_eq!(step.stage, Stage::Screening);
        assert_eq!(step.decision.status, DecisionStatus::Continue);
        assert_eq!(step.advanced_to, Some(Stage::IronStatus));
        assert_eq!(session.current_stage(), Stage::IronStatus);

        // the next edit is evaluated on the new stage
        let step = session
            .apply(FieldEdit::Lab(LabField::Ferritin, Some(30.0)))
            .await
            .unwrap();
        assert_eq!(step.stage, Stage::IronStatus);
        assert!(step.decision.is_insufficient_data());
    }

    #[tokio::test]
    async fn test_stop_completes_without_advancing() {
        let snapshot = PatientSnapshot {
            sex: Some(Sex::Male),
            hemoglobin: Some(14.2),
            ..Default::default()
        };
        let mut session = ClinicalSession::with_snapshot(snapshot).unwrap();

        let step = session.evaluate().await.unwrap();
        assert!(step.completed);
        assert_eq!(step.advanced_to, None);
        assert_eq!(session.current_stage(), Stage::Screening);
        assert_eq!(session.status_message(), Some("Anemia screening: No anemia"));
    }

    #[tokio::test]
    async fn test_workup_edits_are_normalized() {
        let mut session = ClinicalSession::new().unwrap();
        session.go_to(Stage::Workup).unwrap();

        let step = session.apply(FieldEdit::AllExcluded(true)).await.unwrap();
        assert_eq!(step.advanced_to, Some(Stage::TherapySelection));
        assert_eq!(session.go_back().unwrap(), Stage::Workup);

        let step = session
            .apply(FieldEdit::Finding(Finding::Thyroid, true))
            .await
            .unwrap();

        assert!(!session.snapshot().workup.is_all_excluded());
        assert_eq!(step.stage, Stage::Workup);
        assert_eq!(step.decision.status, DecisionStatus::Stop);
    }

    #[tokio::test]
    async fn test_navigation() {
        let mut session = ClinicalSession::new().unwrap();
        assert!(session.go_back().is_err());

        session.go_to(Stage::Workup).unwrap();
        session.go_to(Stage::TherapySelection).unwrap();
        assert_eq!(session.go_back().unwrap(), Stage::Workup);
        assert_eq!(session.go_back().unwrap(), Stage::Screening);
    }

    #[tokio::test]
    async fn test_repeated_evaluation_is_identical() {
        let snapshot = PatientSnapshot {
            hemoglobin: Some(9.5),
            ..Default::default()
        };
        let mut session = ClinicalSession::with_snapshot(snapshot).unwrap();
        session.go_to(Stage::TherapySelection).unwrap();

        let first = session.evaluate().await.unwrap();
        let second = session.evaluate().await.unwrap();
        assert_eq!(first, second);
    }
}
