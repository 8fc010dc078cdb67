use anemia_assistant::ClinicalSession;
use anemia_core::{
    Cohort, DecisionStatus, FieldEdit, Finding, LabField, PatientSnapshot, Sex, Stage, assess_all,
};

#[tokio::test]
async fn test_full_pathway_to_default_esa() {
    let mut session = ClinicalSession::new().unwrap();

    // Screening
    session.apply(FieldEdit::Sex(Some(Sex::Female))).await.unwrap();
    let step = session
        .apply(FieldEdit::Lab(LabField::Hemoglobin, Some(11.5)))
        .await
        .unwrap();
    assert_eq!(step.stage, Stage::Screening);
    assert_eq!(step.decision.title, "Anemia present");
    assert_eq!(step.decision.status, DecisionStatus::Continue);
    assert_eq!(step.advanced_to, Some(Stage::IronStatus));

    // Iron status
    session
        .apply(FieldEdit::Cohort(Some(Cohort::PeritonealDialysis)))
        .await
        .unwrap();
    session
        .apply(FieldEdit::Lab(LabField::Ferritin, Some(200.0)))
        .await
        .unwrap();
    let step = session
        .apply(FieldEdit::Lab(LabField::Tsat, Some(20.0)))
        .await
        .unwrap();
    assert_eq!(step.stage, Stage::IronStatus);
    assert_eq!(step.decision.title, "Start iron therapy");
    assert_eq!(step.decision.status, DecisionStatus::ActionRequired);
    assert_eq!(step.advanced_to, None);

    // Workup: the clinician moves on once iron is started
    session.go_to(Stage::Workup).unwrap();
    let step = session.evaluate().await.unwrap();
    assert_eq!(step.decision.status, DecisionStatus::ActionRequired);

    let step = session.apply(FieldEdit::AllExcluded(true)).await.unwrap();
    assert_eq!(step.stage, Stage::Workup);
    assert_eq!(step.decision.title, "Anemia of chronic kidney disease");
    assert_eq!(step.advanced_to, Some(Stage::TherapySelection));
    for finding in Finding::ALL {
        assert!(!session.snapshot().workup.has(finding));
    }

    // Therapy selection
    let step = session
        .apply(FieldEdit::Lab(LabField::Hemoglobin, Some(9.0)))
        .await
        .unwrap();
    assert_eq!(step.stage, Stage::TherapySelection);
    assert_eq!(step.decision.title, "Start ESA");
    assert_eq!(step.decision.status, DecisionStatus::Stop);
    assert!(step.completed);
    assert_eq!(session.current_stage(), Stage::TherapySelection);

    // The independent assessment of the final snapshot agrees stage by stage
    let assessed = assess_all(session.snapshot());
    assert_eq!(assessed[3].1, step.decision);
    assert_eq!(assessed[2].1.status, DecisionStatus::Continue);
    assert_eq!(assessed[1].1.title, "Start iron therapy");
}

#[tokio::test]
async fn test_finding_clears_all_excluded_through_session() {
    let snapshot = PatientSnapshot {
        cohort: Some(Cohort::Hemodialysis),
        ..Default::default()
    };
    let mut session = ClinicalSession::with_snapshot(snapshot).unwrap();
    session.go_to(Stage::Workup).unwrap();

    session.apply(FieldEdit::AllExcluded(true)).await.unwrap();
    assert!(session.snapshot().workup.is_all_excluded());
    session.go_back().unwrap();

    let step = session
        .apply(FieldEdit::Finding(Finding::Hemolysis, true))
        .await
        .unwrap();
    assert!(!session.snapshot().workup.is_all_excluded());
    assert!(session.snapshot().workup.has(Finding::Hemolysis));
    assert_eq!(step.decision.status, DecisionStatus::Stop);
    assert_eq!(step.decision.details, vec![Finding::Hemolysis.referral().to_string()]);

    // selecting "all excluded" again clears the finding
    session.apply(FieldEdit::AllExcluded(true)).await.unwrap();
    assert!(!session.snapshot().workup.has(Finding::Hemolysis));
}

#[tokio::test]
async fn test_walk_stops_at_first_non_continue() {
    let snapshot = PatientSnapshot {
        sex: Some(Sex::Male),
        hemoglobin: Some(9.8),
        cohort: Some(Cohort::Hemodialysis),
        ferritin: Some(30.0),
        tsat: Some(12.0),
        ..Default::default()
    };
    let mut session = ClinicalSession::with_snapshot(snapshot).unwrap();

    let steps = session.walk().await.unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].advanced_to, Some(Stage::IronStatus));
    assert_eq!(steps[1].decision.title, "Suspected occult bleeding");
    assert!(steps[1].completed);
}

#[tokio::test]
async fn test_serum_iron_edits_derive_tsat() {
    let mut session = ClinicalSession::new().unwrap();
    session
        .apply(FieldEdit::Lab(LabField::SerumIron, Some(60.0)))
        .await
        .unwrap();
    assert_eq!(session.snapshot().tsat, None);

    session
        .apply(FieldEdit::Lab(LabField::Tibc, Some(300.0)))
        .await
        .unwrap();
    assert_eq!(session.snapshot().tsat, Some(20.0));
}
