use crate::{
    decision::{DecisionResult, Severity},
    rules::{Rule, RuleSet},
    snapshot::{PatientSnapshot, WorkupState},
    stage::Stage,
};

static RULES: [Rule<WorkupState>; 2] = [
    Rule {
        name: "panel_not_done",
        when: WorkupState::is_unassessed,
        then: panel_not_done,
    },
    Rule {
        name: "renal_anemia",
        when: WorkupState::is_all_excluded,
        then: renal_anemia,
    },
];

pub static RULE_SET: RuleSet<WorkupState> = RuleSet {
    stage: Stage::Workup,
    rules: &RULES,
    fallback_name: "non_renal_cause",
    fallback: non_renal_cause,
};

/// Assumes the snapshot's workup state is already normalized; the type
/// keeps "all excluded" and individual findings apart.
pub fn evaluate(snapshot: &PatientSnapshot) -> DecisionResult {
    RULE_SET.evaluate(&snapshot.workup)
}

fn panel_not_done(_: &WorkupState) -> DecisionResult {
    DecisionResult::action_required(
        "Complete the screening panel",
        "Screen for non-renal causes of anemia before a diagnosis can be made.",
    )
    .severity(Severity::Info)
    .detail("Record each abnormal finding, or confirm that all causes were excluded")
}

fn renal_anemia(_: &WorkupState) -> DecisionResult {
    DecisionResult::continue_with(
        "Anemia of chronic kidney disease",
        "Non-renal causes have been excluded. Proceed to therapy selection.",
    )
    .severity(Severity::Treatment)
}

fn non_renal_cause(workup: &WorkupState) -> DecisionResult {
    let referrals: Vec<&str> = match workup {
        WorkupState::Findings(findings) => findings.iter().map(|f| f.referral()).collect(),
        WorkupState::AllExcluded => Vec::new(),
    };

    DecisionResult::stop(
        "Non-renal cause identified",
        "Treat the underlying cause before starting renal anemia therapy.",
    )
    .severity(Severity::Urgent)
    .details(referrals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionStatus;
    use crate::snapshot::Finding;

    fn with_workup(workup: WorkupState) -> PatientSnapshot {
        PatientSnapshot {
            workup,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_flags_requires_panel() {
        let result = evaluate(&PatientSnapshot::new());
        assert_eq!(result.status, DecisionStatus::ActionRequired);
        assert_eq!(result.severity, Some(Severity::Info));
    }

    #[test]
    fn test_all_excluded_confirms_renal_anemia() {
        let result = evaluate(&with_workup(WorkupState::AllExcluded));
        assert_eq!(result.status, DecisionStatus::Continue);
        assert_eq!(result.severity, Some(Severity::Treatment));
        assert_eq!(result.title, "Anemia of chronic kidney disease");
    }

    #[test]
    fn test_findings_reported_in_declaration_order() {
        let mut workup = WorkupState::default();
        workup.set_finding(Finding::Parasites, true);
        workup.set_finding(Finding::Liver, true);
        workup.set_finding(Finding::Hemolysis, true);

        let result = evaluate(&with_workup(workup));
        assert_eq!(result.status, DecisionStatus::Stop);
        assert_eq!(result.severity, Some(Severity::Urgent));
        assert_eq!(
            result.details,
            vec![
                Finding::Hemolysis.referral(),
                Finding::Liver.referral(),
                Finding::Parasites.referral(),
            ]
        );
    }

    #[test]
    fn test_every_finding_is_reported() {
        let mut workup = WorkupState::default();
        for finding in Finding::ALL.into_iter().rev() {
            workup.set_finding(finding, true);
        }

        let result = evaluate(&with_workup(workup));
        let expected: Vec<_> = Finding::ALL.iter().map(|f| f.referral()).collect();
        assert_eq!(result.details, expected);
    }

    #[test]
    fn test_finding_after_all_excluded_blocks_therapy() {
        let mut snapshot = with_workup(WorkupState::AllExcluded);
        snapshot.workup.set_finding(Finding::Thyroid, true);

        let result = evaluate(&snapshot);
        assert_eq!(result.status, DecisionStatus::Stop);
        assert_eq!(result.details, vec![Finding::Thyroid.referral()]);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut snapshot = with_workup(WorkupState::default());
        snapshot.workup.set_finding(Finding::Myeloma, true);
        snapshot.workup.set_finding(Finding::Hemolysis, true);
        assert_eq!(evaluate(&snapshot), evaluate(&snapshot));
    }
}
