//! Therapy selection between an ESA and a HIF-PHI.
//!
//! Two gates run first: observation while hemoglobin is above the start
//! threshold, then an absolute hold for current stroke or thrombosis. After
//! that three tiers are tried in order and the first tier with any matching
//! reason decides:
//!
//! 1. history and contraindications (favour ESA, or HIF-PHI on ESA
//!    intolerance alone; both at once is reported as a conflict)
//! 2. clinical status (favour HIF-PHI)
//! 3. preference and logistics (favour HIF-PHI)
//!
//! Within a tier every matching reason is reported. With no tier matching,
//! an ESA is the standard of care.

use crate::{
    decision::{DecisionResult, Severity},
    rules::{Rule, RuleSet},
    snapshot::{Contraindication, PatientSnapshot, RoutePreference, finite},
    stage::Stage,
};

/// Pharmacologic therapy is considered only at or below this hemoglobin (g/dL)
pub const START_HB_THRESHOLD: f64 = 10.0;

pub const HIF_PHI_DISCONTINUATION: &str =
    "Reassess after 3-4 months; discontinue the HIF-PHI if the hemoglobin response remains insufficient";

static RULES: [Rule<PatientSnapshot>; 7] = [
    Rule {
        name: "observation",
        when: above_start_threshold,
        then: observation,
    },
    Rule {
        name: "safety_hold",
        when: stroke_or_thrombosis,
        then: safety_hold,
    },
    Rule {
        name: "contraindication_conflict",
        when: contraindication_conflict_applies,
        then: contraindication_conflict,
    },
    Rule {
        name: "history_favors_esa",
        when: has_contraindications,
        then: history_favors_esa,
    },
    Rule {
        name: "esa_intolerance",
        when: esa_intolerant,
        then: esa_intolerance,
    },
    Rule {
        name: "clinical_status",
        when: clinical_status_applies,
        then: clinical_status,
    },
    Rule {
        name: "preference_logistics",
        when: preference_applies,
        then: preference_logistics,
    },
];

pub static RULE_SET: RuleSet<PatientSnapshot> = RuleSet {
    stage: Stage::TherapySelection,
    rules: &RULES,
    fallback_name: "standard_of_care",
    fallback: standard_of_care,
};

pub fn evaluate(snapshot: &PatientSnapshot) -> DecisionResult {
    RULE_SET.evaluate(snapshot)
}

fn above_start_threshold(snapshot: &PatientSnapshot) -> bool {
    finite(snapshot.hemoglobin).is_none_or(|hb| hb > START_HB_THRESHOLD)
}

fn stroke_or_thrombosis(snapshot: &PatientSnapshot) -> bool {
    snapshot.history.current_stroke_or_thrombosis
}

fn has_contraindications(snapshot: &PatientSnapshot) -> bool {
    !snapshot.history.contraindications().is_empty()
}

fn esa_intolerant(snapshot: &PatientSnapshot) -> bool {
    snapshot.history.esa_intolerance
}

fn contraindication_conflict_applies(snapshot: &PatientSnapshot) -> bool {
    esa_intolerant(snapshot) && has_contraindications(snapshot)
}

fn clinical_status_reasons(snapshot: &PatientSnapshot) -> Vec<&'static str> {
    let mut reasons = Vec::new();
    if snapshot.status.esa_hyporesponsive {
        reasons.push("ESA hyporesponsiveness");
    }
    if snapshot.status.elevated_inflammation {
        reasons.push("Elevated inflammatory marker (CRP)");
    }
    reasons
}

fn clinical_status_applies(snapshot: &PatientSnapshot) -> bool {
    !clinical_status_reasons(snapshot).is_empty()
}

fn preference_reasons(snapshot: &PatientSnapshot) -> Vec<&'static str> {
    let mut reasons = Vec::new();
    if snapshot.route_preference == Some(RoutePreference::Oral) {
        reasons.push("Patient prefers oral treatment");
    }
    if snapshot.no_refrigeration {
        reasons.push("No access to refrigerated storage");
    }
    reasons
}

fn preference_applies(snapshot: &PatientSnapshot) -> bool {
    !preference_reasons(snapshot).is_empty()
}

fn labels(items: &[Contraindication]) -> impl Iterator<Item = &'static str> + '_ {
    items.iter().map(|item| item.label())
}

fn observation(snapshot: &PatientSnapshot) -> DecisionResult {
    let message = match finite(snapshot.hemoglobin) {
        Some(hb) => format!(
            "Hemoglobin {hb} g/dL is above {START_HB_THRESHOLD} g/dL. ESA or HIF-PHI initiation is not yet indicated."
        ),
        None => "No hemoglobin recorded. ESA or HIF-PHI initiation is not yet indicated.".to_string(),
    };
    DecisionResult::stop("Observation", message)
        .severity(Severity::Info)
        .detail("Continue to monitor hemoglobin and iron status")
}

fn safety_hold(_: &PatientSnapshot) -> DecisionResult {
    DecisionResult::stop(
        "Hold pharmacologic therapy",
        "Current stroke or active thrombosis. Do not start or continue ESA or HIF-PHI.",
    )
    .severity(Severity::Urgent)
    .detail("Manage the acute event first and reassess anemia therapy afterwards")
}

fn contraindication_conflict(snapshot: &PatientSnapshot) -> DecisionResult {
    let conditions = snapshot.history.contraindications();
    DecisionResult::stop(
        "Conflicting findings",
        "ESA intolerance rules out an ESA, but the following conditions also caution against a HIF-PHI.",
    )
    .severity(Severity::Urgent)
    .conflict()
    .detail("ESA intolerance")
    .details(labels(&conditions))
    .details([
        "Use shared decision-making with the patient",
        "Refer to a nephrology or hematology specialist",
        "Consider red blood cell transfusion if symptomatic",
    ])
}

fn history_favors_esa(snapshot: &PatientSnapshot) -> DecisionResult {
    let conditions = snapshot.history.contraindications();
    DecisionResult::stop(
        "Start ESA",
        "The patient's history favours an erythropoiesis-stimulating agent over a HIF-PHI.",
    )
    .severity(Severity::Treatment)
    .details(labels(&conditions))
}

fn esa_intolerance(_: &PatientSnapshot) -> DecisionResult {
    DecisionResult::stop(
        "Start HIF-PHI",
        "ESA intolerance documented. Use a HIF prolyl-hydroxylase inhibitor instead.",
    )
    .severity(Severity::Treatment)
    .detail("ESA intolerance")
}

fn clinical_status(snapshot: &PatientSnapshot) -> DecisionResult {
    DecisionResult::stop(
        "Start HIF-PHI",
        "The current clinical status favours a HIF prolyl-hydroxylase inhibitor.",
    )
    .severity(Severity::Treatment)
    .details(clinical_status_reasons(snapshot))
    .detail(HIF_PHI_DISCONTINUATION)
}

fn preference_logistics(snapshot: &PatientSnapshot) -> DecisionResult {
    DecisionResult::stop(
        "Start HIF-PHI",
        "Patient preference or logistics favour an oral HIF prolyl-hydroxylase inhibitor.",
    )
    .severity(Severity::Treatment)
    .details(preference_reasons(snapshot))
    .detail(HIF_PHI_DISCONTINUATION)
}

fn standard_of_care(_: &PatientSnapshot) -> DecisionResult {
    DecisionResult::stop(
        "Start ESA",
        "No condition favours an alternative. Start an erythropoiesis-stimulating agent as standard of care.",
    )
    .severity(Severity::Treatment)
    .details([
        "Check hemoglobin every 2-4 weeks during initiation, then monthly",
        "Target hemoglobin 10-11.5 g/dL; do not intentionally exceed 11.5 g/dL",
    ])
}
