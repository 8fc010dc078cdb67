use crate::{
    decision::{DecisionResult, Severity},
    rules::{Rule, RuleSet},
    snapshot::{Cohort, PatientSnapshot, finite},
    stage::Stage,
};

/// Ferritin below this suggests blood loss rather than renal anemia (ng/mL)
pub const SEVERE_DEFICIENCY_FERRITIN: f64 = 45.0;
/// Ferritin above this means iron must not be started (ng/mL)
pub const REPLETE_FERRITIN: f64 = 700.0;
/// TSAT at or above this means iron must not be started (%)
pub const REPLETE_TSAT: f64 = 40.0;

pub const OCCULT_BLEEDING_REFERRALS: [&str; 3] = ["Urology", "Gynecology", "Gastroenterology"];

pub struct IronInput {
    pub ferritin: f64,
    pub tsat: f64,
    pub cohort: Cohort,
    pub active_infection: bool,
}

impl IronInput {
    pub fn from_snapshot(snapshot: &PatientSnapshot) -> Option<Self> {
        Some(Self {
            ferritin: finite(snapshot.ferritin)?,
            tsat: finite(snapshot.tsat)?,
            cohort: snapshot.cohort?,
            active_infection: snapshot.active_infection,
        })
    }

    fn initiation_criteria_met(&self) -> bool {
        let (ferritin, tsat) = (self.ferritin, self.tsat);
        match self.cohort {
            Cohort::Hemodialysis => ferritin <= 500.0 && tsat <= 30.0,
            Cohort::PeritonealDialysis | Cohort::NonDialysisCkd => {
                (ferritin < 100.0 && tsat < 40.0)
                    || ((100.0..=300.0).contains(&ferritin) && tsat < 25.0)
            }
        }
    }
}

static RULES: [Rule<IronInput>; 4] = [
    Rule {
        name: "severe_deficiency",
        when: is_severely_deficient,
        then: occult_bleeding,
    },
    Rule {
        name: "active_infection",
        when: has_active_infection,
        then: hold_for_infection,
    },
    Rule {
        name: "iron_replete",
        when: is_replete,
        then: iron_replete,
    },
    Rule {
        name: "initiate_iron",
        when: IronInput::initiation_criteria_met,
        then: initiate_iron,
    },
];

pub static RULE_SET: RuleSet<IronInput> = RuleSet {
    stage: Stage::IronStatus,
    rules: &RULES,
    fallback_name: "no_initiation",
    fallback: no_initiation,
};

pub fn evaluate(snapshot: &PatientSnapshot) -> DecisionResult {
    match IronInput::from_snapshot(snapshot) {
        Some(input) => RULE_SET.evaluate(&input),
        None => DecisionResult::insufficient_data(
            "Enter ferritin, TSAT and patient cohort to assess iron status.",
        ),
    }
}

fn is_severely_deficient(input: &IronInput) -> bool {
    input.ferritin < SEVERE_DEFICIENCY_FERRITIN
}

fn has_active_infection(input: &IronInput) -> bool {
    input.active_infection
}

fn is_replete(input: &IronInput) -> bool {
    input.ferritin > REPLETE_FERRITIN || input.tsat >= REPLETE_TSAT
}

fn occult_bleeding(input: &IronInput) -> DecisionResult {
    DecisionResult::stop(
        "Suspected occult bleeding",
        format!(
            "Ferritin {} ng/mL is below {SEVERE_DEFICIENCY_FERRITIN} ng/mL. Investigate a source of blood loss before attributing anemia to kidney disease.",
            input.ferritin
        ),
    )
    .severity(Severity::Urgent)
    .details(OCCULT_BLEEDING_REFERRALS)
}

fn hold_for_infection(_: &IronInput) -> DecisionResult {
    DecisionResult::stop(
        "Hold iron therapy",
        "Active infection present. Do not give iron until the infection has resolved, then reassess iron status.",
    )
    .severity(Severity::Urgent)
}

fn iron_replete(input: &IronInput) -> DecisionResult {
    DecisionResult::continue_with(
        "Iron stores sufficient",
        "Iron stores are adequate or high. Proceed to the differential workup.",
    )
    .severity(Severity::Info)
    .detail("Do not start iron therapy")
    .detail(format!(
        "Ferritin {} ng/mL, TSAT {}% (no iron when ferritin > {REPLETE_FERRITIN} ng/mL or TSAT >= {REPLETE_TSAT}%)",
        input.ferritin, input.tsat
    ))
}

fn initiate_iron(input: &IronInput) -> DecisionResult {
    match input.cohort {
        Cohort::Hemodialysis => DecisionResult::action_required(
            "Start IV iron",
            "Ferritin <= 500 ng/mL and TSAT <= 30% on hemodialysis. Start intravenous iron.",
        )
        .severity(Severity::Treatment)
        .detail("Route: intravenous")
        .detail("Monitor ferritin and TSAT monthly"),
        cohort => DecisionResult::action_required(
            "Start iron therapy",
            format!(
                "Iron deficiency criteria met for {} patients. Start oral or intravenous iron.",
                cohort.label()
            ),
        )
        .severity(Severity::Treatment)
        .detail("Route: oral or intravenous")
        .detail("Monitor ferritin and TSAT every 3 months"),
    }
}

fn no_initiation(_: &IronInput) -> DecisionResult {
    DecisionResult::continue_with(
        "No iron initiation criteria met",
        "Iron therapy is not indicated at these values. Proceed to the differential workup.",
    )
    .severity(Severity::Info)
}
