use crate::{
    decision::{DecisionResult, Severity},
    rules::{Rule, RuleSet},
    snapshot::{PatientSnapshot, Sex, finite},
    stage::Stage,
};

/// Hemoglobin below this is anemia in men (g/dL)
pub const MALE_HB_THRESHOLD: f64 = 13.0;
/// Hemoglobin below this is anemia in women (g/dL)
pub const FEMALE_HB_THRESHOLD: f64 = 12.0;

pub struct ScreeningInput {
    pub hemoglobin: f64,
    pub sex: Sex,
}

impl ScreeningInput {
    pub fn from_snapshot(snapshot: &PatientSnapshot) -> Option<Self> {
        Some(Self {
            hemoglobin: finite(snapshot.hemoglobin)?,
            sex: snapshot.sex?,
        })
    }

    fn threshold(&self) -> f64 {
        match self.sex {
            Sex::Male => MALE_HB_THRESHOLD,
            Sex::Female => FEMALE_HB_THRESHOLD,
        }
    }
}

static RULES: [Rule<ScreeningInput>; 1] = [Rule {
    name: "anemia_present",
    when: is_anemic,
    then: anemia_present,
}];

pub static RULE_SET: RuleSet<ScreeningInput> = RuleSet {
    stage: Stage::Screening,
    rules: &RULES,
    fallback_name: "no_anemia",
    fallback: no_anemia,
};

pub fn evaluate(snapshot: &PatientSnapshot) -> DecisionResult {
    match ScreeningInput::from_snapshot(snapshot) {
        Some(input) => RULE_SET.evaluate(&input),
        None => DecisionResult::insufficient_data(
            "Enter hemoglobin and sex to screen for anemia.",
        ),
    }
}

fn is_anemic(input: &ScreeningInput) -> bool {
    input.hemoglobin < input.threshold()
}

fn threshold_details(input: &ScreeningInput) -> [String; 3] {
    [
        format!("Anemia threshold (male): Hb < {MALE_HB_THRESHOLD} g/dL"),
        format!("Anemia threshold (female): Hb < {FEMALE_HB_THRESHOLD} g/dL"),
        format!("Measured hemoglobin: {} g/dL", input.hemoglobin),
    ]
}

fn anemia_present(input: &ScreeningInput) -> DecisionResult {
    DecisionResult::continue_with(
        "Anemia present",
        format!(
            "Hemoglobin {} g/dL is below the {} threshold of {} g/dL. Proceed to iron status assessment.",
            input.hemoglobin,
            input.sex,
            input.threshold()
        ),
    )
    .severity(Severity::Urgent)
    .details(threshold_details(input))
}

fn no_anemia(input: &ScreeningInput) -> DecisionResult {
    DecisionResult::stop(
        "No anemia",
        "Hemoglobin is at or above the sex-specific threshold. Anemia treatment is not indicated.",
    )
    .severity(Severity::Treatment)
    .details(threshold_details(input))
}
