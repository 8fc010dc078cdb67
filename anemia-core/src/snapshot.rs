use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Dialysis-modality classification of the patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    Hemodialysis,
    PeritonealDialysis,
    NonDialysisCkd,
}

impl Cohort {
    pub fn label(&self) -> &'static str {
        match self {
            Cohort::Hemodialysis => "hemodialysis",
            Cohort::PeritonealDialysis => "peritoneal dialysis",
            Cohort::NonDialysisCkd => "non-dialysis CKD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

/// Preferred route for anemia therapy, as stated by the patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePreference {
    Oral,
    Injection,
}

/// Non-renal finding from the differential-diagnosis screening panel.
///
/// Variants are declared in reporting order; `Ord` follows that order so a
/// `BTreeSet<Finding>` always iterates the way the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    PeripheralSmear,
    Hemolysis,
    Inflammation,
    B12Folate,
    Liver,
    Thyroid,
    Parathyroid,
    Myeloma,
    Parasites,
}

impl Finding {
    pub const ALL: [Finding; 9] = [
        Finding::PeripheralSmear,
        Finding::Hemolysis,
        Finding::Inflammation,
        Finding::B12Folate,
        Finding::Liver,
        Finding::Thyroid,
        Finding::Parathyroid,
        Finding::Myeloma,
        Finding::Parasites,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Finding::PeripheralSmear => "peripheral_smear",
            Finding::Hemolysis => "hemolysis",
            Finding::Inflammation => "inflammation",
            Finding::B12Folate => "b12_folate",
            Finding::Liver => "liver",
            Finding::Thyroid => "thyroid",
            Finding::Parathyroid => "parathyroid",
            Finding::Myeloma => "myeloma",
            Finding::Parasites => "parasites",
        }
    }

    /// Referral or action text reported when the finding is present
    pub fn referral(&self) -> &'static str {
        match self {
            Finding::PeripheralSmear => {
                "Abnormal peripheral blood smear: refer to hematology for evaluation"
            }
            Finding::Hemolysis => {
                "Signs of hemolysis: check haptoglobin, LDH and direct Coombs test; refer to hematology"
            }
            Finding::Inflammation => {
                "Systemic inflammation or infection: identify and treat the inflammatory source"
            }
            Finding::B12Folate => {
                "Vitamin B12 or folate deficiency: replace and recheck hemoglobin"
            }
            Finding::Liver => "Chronic liver disease: refer to hepatology",
            Finding::Thyroid => "Hypothyroidism: refer to endocrinology and correct thyroid function",
            Finding::Parathyroid => {
                "Severe secondary hyperparathyroidism: optimize mineral and bone disorder management"
            }
            Finding::Myeloma => {
                "Suspected multiple myeloma: order serum protein electrophoresis and free light chains; refer to hematology"
            }
            Finding::Parasites => "Parasitic infection: treat the infestation and re-evaluate",
        }
    }
}

/// Outcome of the differential-diagnosis screening panel.
///
/// "All excluded" and individual findings cannot coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkupState {
    AllExcluded,
    Findings(BTreeSet<Finding>),
}

impl Default for WorkupState {
    fn default() -> Self {
        WorkupState::Findings(BTreeSet::new())
    }
}

impl WorkupState {
    pub fn is_all_excluded(&self) -> bool {
        matches!(self, WorkupState::AllExcluded)
    }

    pub fn has(&self, finding: Finding) -> bool {
        match self {
            WorkupState::AllExcluded => false,
            WorkupState::Findings(set) => set.contains(&finding),
        }
    }

    /// True while the panel has not been filled in at all
    pub fn is_unassessed(&self) -> bool {
        matches!(self, WorkupState::Findings(set) if set.is_empty())
    }

    pub fn set_all_excluded(&mut self, excluded: bool) {
        *self = if excluded {
            WorkupState::AllExcluded
        } else {
            WorkupState::default()
        };
    }

    pub fn set_finding(&mut self, finding: Finding, present: bool) {
        match self {
            WorkupState::AllExcluded if present => {
                *self = WorkupState::Findings(BTreeSet::from([finding]));
            }
            WorkupState::AllExcluded => {}
            WorkupState::Findings(set) => {
                if present {
                    set.insert(finding);
                } else {
                    set.remove(&finding);
                }
            }
        }
    }
}

/// History items that favour an ESA over a HIF-PHI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contraindication {
    Pregnancy,
    ActiveMalignancy,
    RecentCancerHistory,
    PolycysticKidneyDisease,
    ProliferativeRetinalDisease,
    PulmonaryArterialHypertension,
    HepaticImpairment,
    PriorCardiovascularEvents,
    PriorThromboembolicEvents,
}

impl Contraindication {
    pub const ALL: [Contraindication; 9] = [
        Contraindication::Pregnancy,
        Contraindication::ActiveMalignancy,
        Contraindication::RecentCancerHistory,
        Contraindication::PolycysticKidneyDisease,
        Contraindication::ProliferativeRetinalDisease,
        Contraindication::PulmonaryArterialHypertension,
        Contraindication::HepaticImpairment,
        Contraindication::PriorCardiovascularEvents,
        Contraindication::PriorThromboembolicEvents,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Contraindication::Pregnancy => "pregnancy",
            Contraindication::ActiveMalignancy => "active_malignancy",
            Contraindication::RecentCancerHistory => "recent_cancer_history",
            Contraindication::PolycysticKidneyDisease => "polycystic_kidney_disease",
            Contraindication::ProliferativeRetinalDisease => "proliferative_retinal_disease",
            Contraindication::PulmonaryArterialHypertension => "pulmonary_arterial_hypertension",
            Contraindication::HepaticImpairment => "hepatic_impairment",
            Contraindication::PriorCardiovascularEvents => "prior_cardiovascular_events",
            Contraindication::PriorThromboembolicEvents => "prior_thromboembolic_events",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Contraindication::Pregnancy => "Pregnancy",
            Contraindication::ActiveMalignancy => "Active malignancy",
            Contraindication::RecentCancerHistory => "Recent history of cancer",
            Contraindication::PolycysticKidneyDisease => "Polycystic kidney disease",
            Contraindication::ProliferativeRetinalDisease => "Proliferative retinal disease",
            Contraindication::PulmonaryArterialHypertension => "Pulmonary arterial hypertension",
            Contraindication::HepaticImpairment => "Hepatic impairment",
            Contraindication::PriorCardiovascularEvents => "Prior cardiovascular events",
            Contraindication::PriorThromboembolicEvents => "Prior thromboembolic events",
        }
    }
}

/// Clinical-history and contraindication flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalHistory {
    pub pregnancy: bool,
    pub active_malignancy: bool,
    pub recent_cancer_history: bool,
    pub polycystic_kidney_disease: bool,
    pub proliferative_retinal_disease: bool,
    pub pulmonary_arterial_hypertension: bool,
    pub hepatic_impairment: bool,
    pub prior_cardiovascular_events: bool,
    pub prior_thromboembolic_events: bool,
    pub esa_intolerance: bool,
    pub current_stroke_or_thrombosis: bool,
}

impl ClinicalHistory {
    pub fn has(&self, item: Contraindication) -> bool {
        match item {
            Contraindication::Pregnancy => self.pregnancy,
            Contraindication::ActiveMalignancy => self.active_malignancy,
            Contraindication::RecentCancerHistory => self.recent_cancer_history,
            Contraindication::PolycysticKidneyDisease => self.polycystic_kidney_disease,
            Contraindication::ProliferativeRetinalDisease => self.proliferative_retinal_disease,
            Contraindication::PulmonaryArterialHypertension => {
                self.pulmonary_arterial_hypertension
            }
            Contraindication::HepaticImpairment => self.hepatic_impairment,
            Contraindication::PriorCardiovascularEvents => self.prior_cardiovascular_events,
            Contraindication::PriorThromboembolicEvents => self.prior_thromboembolic_events,
        }
    }

    pub(crate) fn flag_mut(&mut self, item: Contraindication) -> &mut bool {
        match item {
            Contraindication::Pregnancy => &mut self.pregnancy,
            Contraindication::ActiveMalignancy => &mut self.active_malignancy,
            Contraindication::RecentCancerHistory => &mut self.recent_cancer_history,
            Contraindication::PolycysticKidneyDisease => &mut self.polycystic_kidney_disease,
            Contraindication::ProliferativeRetinalDisease => {
                &mut self.proliferative_retinal_disease
            }
            Contraindication::PulmonaryArterialHypertension => {
                &mut self.pulmonary_arterial_hypertension
            }
            Contraindication::HepaticImpairment => &mut self.hepatic_impairment,
            Contraindication::PriorCardiovascularEvents => &mut self.prior_cardiovascular_events,
            Contraindication::PriorThromboembolicEvents => &mut self.prior_thromboembolic_events,
        }
    }

    /// Contraindications that are present, in declaration order
    pub fn contraindications(&self) -> Vec<Contraindication> {
        Contraindication::ALL
            .into_iter()
            .filter(|item| self.has(*item))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalStatus {
    pub esa_hyporesponsive: bool,
    pub elevated_inflammation: bool,
}

/// Everything known about the patient at one point of the assessment.
///
/// Numeric fields use `None` as the "not yet known" marker; a missing value
/// is never read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientSnapshot {
    pub cohort: Option<Cohort>,
    pub sex: Option<Sex>,
    /// g/dL
    pub hemoglobin: Option<f64>,
    /// ng/mL
    pub ferritin: Option<f64>,
    /// %
    pub tsat: Option<f64>,
    /// µg/dL, only used to derive `tsat`
    pub serum_iron: Option<f64>,
    /// µg/dL, only used to derive `tsat`
    pub tibc: Option<f64>,
    pub active_infection: bool,
    pub workup: WorkupState,
    pub history: ClinicalHistory,
    pub status: ClinicalStatus,
    pub no_refrigeration: bool,
    pub route_preference: Option<RoutePreference>,
}

impl PatientSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace non-finite lab values with the unset marker
    pub fn normalized(mut self) -> Self {
        for value in [
            &mut self.hemoglobin,
            &mut self.ferritin,
            &mut self.tsat,
            &mut self.serum_iron,
            &mut self.tibc,
        ] {
            *value = finite(*value);
        }
        self
    }
}

pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workup_toggle_law() {
        let mut workup = WorkupState::default();
        assert!(workup.is_unassessed());

        workup.set_all_excluded(true);
        workup.set_finding(Finding::Liver, true);
        assert!(!workup.is_all_excluded());
        assert!(workup.has(Finding::Liver));

        workup.set_all_excluded(true);
        assert!(workup.is_all_excluded());
        assert!(!workup.has(Finding::Liver));

        // clearing a finding never re-enables "all excluded"
        workup.set_finding(Finding::Liver, false);
        assert!(workup.is_all_excluded());
    }

    #[test]
    fn test_findings_iterate_in_report_order() {
        let mut workup = WorkupState::default();
        workup.set_finding(Finding::Parasites, true);
        workup.set_finding(Finding::PeripheralSmear, true);
        workup.set_finding(Finding::Thyroid, true);

        let WorkupState::Findings(set) = workup else {
            panic!("expected findings");
        };
        let order: Vec<_> = set.into_iter().collect();
        assert_eq!(
            order,
            vec![Finding::PeripheralSmear, Finding::Thyroid, Finding::Parasites]
        );
    }

    #[test]
    fn test_contraindications_in_declaration_order() {
        let history = ClinicalHistory {
            prior_thromboembolic_events: true,
            pregnancy: true,
            hepatic_impairment: true,
            ..Default::default()
        };
        assert_eq!(
            history.contraindications(),
            vec![
                Contraindication::Pregnancy,
                Contraindication::HepaticImpairment,
                Contraindication::PriorThromboembolicEvents,
            ]
        );
    }

    #[test]
    fn test_partial_json_snapshot() {
        let snapshot: PatientSnapshot = serde_json::from_str(
            r#"{
                "sex": "female",
                "hemoglobin": 11.5,
                "workup": { "findings": ["liver", "hemolysis"] },
                "history": { "pregnancy": true }
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.sex, Some(Sex::Female));
        assert_eq!(snapshot.hemoglobin, Some(11.5));
        assert_eq!(snapshot.ferritin, None);
        assert!(snapshot.workup.has(Finding::Hemolysis));
        assert!(snapshot.history.pregnancy);
        assert!(!snapshot.history.esa_intolerance);

        let excluded: PatientSnapshot =
            serde_json::from_str(r#"{ "workup": "all_excluded" }"#).unwrap();
        assert!(excluded.workup.is_all_excluded());
    }

    #[test]
    fn test_normalized_drops_non_finite_values() {
        let snapshot = PatientSnapshot {
            hemoglobin: Some(f64::NAN),
            ferritin: Some(f64::INFINITY),
            tsat: Some(20.0),
            ..Default::default()
        }
        .normalized();

        assert_eq!(snapshot.hemoglobin, None);
        assert_eq!(snapshot.ferritin, None);
        assert_eq!(snapshot.tsat, Some(20.0));
    }
}
