//! Staged decision support for anemia in chronic kidney disease.
//!
//! Four evaluators, one per assessment stage, each a pure function of a
//! [`PatientSnapshot`]:
//!
//! * [`Stage::Screening`] – is the patient anemic?
//! * [`Stage::IronStatus`] – iron deficiency and iron initiation
//! * [`Stage::Workup`] – exclusion of non-renal causes
//! * [`Stage::TherapySelection`] – ESA versus HIF-PHI
//!
//! Evaluators never fail: missing inputs produce an "insufficient data"
//! [`DecisionResult`].

pub mod decision;
pub mod edit;
pub mod error;
pub mod evaluators;
pub mod rules;
pub mod snapshot;
pub mod stage;
pub mod tsat;

// Re-export commonly used types
pub use decision::{DecisionCategory, DecisionResult, DecisionStatus, Severity};
pub use edit::{Field, FieldEdit, FlagField, LabField};
pub use error::ParseEditError;
pub use rules::{Rule, RuleSet};
pub use snapshot::{
    ClinicalHistory, ClinicalStatus, Cohort, Contraindication, Finding, PatientSnapshot,
    RoutePreference, Sex, WorkupState,
};
pub use stage::{Stage, assess_all};
pub use tsat::derive_tsat;
