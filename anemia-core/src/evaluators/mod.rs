//! One evaluator per assessment stage. Each is a pure function from a
//! [`PatientSnapshot`](crate::PatientSnapshot) to a
//! [`DecisionResult`](crate::DecisionResult).

pub mod iron_status;
pub mod screening;
pub mod therapy;
pub mod workup;
